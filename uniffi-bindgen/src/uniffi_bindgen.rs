//! Generates Swift and Kotlin bindings for the `qogam` library.
//!
//! `cargo run -p uniffi-bindgen -- generate --library target/release/libqogam.dylib --language swift --out-dir bindings`

fn main() {
    uniffi::uniffi_bindgen_main();
}
