//! Library loaded by the Swift, Kotlin and React Native hosts.
//!
//! Everything lives in [`qogam_core`]; this crate re-exports it together with its `UniFFI`
//! scaffolding so a single native library carries the whole interface.

qogam_core::uniffi_reexport_scaffolding!();

pub use qogam_core::*;
