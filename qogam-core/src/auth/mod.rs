mod api;
pub use api::AuthApi;

mod classify;
pub use classify::{classify_failure, FailureKind, USER_NOT_FOUND_MARKERS};

mod types;
pub use types::*;
