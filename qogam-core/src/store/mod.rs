//! Session persistence: the platform key-value store interface and the keys the session uses.
//!
//! The host implements [`KeyValueStore`] on top of its native storage (`AsyncStorage`,
//! `UserDefaults`, `SharedPreferences`, ...). [`InMemoryKeyValueStore`] is provided for tests and
//! ephemeral sessions.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryKeyValueStore;
pub use traits::KeyValueStore;

/// Key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "@auth_token";
/// Key holding the JSON-serialized authenticated user.
pub const AUTH_USER_KEY: &str = "@auth_user";
/// Key holding the phone number of an interrupted verification flow.
pub const AUTH_PHONE_KEY: &str = "@auth_phone";
/// Key holding the selected UI language.
pub const LANGUAGE_KEY: &str = "user-language";

/// All keys owned by the session; removed together on logout.
pub(crate) const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, AUTH_USER_KEY, AUTH_PHONE_KEY];
