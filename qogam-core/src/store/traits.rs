//! Platform interface for session persistence.

use super::error::StoreResult;

/// Persistent string key-value store provided by the host platform.
///
/// Implementations must be durable across app restarts. Calls are made from whichever thread
/// runs the session controller, so implementations must be thread-safe.
#[uniffi::export(with_foreign)]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: String, value: String) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&self, key: String) -> StoreResult<()>;
}
