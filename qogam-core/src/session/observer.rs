use super::state::SessionState;

/// Receives every published [`SessionState`].
///
/// Implemented by the host (e.g. a React Native store or a Swift `ObservableObject`). Callbacks
/// may arrive on any thread, including the countdown ticker's. A callback must not call
/// [`SessionController::logout`](super::SessionController::logout) synchronously.
#[uniffi::export(with_foreign)]
pub trait SessionObserver: Send + Sync {
    /// Called after each state change with the new snapshot.
    fn on_state_changed(&self, state: SessionState);
}
