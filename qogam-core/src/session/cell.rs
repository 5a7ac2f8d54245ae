use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use super::{observer::SessionObserver, state::SessionState};

/// Owner of the current [`SessionState`]. Publishes every change to `watch` subscribers and the
/// registered observer.
pub(crate) struct SessionCell {
    state: watch::Sender<SessionState>,
    observer: RwLock<Option<Arc<dyn SessionObserver>>>,
}

impl SessionCell {
    pub(crate) fn new(initial: SessionState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            observer: RwLock::new(None),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Applies `mutate` atomically. It returns whether it changed anything; only changes are
    /// published.
    pub(crate) fn modify(&self, mutate: impl FnOnce(&mut SessionState) -> bool) -> bool {
        let changed = self.state.send_if_modified(mutate);
        if changed {
            self.notify();
        }
        changed
    }

    pub(crate) fn set_observer(&self, observer: Option<Arc<dyn SessionObserver>>) {
        match self.observer.write() {
            Ok(mut slot) => *slot = observer,
            Err(_) => tracing::error!("session observer lock poisoned"),
        }
    }

    fn notify(&self) {
        let observer = self
            .observer
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(Arc::clone));
        if let Some(observer) = observer {
            observer.on_state_changed(self.snapshot());
        }
    }
}
