use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::cell::SessionCell;

const TICK: Duration = Duration::from_secs(1);

/// Drives `resend_countdown` down to zero, one per second, on a background task.
///
/// At most one ticker runs; starting a new one aborts the previous.
#[derive(Default)]
pub(crate) struct Countdown {
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Countdown {
    /// Sets the countdown to `seconds` and starts ticking.
    pub(crate) fn start(&self, cell: &Arc<SessionCell>, seconds: u32) {
        self.stop();
        cell.modify(|state| {
            let changed = state.resend_countdown != seconds;
            state.resend_countdown = seconds;
            changed
        });
        if seconds == 0 {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("no tokio runtime available; resend countdown cleared");
            cell.modify(|state| {
                state.resend_countdown = 0;
                true
            });
            return;
        };

        let handle = runtime.spawn(tick_down(Arc::clone(cell)));
        match self.ticker.lock() {
            Ok(mut ticker) => *ticker = Some(handle),
            Err(_) => tracing::error!("countdown lock poisoned"),
        }
    }

    /// Aborts the running ticker, leaving the countdown value as is.
    pub(crate) fn stop(&self) {
        if let Some(handle) = self.ticker.lock().ok().and_then(|mut ticker| ticker.take()) {
            handle.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick_down(cell: Arc<SessionCell>) {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut remaining = 0;
        cell.modify(|state| {
            if state.resend_countdown == 0 {
                return false;
            }
            state.resend_countdown -= 1;
            remaining = state.resend_countdown;
            true
        });
        if remaining == 0 {
            tracing::debug!("resend countdown finished");
            return;
        }
    }
}
