#![allow(dead_code, missing_docs)]

//! Helpers shared across integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use qogam_core::{
    session::{SessionController, SessionObserver, SessionState, SessionUpdate},
    store::{InMemoryKeyValueStore, KeyValueStore, StoreError, StoreResult, AUTH_TOKEN_KEY},
    ClientConfig,
};
use tokio::{net::TcpListener, task::JoinHandle};

pub const PHONE: &str = "77001234567";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig::with_base_url(base_url).unwrap()
}

pub fn controller_for(
    base_url: &str,
    store: &Arc<InMemoryKeyValueStore>,
) -> Arc<SessionController> {
    SessionController::new(
        config_for(base_url),
        Arc::clone(store) as Arc<dyn KeyValueStore>,
    )
    .unwrap()
}

pub fn enter_phone(controller: &SessionController, phone: &str) {
    controller.update(SessionUpdate {
        pending_phone: Some(phone.to_string()),
        otp_digits: None,
    });
}

pub fn enter_code(controller: &SessionController, code: &str) {
    controller.update(SessionUpdate {
        pending_phone: None,
        otp_digits: Some(code.chars().map(String::from).collect()),
    });
}

/// A server that accepts connections and never answers.
pub async fn stalled_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    (url, handle)
}

pub fn stalled_config(base_url: &str, timeout: Duration) -> ClientConfig {
    ClientConfig {
        request_timeout: timeout,
        ..config_for(base_url)
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<SessionState>>,
}

impl SessionObserver for RecordingObserver {
    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().unwrap().push(state);
    }
}

/// Wraps the in-memory store and fails selected writes.
pub struct FailingStore {
    pub inner: InMemoryKeyValueStore,
    pub failing_set: Option<&'static str>,
    pub failing_remove: bool,
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        if self.failing_set == Some(key.as_str()) {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: String) -> StoreResult<()> {
        if self.failing_remove {
            return Err(StoreError::Backend("disk".to_string()));
        }
        self.inner.remove(key)
    }
}

type Hook = Box<dyn FnOnce() + Send>;

/// Wraps the in-memory store and runs a hook once, right after the token is written.
pub struct HookedStore {
    pub inner: InMemoryKeyValueStore,
    after_token_write: Mutex<Option<Hook>>,
}

impl HookedStore {
    pub fn new(inner: InMemoryKeyValueStore) -> Self {
        Self {
            inner,
            after_token_write: Mutex::new(None),
        }
    }

    pub fn after_token_write(&self, hook: impl FnOnce() + Send + 'static) {
        *self.after_token_write.lock().unwrap() = Some(Box::new(hook));
    }
}

impl KeyValueStore for HookedStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        let is_token = key == AUTH_TOKEN_KEY;
        self.inner.set(key, value)?;
        if is_token {
            let hook = self.after_token_write.lock().unwrap().take();
            if let Some(hook) = hook {
                hook();
            }
        }
        Ok(())
    }

    fn remove(&self, key: String) -> StoreResult<()> {
        self.inner.remove(key)
    }
}
