//! `qogam-core` is the client core of the Qogam learning app.
//!
//! It owns everything below the presentation layer: the phone/OTP session
//! ([`session::SessionController`]), the credential API it talks to
//! ([`auth::AuthApi`]), the platform key-value store seam ([`store`]) and the
//! bearer-authenticated content endpoints (profile, certificates, courses and
//! lessons). Screens only ever see [`session::SessionState`] snapshots and the
//! outcomes of controller operations.
//!
//! The crate is exported to Swift, Kotlin and React Native through `UniFFI`;
//! host applications provide a [`store::KeyValueStore`] and, optionally, a
//! [`logger::Logger`] and a [`session::SessionObserver`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qogam_core::{
//!     session::{SessionController, SessionUpdate},
//!     store::InMemoryKeyValueStore,
//!     ClientConfig,
//! };
//!
//! # async fn run() -> Result<(), qogam_core::QogamError> {
//! let store = Arc::new(InMemoryKeyValueStore::new());
//! let controller = SessionController::new(ClientConfig::default(), store)?;
//! controller.update(SessionUpdate {
//!     pending_phone: Some("+7 700 123 45 67".to_string()),
//!     otp_digits: None,
//! });
//! let outcome = controller.request_code().await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod defaults;
pub use defaults::*;

mod error;
pub use error::*;

/// Forwarding of library log events to the host application.
pub mod logger;

/// Phone number normalization, formatting and country calling codes.
pub mod phone;

/// Platform key-value store used to persist the session.
pub mod store;

/// Credential API: OTP send/confirm endpoints and failure classification.
pub mod auth;

/// The session controller and its observable state.
pub mod session;

/// Locale preference persistence and translation selection.
pub mod locale;

/// Bearer-authenticated content endpoints.
#[cfg(feature = "content")]
pub mod content;

// private modules
mod http_request;

uniffi::setup_scaffolding!("qogam_core");
