//! Phone verification and the authenticated session.
//!
//! [`SessionController`] is the only component that mutates [`SessionState`]. Screens stage
//! input through [`SessionController::update`], trigger [`SessionController::request_code`] and
//! [`SessionController::submit_code`], and render whatever state the controller publishes.

mod cell;
mod controller;
mod countdown;
mod observer;
mod state;

pub use controller::{
    Precondition, RequestCodeOutcome, SessionController, SubmitCodeOutcome,
};
pub use observer::SessionObserver;
pub use state::{SessionPhase, SessionState, SessionUpdate, OTP_LENGTH};
