use serde::{Deserialize, Serialize};

use crate::OtpChannel;

/// The authenticated user as returned by login confirmation and persisted with the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct User {
    /// Backend identifier.
    pub id: u64,
    /// Phone number in normalized digit form.
    pub phone: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role identifier.
    #[serde(default)]
    pub role_id: Option<u64>,
    /// Account creation timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Which backend flow a code was sent or confirmed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum AuthFlow {
    /// Existing account (`send-login-code` / `login-confirm`).
    Login,
    /// New account (`send-app-code` / `confirm-app-code`).
    Registration,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendCodeRequest<'a> {
    pub phone: &'a str,
    pub channel: OtpChannel,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfirmCodeRequest<'a> {
    pub phone: &'a str,
    pub sms_code: &'a str,
}

/// Response of the code-send endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct SendCodeResponse {
    /// Success flag, when the backend sends one.
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable status message.
    #[serde(default)]
    pub message: Option<String>,
    /// Channel the code was delivered through.
    #[serde(default)]
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginConfirmResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<LoginSession>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppConfirmResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Token and user returned by a successful login confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct LoginSession {
    /// Bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}
