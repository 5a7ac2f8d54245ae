use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::QogamError;

/// Base URL of the production backend.
pub const PRODUCTION_API_URL: &str = "https://qogamfin.kz/api";

/// Seconds a user must wait before another code may be requested.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivery channel for one-time codes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    uniffi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OtpChannel {
    /// Code delivered over `WhatsApp`.
    #[default]
    Whatsapp,
    /// Code delivered by SMS.
    Sms,
}

/// Client configuration shared by the session controller and API clients.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash (e.g. `https://qogamfin.kz/api`).
    pub base_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Channel used to deliver one-time codes.
    pub otp_channel: OtpChannel,
    /// Cooldown before another code may be requested, in seconds.
    pub resend_cooldown_secs: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: PRODUCTION_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            otp_channel: OtpChannel::default(),
            resend_cooldown_secs: RESEND_COOLDOWN_SECS,
        }
    }
}

#[derive(Deserialize)]
struct RawConfig {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    otp_channel: Option<OtpChannel>,
    resend_cooldown_secs: Option<u32>,
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with all other values defaulted.
    ///
    /// # Errors
    /// Returns [`QogamError::InvalidInput`] if the URL is not HTTPS (plain HTTP is only accepted for
    /// loopback hosts).
    pub fn with_base_url(base_url: &str) -> Result<Self, QogamError> {
        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from JSON. Missing keys take their default values.
    ///
    /// ```json
    /// { "base_url": "https://qogamfin.kz/api", "request_timeout_ms": 10000, "otp_channel": "sms" }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the resulting configuration is invalid.
    pub fn from_json(json: &str) -> Result<Self, QogamError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let defaults = Self::default();
        let config = Self {
            base_url: raw
                .base_url
                .map_or(defaults.base_url, |url| url.trim_end_matches('/').to_string()),
            request_timeout: raw
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            otp_channel: raw.otp_channel.unwrap_or(defaults.otp_channel),
            resend_cooldown_secs: raw
                .resend_cooldown_secs
                .unwrap_or(defaults.resend_cooldown_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the clients cannot work with.
    ///
    /// # Errors
    /// Returns [`QogamError::InvalidInput`] naming the offending attribute.
    pub fn validate(&self) -> Result<(), QogamError> {
        if !is_allowed_base_url(&self.base_url) {
            return Err(QogamError::InvalidInput {
                attribute: "base_url".to_string(),
                reason: "must use https (http is only allowed for loopback hosts)"
                    .to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(QogamError::InvalidInput {
                attribute: "request_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn is_allowed_base_url(url: &str) -> bool {
    if url.starts_with("https://") {
        return true;
    }
    let Some(rest) = url.strip_prefix("http://") else {
        return false;
    };
    let authority = rest.split('/').next().unwrap_or_default();
    ["localhost", "127.0.0.1", "[::1]"].iter().any(|host| {
        authority == *host || authority.starts_with(&format!("{host}:"))
    })
}

/// Returns the production configuration.
#[uniffi::export]
#[must_use]
pub fn default_client_config() -> ClientConfig {
    ClientConfig::default()
}

/// Parses a [`ClientConfig`] from JSON, defaulting missing keys.
///
/// # Errors
/// Returns an error if the JSON is malformed or the configuration is invalid.
#[uniffi::export]
pub fn client_config_from_json(json: &str) -> Result<ClientConfig, QogamError> {
    ClientConfig::from_json(json)
}
