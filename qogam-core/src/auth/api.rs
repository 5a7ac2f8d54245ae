use crate::{
    error::QogamError,
    http_request::{read_json, Request},
    ClientConfig, OtpChannel,
};

use super::types::{
    AppConfirmResponse, ConfirmCodeRequest, LoginConfirmResponse, LoginSession,
    SendCodeRequest, SendCodeResponse,
};

/// Client for the four credential endpoints.
///
/// Every call is a single JSON `POST` with no retries; a non-2xx status fails with the server's
/// `message`.
pub struct AuthApi {
    config: ClientConfig,
    request: Request,
}

impl AuthApi {
    /// Creates a client for the backend described by `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
            request: Request::new(config),
        }
    }

    /// Channel codes are requested through.
    #[must_use]
    pub const fn channel(&self) -> OtpChannel {
        self.config.otp_channel
    }

    /// Sends a one-time code to the phone of an existing account.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx responses (e.g. 404 `Пользователь не найден`) and
    /// bodies reporting `success: false`.
    pub async fn send_login_code(
        &self,
        phone: &str,
    ) -> Result<SendCodeResponse, QogamError> {
        self.send_code("send-login-code", phone).await
    }

    /// Sends a one-time code for a new account.
    ///
    /// # Errors
    /// Same as [`AuthApi::send_login_code`].
    pub async fn send_app_code(&self, phone: &str) -> Result<SendCodeResponse, QogamError> {
        self.send_code("send-app-code", phone).await
    }

    /// Confirms a login code, returning the token and the user.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx responses, and 2xx bodies that report failure or lack
    /// the `data` payload.
    pub async fn confirm_login_code(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<LoginSession, QogamError> {
        let url = self.config.endpoint("login-confirm");
        let builder = self
            .request
            .post(&url)
            .json(&ConfirmCodeRequest {
                phone,
                sms_code: code,
            });
        let response = self.request.send_once(builder).await?;
        let body: LoginConfirmResponse =
            read_json(response, "Failed to verify OTP").await?;

        match body.data {
            Some(session) if body.success => Ok(session),
            _ => Err(QogamError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to verify OTP".to_string()),
            }),
        }
    }

    /// Confirms a registration code, returning the bare token. The user record is not part of
    /// the response.
    ///
    /// # Errors
    /// Same as [`AuthApi::confirm_login_code`], with `token` as the required payload.
    pub async fn confirm_app_code(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<String, QogamError> {
        let url = self.config.endpoint("confirm-app-code");
        let builder = self
            .request
            .post(&url)
            .json(&ConfirmCodeRequest {
                phone,
                sms_code: code,
            });
        let response = self.request.send_once(builder).await?;
        let body: AppConfirmResponse = read_json(response, "Failed to verify OTP").await?;

        match body.token {
            Some(token) if body.success && !token.is_empty() => Ok(token),
            _ => Err(QogamError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to verify OTP".to_string()),
            }),
        }
    }

    async fn send_code(
        &self,
        path: &str,
        phone: &str,
    ) -> Result<SendCodeResponse, QogamError> {
        let url = self.config.endpoint(path);
        let builder = self.request.post(&url).json(&SendCodeRequest {
            phone,
            channel: self.config.otp_channel,
        });
        let response = self.request.send_once(builder).await?;
        let body: SendCodeResponse = read_json(response, "Failed to send OTP").await?;

        if body.success == Some(false) {
            return Err(QogamError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to send OTP".to_string()),
            });
        }
        tracing::debug!(path, "code sent");
        Ok(body)
    }
}
