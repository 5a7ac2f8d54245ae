//! Bearer-authenticated content endpoints: the user's profile and certificates, the course
//! catalogue, lessons and their materials.
//!
//! Reads are retried on transient failures; writes are sent once.

use std::sync::Arc;

use secrecy::SecretString;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::QogamError,
    http_request::{read_json, with_bearer, Request},
    ClientConfig,
};

mod courses;
mod lessons;
mod profile;

pub use courses::{localized_course, Course, CourseTranslation, LessonSummary};
pub use lessons::{
    localized_lesson, Lesson, LessonCompletion, LessonTranslation, Material,
};
pub use profile::{Certificate, ProfileUpdate, Role, RoleTranslation, UserProfile};

/// Client for the content endpoints.
///
/// Holds the bearer token of the session it was created from; obtain one from
/// [`crate::session::SessionController::content_api`] so it follows the current login.
#[derive(uniffi::Object)]
pub struct ContentApi {
    config: ClientConfig,
    request: Request,
    token: Option<SecretString>,
}

#[uniffi::export]
impl ContentApi {
    /// Creates a client with an explicit token. Without one only the public catalogue is
    /// reachable.
    ///
    /// # Errors
    /// Returns an error if `config` is invalid.
    #[uniffi::constructor]
    pub fn new(config: ClientConfig, token: Option<String>) -> Result<Arc<Self>, QogamError> {
        config.validate()?;
        Ok(Arc::new(match token.filter(|token| !token.is_empty()) {
            Some(token) => Self::authenticated(&config, token),
            None => Self::anonymous(&config),
        }))
    }

    /// Whether requests carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl ContentApi {
    pub(crate) fn authenticated(config: &ClientConfig, token: String) -> Self {
        Self {
            config: config.clone(),
            request: Request::new(config),
            token: Some(SecretString::from(token)),
        }
    }

    pub(crate) fn anonymous(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
            request: Request::new(config),
            token: None,
        }
    }

    fn require_token(&self) -> Result<&SecretString, QogamError> {
        self.token.as_ref().ok_or(QogamError::Unauthenticated)
    }

    /// `GET` with retries, bearer attached when held.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        default_message: &str,
    ) -> Result<T, QogamError> {
        let url = self.config.endpoint(path);
        let builder = with_bearer(self.request.get(&url), self.token.as_ref());
        let response = self.request.send_with_retry(builder).await?;
        read_json(response, default_message).await
    }

    /// `POST` sent once, bearer attached when held.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        default_message: &str,
    ) -> Result<T, QogamError> {
        let url = self.config.endpoint(path);
        let mut builder = with_bearer(self.request.post(&url), self.token.as_ref());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.request.send_once(builder).await?;
        read_json(response, default_message).await
    }

    /// Origin serving uploaded files: the API base URL without its `/api` suffix.
    fn site_origin(&self) -> &str {
        let base = self.config.base_url.trim_end_matches('/');
        base.strip_suffix("/api").unwrap_or(base)
    }
}
