use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{header, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{error::QogamError, ClientConfig};

/// A simple wrapper on an HTTP client for making requests against the backend. Sets sensible
/// defaults such as timeouts, user-agent & JSON headers, and retries idempotent requests on
/// transient failures.
pub struct Request {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl Request {
    /// Initializes a new `Request` instance from the client configuration.
    pub(crate) fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::new();
        let max_retries = 2; // total attempts = 3, GET only
        Self {
            client,
            timeout: config.request_timeout,
            max_retries,
        }
    }

    /// Creates a request builder with defaults applied.
    pub(crate) fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.timeout)
            .header(header::ACCEPT, "application/json")
            .header(
                header::USER_AGENT,
                format!("qogam-core/{}", env!("CARGO_PKG_VERSION")),
            )
    }

    /// Creates a GET request builder with defaults applied.
    #[cfg_attr(not(feature = "content"), allow(dead_code))]
    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.req(Method::GET, url)
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Sends a request exactly once. Used for every non-idempotent call.
    pub(crate) async fn send_once(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, QogamError> {
        execute_request_builder(request_builder)
            .await
            .map_err(Into::into)
    }

    /// Sends an idempotent request, retrying transient failures with exponential backoff.
    #[cfg_attr(not(feature = "content"), allow(dead_code))]
    pub(crate) async fn send_with_retry(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, QogamError> {
        let Some(template) = request_builder.try_clone() else {
            return self.send_once(request_builder).await;
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries as usize);

        (|| async {
            let request_builder = template.try_clone().ok_or_else(|| {
                RequestHandleError::permanent(
                    "<unknown>".to_string(),
                    None,
                    "request cannot be retried because it is not cloneable".to_string(),
                )
            })?;
            let response = execute_request_builder(request_builder).await?;
            let status = response.status().as_u16();
            if status == 429 || (500..600).contains(&status) {
                return Err(RequestHandleError::retryable(
                    response.url().to_string(),
                    Some(status),
                    format!("request error with bad status code {status}"),
                ));
            }
            Ok(response)
        })
        .retry(backoff)
        .when(RequestHandleError::is_retryable)
        .notify(|err: &RequestHandleError, delay: Duration| {
            tracing::debug!(url = %err.url, ?delay, "retrying request: {}", err.error);
        })
        .await
        .map_err(Into::into)
    }
}

/// Attaches a bearer token, if any, to a request.
#[cfg_attr(not(feature = "content"), allow(dead_code))]
pub(crate) fn with_bearer(
    request_builder: RequestBuilder,
    token: Option<&SecretString>,
) -> RequestBuilder {
    match token {
        Some(token) => request_builder.bearer_auth(token.expose_secret()),
        None => request_builder,
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Decodes a JSON response body.
///
/// Non-2xx responses become [`QogamError::NetworkError`] carrying the body's `message` field, or
/// `default_message` when the body has none.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    default_message: &str,
) -> Result<T, QogamError> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| default_message.to_string());
        tracing::warn!(%url, status = status.as_u16(), "request failed: {message}");
        return Err(QogamError::NetworkError {
            url,
            status: Some(status.as_u16()),
            error: message,
        });
    }

    serde_json::from_str::<T>(&body).map_err(|err| QogamError::SerializationError {
        error: format!("failed to parse response from {url}: {err}"),
    })
}

#[derive(Debug)]
struct RequestHandleError {
    url: String,
    status: Option<u16>,
    error: String,
    timed_out: bool,
    retryable: bool,
}

impl RequestHandleError {
    const fn retryable(url: String, status: Option<u16>, error: String) -> Self {
        Self {
            url,
            status,
            error,
            timed_out: false,
            retryable: true,
        }
    }

    const fn permanent(url: String, status: Option<u16>, error: String) -> Self {
        Self {
            url,
            status,
            error,
            timed_out: false,
            retryable: false,
        }
    }

    const fn timeout(url: String, error: String) -> Self {
        Self {
            url,
            status: None,
            error,
            timed_out: true,
            retryable: true,
        }
    }

    const fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<RequestHandleError> for QogamError {
    fn from(value: RequestHandleError) -> Self {
        if value.timed_out {
            return Self::Timeout { url: value.url };
        }
        Self::NetworkError {
            url: value.url,
            status: value.status,
            error: value.error,
        }
    }
}

async fn execute_request_builder(
    request_builder: RequestBuilder,
) -> Result<Response, RequestHandleError> {
    let (client, request) = request_builder.build_split();
    let request = request.map_err(|err| {
        RequestHandleError::permanent(
            err.url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            None,
            format!("request build failed: {err}"),
        )
    })?;
    let url = request.url().to_string();
    tracing::debug!(method = %request.method(), %url, "sending request");

    match client.execute(request).await {
        Ok(resp) => Ok(resp),
        Err(err) => {
            if err.is_timeout() {
                return Err(RequestHandleError::timeout(
                    url,
                    format!("request timeout: {err}"),
                ));
            }
            if err.is_connect() {
                return Err(RequestHandleError::retryable(
                    url,
                    None,
                    format!("request connect error: {err}"),
                ));
            }

            Err(RequestHandleError::permanent(
                url,
                None,
                format!("request failed: {err}"),
            ))
        }
    }
}
