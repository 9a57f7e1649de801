//! HTTP transport for the Nota backend.
//!
//! Every call goes through `ApiClient::request_with_headers`, so header
//! injection and error classification are the same for every verb.
//!
//! Flow Overview:
//! - Resolve the path against the configured base URL (exactly one `/` between).
//! - Set `Accept: application/json`, plus `Content-Type: application/json` when a
//!   body is present.
//! - Ask the injected `TokenSource` for a bearer token unless the caller already
//!   set `Authorization`.
//! - 204 yields `ApiResponse::Empty`, JSON yields `ApiResponse::Json`, anything
//!   else `ApiResponse::Text`. Non-2xx becomes `ApiError::Request`.
//!
//! The token is marked sensitive on the header and never logged. There is no
//! retry policy; a failed call is reported once.

pub mod error;

pub use self::error::{ApiError, ErrorPayload};

use crate::session::SessionStore;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const JSON: &str = "application/json";

/// Where the transport gets the bearer token for each request.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token()
    }
}

/// No token, ever. Used for unauthenticated probes such as `/health`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: crate::APP_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Body of a successful response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
    Empty,
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Deserialize a JSON response into `T`. An empty response decodes as
    /// JSON `null`, so `Option<T>` and `()` targets accept it.
    /// # Errors
    /// Returns `ApiError::Decode` if the body is text or does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Self::Json(value) => value,
            Self::Empty => Value::Null,
            Self::Text(_) => {
                return Err(ApiError::Decode(
                    "expected a JSON response, got text".to_string(),
                ))
            }
        };
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// Build a client for `config.base_url`.
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let base_url = validate_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        build_url(&self.base_url, path)
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request::<Value>(Method::GET, path, None).await
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, body).await
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PUT, path, body).await
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PATCH, path, body).await
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request::<Value>(Method::DELETE, path, None).await
    }

    /// Probe the backend's unauthenticated health endpoint.
    /// # Errors
    /// See `request_with_headers`.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get("/health").await?.decode()
    }

    /// # Errors
    /// See `request_with_headers`.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, ApiError> {
        self.request_with_headers(method, path, body, HeaderMap::new())
            .await
    }

    /// Issue a request and classify the response.
    ///
    /// Caller headers are kept, except that `Accept` and (with a body)
    /// `Content-Type` are always overwritten. A caller-supplied
    /// `Authorization` suppresses the stored bearer token.
    ///
    /// # Errors
    /// `ApiError::Request` for non-2xx statuses, `ApiError::Network` when the
    /// request cannot complete, `ApiError::Encode`/`Decode` for bad bodies.
    pub async fn request_with_headers<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.build(method, path, body, headers)?;

        let span = info_span!(
            "api.request",
            http.method = %request.method(),
            url = %request.url()
        );

        async move {
            debug!("api request: {} {}", request.method(), request.url());
            let response = self
                .client
                .execute(request)
                .await
                .map_err(ApiError::Network)?;
            handle_response(response).await
        }
        .instrument(span)
        .await
    }

    /// Build the outgoing request without sending it.
    /// # Errors
    /// Returns an error if the body cannot be encoded or the URL is invalid.
    pub fn build<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<reqwest::Request, ApiError> {
        let url = self.endpoint_url(path);
        let headers = self.prepare_headers(headers, body.is_some());

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(ApiError::Encode)?;
            builder = builder.body(payload);
        }

        builder
            .build()
            .map_err(|err| ApiError::Url(format!("{url}: {err}")))
    }

    fn prepare_headers(&self, mut headers: HeaderMap, has_body: bool) -> HeaderMap {
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }

        if !headers.contains_key(AUTHORIZATION) {
            if let Some(token) = self.tokens.bearer_token() {
                match bearer_header(&token) {
                    Some(value) => {
                        headers.insert(AUTHORIZATION, value);
                    }
                    None => warn!("stored token is not a valid header value, sending request without it"),
                }
            }
        }

        headers
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn bearer_header(token: &SecretString) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Join `base_url` and `path` with exactly one `/` between them.
#[must_use]
pub fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn validate_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| ApiError::Url(format!("{trimmed}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ApiError::Url(format!(
                "{trimmed}: unsupported scheme {scheme}"
            )))
        }
    }
    if url.host().is_none() {
        return Err(ApiError::Url(format!("{trimmed}: no host specified")));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn handle_response(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(JSON));

    if status.is_success() {
        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::Empty);
        }
        let text = response.text().await.map_err(ApiError::Network)?;
        if !is_json {
            return Ok(ApiResponse::Text(text));
        }
        if text.trim().is_empty() {
            return Ok(ApiResponse::Empty);
        }
        return serde_json::from_str(&text)
            .map(ApiResponse::Json)
            .map_err(|err| ApiError::Decode(err.to_string()));
    }

    // The body is best-effort; a failed read only loses the payload.
    let payload = match response.text().await {
        Ok(text) => ErrorPayload::parse(&text, is_json),
        Err(err) => {
            debug!("failed to read error body: {err}");
            None
        }
    };

    let err = ApiError::from_status(status.as_u16(), payload);
    debug!(status = status.as_u16(), "api request failed: {err}");
    Err(err)
}
