//! # PayPal HTTP Transport
//!
//! Single point of outbound communication with the PayPal API.
//!
//! Every call runs through the same pipeline:
//!
//! ```text
//! ensure token ──▶ dispatch ──▶ success ──▶ decode body
//!      ▲              │
//!      │              ▼ failure
//!      │        classify (401 / transient / terminal)
//!      │              │
//!      ├── refresh ◀──┤ 401, refresh budget left
//!      ├── backoff ◀──┤ no response / 5xx / 429, retry budget left
//!      │              ▼
//!      │        translate ──▶ PayPalError
//! ```
//!
//! Token state is a snapshot: a request uses whatever token was valid when
//! it was dispatched. Concurrent calls that find the token expired may each
//! fetch a new one; PayPal issues tokens concurrently without conflict.

use crate::retry::{FailureKind, RetryPolicy, RetryState, Step};
use crate::token::{now_millis, AccessToken, TokenResponse, TOKEN_PATH};
use paypal_core::{ErrorDetail, PayPalConfig, PayPalError, PayPalResult};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Idempotency header honoured by PayPal on POST requests
pub const REQUEST_ID_HEADER: &str = "PayPal-Request-Id";

const AUTH_FAILURE_MESSAGE: &str = "Failed to authenticate with PayPal";

/// Per-call request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// `PayPal-Request-Id`; generated for POST when absent
    pub request_id: Option<String>,
    /// Extra headers, e.g. `Prefer: return=representation`
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: pin the idempotency key
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Builder: add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A request as replayed by the retry loop; the body is serialized once
#[derive(Debug)]
struct PreparedRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    request_id: Option<String>,
    headers: Vec<(String, String)>,
}

/// A failed attempt
#[derive(Debug)]
enum Failure {
    /// A response arrived with a non-success status
    Status { status: u16, body: String },
    /// No (complete) response
    Network(reqwest::Error),
}

impl Failure {
    fn kind(&self) -> FailureKind {
        match self {
            Failure::Status { status, .. } => FailureKind::from_status(*status),
            Failure::Network(e) if e.is_builder() => FailureKind::Terminal,
            Failure::Network(_) => FailureKind::Transient,
        }
    }
}

/// Error payloads: PayPal's `{name, message, debug_id, details}` or the
/// OAuth `{error, error_description}` shape from the token endpoint
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    debug_id: Option<String>,
    #[serde(default)]
    details: Option<Vec<ErrorDetail>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Translate an error response into an API error
fn translate_status(status: u16, body: &str) -> PayPalError {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    PayPalError::api(
        parsed.message.or(parsed.error_description),
        status,
        parsed.name.or(parsed.error),
        parsed.debug_id,
        parsed.details,
    )
}

/// Translate a terminal failure into the error surfaced to callers
fn translate_failure(failure: Failure) -> PayPalError {
    match failure {
        Failure::Status { status, body } => translate_status(status, &body),
        Failure::Network(e) if e.is_timeout() || e.is_connect() => {
            PayPalError::connection("Network error occurred", e)
        }
        Failure::Network(e) => PayPalError::Transport(Box::new(e)),
    }
}

/// Decode a success body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(body: &str) -> PayPalResult<T> {
    let parsed = if body.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_str(body)
    };
    parsed.map_err(|e| PayPalError::Serialization(format!("Failed to parse PayPal response: {e}")))
}

/// OAuth2-authenticated HTTP client for one PayPal account
pub struct HttpClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    policy: RetryPolicy,
    token: RwLock<Option<AccessToken>>,
}

impl HttpClient {
    /// Create a transport for the configured environment
    pub fn new(config: &PayPalConfig) -> PayPalResult<Self> {
        Self::build(config, config.base_url().to_string())
    }

    /// Point the transport at a mock PayPal
    #[cfg(any(test, feature = "test-util"))]
    pub fn with_base_url(
        config: &PayPalConfig,
        base_url: impl Into<String>,
    ) -> PayPalResult<Self> {
        Self::build(config, base_url.into())
    }

    fn build(config: &PayPalConfig, base_url: String) -> PayPalResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout_or_default())
            .build()
            .map_err(|e| PayPalError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        let policy = config
            .max_retries
            .map(RetryPolicy::with_max_retries)
            .unwrap_or_default();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            policy,
            token: RwLock::new(None),
        })
    }

    /// Builder: replace the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Return the cached token if still valid, fetching a new one otherwise
    async fn ensure_valid_token(&self) -> PayPalResult<AccessToken> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_valid_at(now_millis()) {
                return Ok(token.clone());
            }
        }
        self.refresh_token().await
    }

    /// Fetch a token with the client-credentials grant. Never retried here.
    #[instrument(skip(self))]
    async fn refresh_token(&self) -> PayPalResult<AccessToken> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        debug!("Requesting PayPal access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PayPalError::connection(AUTH_FAILURE_MESSAGE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PayPalError::connection(AUTH_FAILURE_MESSAGE, e))?;

        if !status.is_success() {
            error!("PayPal token request failed: status={}", status);
            let cause = translate_status(status.as_u16(), &body);
            if status.as_u16() == 401 {
                return Err(PayPalError::Authentication(format!(
                    "PayPal rejected the client credentials: {cause}"
                )));
            }
            return Err(PayPalError::connection(AUTH_FAILURE_MESSAGE, cause));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| PayPalError::connection(AUTH_FAILURE_MESSAGE, e))?;

        let token = AccessToken::from_response(parsed, now_millis());
        debug!("Obtained PayPal access token, expires_at_ms={}", token.expires_at_ms());
        *self.token.write().await = Some(token.clone());

        Ok(token)
    }

    /// Issue one attempt with the given token
    async fn dispatch(&self, request: &PreparedRequest, token: &AccessToken) -> Result<String, Failure> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, token.bearer_header())
            .header(ACCEPT, "application/json");

        if let Some(ref id) = request.request_id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(ref body) => builder.json(body),
            None => builder.header(CONTENT_TYPE, "application/json"),
        };

        debug!("Sending {} {}", request.method, request.path);

        let response = builder.send().await.map_err(Failure::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(Failure::Network)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Failure::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Run a request through the token/retry pipeline and return the raw body
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: PreparedRequest) -> PayPalResult<String> {
        let mut state = RetryState::default();

        loop {
            let token = self.ensure_valid_token().await?;

            let failure = match self.dispatch(&request, &token).await {
                Ok(body) => {
                    if state.replays() > 0 {
                        info!(replays = state.replays(), "Request succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(failure) => failure,
            };

            match state.next_step(&self.policy, failure.kind()) {
                Step::RefreshAndReplay => {
                    warn!("PayPal returned 401, refreshing access token and replaying");
                    self.refresh_token().await?;
                }
                Step::BackoffAndReplay(delay) => {
                    warn!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Transient PayPal failure, replaying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
                Step::Fail => {
                    let err = translate_failure(failure);
                    error!(
                        error_type = err.error_type(),
                        debug_id = err.debug_id().unwrap_or("-"),
                        "PayPal request failed: {}",
                        err
                    );
                    return Err(err);
                }
            }
        }
    }

    /// General entry point: any verb, optional JSON body, options
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> PayPalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(serde_json::to_value).transpose()?;

        let request_id = match (options.request_id, &method) {
            (Some(id), _) => Some(id),
            (None, &Method::POST) => Some(uuid::Uuid::new_v4().to_string()),
            (None, _) => None,
        };

        let raw = self
            .execute(PreparedRequest {
                method,
                path: path.to_string(),
                body,
                request_id,
                headers: options.headers,
            })
            .await?;

        decode(&raw)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> PayPalResult<T> {
        self.request::<(), T>(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> PayPalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> PayPalResult<T> {
        self.request::<(), T>(Method::POST, path, None, RequestOptions::default())
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> PayPalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> PayPalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> PayPalResult<T> {
        self.request::<(), T>(Method::DELETE, path, None, RequestOptions::default())
            .await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
