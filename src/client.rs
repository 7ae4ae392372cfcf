use std::env;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use crate::client_trait::{Dispatcher, OutboundRequest, RawResponse};
use crate::model::{to_payload, Credentials, Environment, Payload};
use crate::resources::{Account, Cheques, Exchanges, Invoices, Nft, System};
use crate::signer::{to_canonical_string, Ed25519Signer, Signer, SignerError, SIGNATURE_FIELD};

/// Header carrying the caller's API key on every request
pub const API_KEY_HEADER: &str = "x-api-key";

/// Construction and configuration errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing {0} environment variable")]
    MissingEnvVar(String),
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),
    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(#[from] SignerError),
    #[error("Unknown environment '{0}' (expected mainnet, testnet or localnet)")]
    UnknownEnvironment(String),
    #[error("Failed to parse url: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Invalid retry configuration: {0}")]
    InvalidRetryConfig(String),
}

/// Failure of a single API call
///
/// Every call returns its failure as a value of this type; callers that only
/// care about success can treat all variants alike.
#[derive(Error, Debug)]
pub enum CallError {
    /// The platform answered with a truthy `error` field
    #[error("xJet API error: {0}")]
    Application(Value),
    /// No response was obtained: connection, timeout or send failure
    #[error("Transport failure: {0}")]
    Transport(String),
    /// A response arrived but its body is not JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The request body could not be encoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// A signed endpoint was called without usable key material
    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),
}

impl CallError {
    /// Returns true if the platform itself rejected the request
    pub fn is_application(&self) -> bool {
        matches!(self, CallError::Application(_))
    }

    /// Returns true if the request never produced a readable response
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_) | CallError::InvalidResponse(_))
    }

    /// The platform's `error` value, if this is an application error
    pub fn application_error(&self) -> Option<&Value> {
        match self {
            CallError::Application(value) => Some(value),
            _ => None,
        }
    }
}

/// Outcome of every API call
pub type ApiResponse = Result<Value, CallError>;

/// Configuration for retry behavior in API requests
///
/// The default is a single attempt without a client-side timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds to cap exponential backoff
    pub max_delay_ms: u64,
    /// Per-attempt timeout in seconds; `None` leaves reqwest's default
    pub timeout_seconds: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            timeout_seconds: None,
        }
    }
}

impl RetryConfig {
    /// Creates a RetryConfig from environment variables with default fallbacks
    ///
    /// Environment variables:
    /// - `XJET_RETRY_MAX_ATTEMPTS`: Maximum attempts (default: 1)
    /// - `XJET_RETRY_BASE_DELAY_MS`: Base delay in milliseconds (default: 1000)
    /// - `XJET_RETRY_MAX_DELAY_MS`: Maximum delay in milliseconds (default: 30000)
    /// - `XJET_REQUEST_TIMEOUT_SECONDS`: Per-attempt timeout in seconds (default: none)
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable contains an invalid value
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();

        let max_attempts = match env::var("XJET_RETRY_MAX_ATTEMPTS") {
            Ok(val) => val.parse::<u32>().map_err(|e| {
                Error::InvalidRetryConfig(format!("Invalid XJET_RETRY_MAX_ATTEMPTS: {}", e))
            })?,
            Err(_) => defaults.max_attempts,
        };

        let base_delay_ms = match env::var("XJET_RETRY_BASE_DELAY_MS") {
            Ok(val) => val.parse::<u64>().map_err(|e| {
                Error::InvalidRetryConfig(format!("Invalid XJET_RETRY_BASE_DELAY_MS: {}", e))
            })?,
            Err(_) => defaults.base_delay_ms,
        };

        let max_delay_ms = match env::var("XJET_RETRY_MAX_DELAY_MS") {
            Ok(val) => val.parse::<u64>().map_err(|e| {
                Error::InvalidRetryConfig(format!("Invalid XJET_RETRY_MAX_DELAY_MS: {}", e))
            })?,
            Err(_) => defaults.max_delay_ms,
        };

        let timeout_seconds = match env::var("XJET_REQUEST_TIMEOUT_SECONDS") {
            Ok(val) => Some(val.parse::<u64>().map_err(|e| {
                Error::InvalidRetryConfig(format!("Invalid XJET_REQUEST_TIMEOUT_SECONDS: {}", e))
            })?),
            Err(_) => defaults.timeout_seconds,
        };

        let config = Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants between fields
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRetryConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidRetryConfig(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.base_delay_ms == 0 {
            return Err(Error::InvalidRetryConfig(
                "base_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::InvalidRetryConfig(
                "max_delay_ms must be greater than or equal to base_delay_ms".to_string(),
            ));
        }
        if self.timeout_seconds == Some(0) {
            return Err(Error::InvalidRetryConfig(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets a custom timeout value
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets custom max attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets custom base delay
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Sets custom max delay
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }
}

/// HTTP client with retry logic and exponential backoff
///
/// Only send failures, `429` and `5xx` responses are retried. When attempts
/// run out the last response is returned as-is so its body can still be
/// normalized.
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: Client,
    config: RetryConfig,
}

impl RetryClient {
    /// Creates a new RetryClient with the given configuration
    pub fn new(config: RetryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a new RetryClient with default configuration
    pub fn with_default_config() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Executes an HTTP request with retry logic and exponential backoff
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Transport`] if no attempt produced a response.
    pub async fn execute_with_retry<F>(&self, request_builder: F) -> Result<reqwest::Response, CallError>
    where
        F: Fn() -> reqwest::RequestBuilder + Send + Sync,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last_attempt = attempt >= self.config.max_attempts;

            let mut request = request_builder();
            if let Some(timeout) = self.config.timeout_seconds {
                request = request.timeout(StdDuration::from_secs(timeout));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS && !last_attempt {
                        let retry_after = self.extract_retry_after(&response).unwrap_or(60);
                        tracing::warn!(
                            "Rate limited (429) on attempt {}/{}. Retry after {} seconds",
                            attempt,
                            self.config.max_attempts,
                            retry_after
                        );
                        let delay_ms =
                            std::cmp::min(retry_after.saturating_mul(1000), self.config.max_delay_ms);
                        sleep(StdDuration::from_millis(delay_ms)).await;
                        continue;
                    }

                    if status.is_server_error() && !last_attempt {
                        tracing::warn!(
                            "Server error {} on attempt {}/{}",
                            status,
                            attempt,
                            self.config.max_attempts
                        );
                        sleep(self.calculate_backoff_delay(attempt)).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let description = if e.is_timeout() {
                        match self.config.timeout_seconds {
                            Some(timeout) => format!("Request timed out after {} seconds", timeout),
                            None => "Request timed out".to_string(),
                        }
                    } else {
                        e.to_string()
                    };

                    tracing::warn!(
                        "Request failed on attempt {}/{}: {}",
                        attempt,
                        self.config.max_attempts,
                        description
                    );

                    if last_attempt {
                        return Err(CallError::Transport(description));
                    }
                    sleep(self.calculate_backoff_delay(attempt)).await;
                }
            }
        }
    }

    /// Calculates the delay for exponential backoff with jitter
    ///
    /// Uses the formula: min(base_delay * 2^(attempt-1) + jitter, max_delay)
    /// where jitter is a random value between 0 and base_delay/2
    fn calculate_backoff_delay(&self, attempt: u32) -> StdDuration {
        use rand::Rng;

        let base_delay = self.config.base_delay_ms;
        let max_delay = self.config.max_delay_ms;

        let exponential_delay =
            base_delay.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
        let jitter = rand::thread_rng().gen_range(0..=base_delay / 2);
        let final_delay = std::cmp::min(exponential_delay.saturating_add(jitter), max_delay);

        tracing::debug!(
            "Calculated backoff delay for attempt {}: {}ms (exponential: {}ms, jitter: {}ms, capped at: {}ms)",
            attempt,
            final_delay,
            exponential_delay,
            jitter,
            max_delay
        );

        StdDuration::from_millis(final_delay)
    }

    /// Extracts the Retry-After header value from a 429 response
    fn extract_retry_after(&self, response: &reqwest::Response) -> Option<u64> {
        response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    }

    /// Gets the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Gets the retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

/// Production [`Dispatcher`] over one shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    retry_client: RetryClient,
}

impl HttpDispatcher {
    /// Creates a dispatcher sending through a fresh connection pool
    pub fn new(config: RetryConfig) -> Self {
        Self {
            retry_client: RetryClient::new(config),
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: OutboundRequest) -> Result<RawResponse, CallError> {
        // Bodies go out in the same layout they were signed in.
        let body = request
            .body
            .as_ref()
            .map(to_canonical_string)
            .transpose()
            .map_err(|e| CallError::InvalidRequest(e.to_string()))?;

        let response = self
            .retry_client
            .execute_with_retry(|| {
                let mut builder = self
                    .retry_client
                    .client()
                    .request(request.method.clone(), request.url.clone())
                    .headers(request.headers.clone());
                if !request.query.is_empty() {
                    builder = builder.query(&request.query);
                }
                if let Some(body) = &body {
                    builder = builder
                        .header(CONTENT_TYPE, "application/json")
                        .body(body.clone());
                }
                builder
            })
            .await?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CallError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}

/// Resolves operation names to endpoints and normalizes every outcome
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct Transport {
    base_url: Url,
    headers: HeaderMap,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Transport {
    /// Creates a transport for `base_url` authenticating with `api_key`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiKey`] if the key is empty or not a valid
    /// header value.
    pub fn new(base_url: Url, api_key: &str, dispatcher: Arc<dyn Dispatcher>) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidApiKey("API key must not be empty".to_string()));
        }
        let mut api_key_value = HeaderValue::from_str(api_key)
            .map_err(|_| Error::InvalidApiKey("API key contains invalid characters".to_string()))?;
        api_key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key_value);

        Ok(Self {
            base_url,
            headers,
            dispatcher,
        })
    }

    /// The base endpoint all operations are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of an operation: `<base>/<operation>`, separators removed
    /// from the operation name
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL does not parse.
    pub fn endpoint(&self, operation: &str) -> Result<Url, url::ParseError> {
        let operation = operation.replace('/', "");
        Url::parse(&format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            operation
        ))
    }

    /// Performs one API call
    ///
    /// Never fails with anything but a [`CallError`] value: application
    /// errors, transport failures and unparseable bodies all come back as
    /// `Err`.
    pub async fn call(
        &self,
        operation: &str,
        method: Method,
        body: Option<Payload>,
        query: &[(&str, &str)],
    ) -> ApiResponse {
        let url = self
            .endpoint(operation)
            .map_err(|e| CallError::InvalidRequest(format!("Invalid operation '{}': {}", operation, e)))?;

        tracing::debug!(%method, operation, %url, "Dispatching xJet API request");

        let request = OutboundRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        };

        let raw = self.dispatcher.dispatch(request).await?;
        let result = normalize_response(raw);
        if let Err(ref e) = result {
            tracing::debug!(operation, error = %e, "xJet API call failed");
        }
        result
    }

    /// POST with an optional JSON body
    pub async fn post(&self, operation: &str, body: Option<Payload>) -> ApiResponse {
        self.call(operation, Method::POST, body, &[]).await
    }
}

/// Maps a raw response to the uniform call outcome
///
/// The HTTP status is not consulted: the platform reports failures through
/// the `error` field of the body.
pub fn normalize_response(raw: RawResponse) -> ApiResponse {
    let value: Value = serde_json::from_str(&raw.body).map_err(|e| {
        CallError::InvalidResponse(format!(
            "status {}: {} (body: {})",
            raw.status,
            e,
            truncate(&raw.body, 200)
        ))
    })?;

    if let Some(error) = value.get("error") {
        if is_truthy(error) {
            return Err(CallError::Application(error.clone()));
        }
    }

    Ok(value)
}

/// JSON truthiness: null, false, zero, and empty strings, arrays and objects
/// are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Client for the xJet API
///
/// Composes one [`Transport`] with an optional [`Signer`]; endpoint groups
/// are exposed through thin wrappers borrowing the client:
///
/// ```rust,no_run
/// use xjet_rs::{ApiClient, Credentials, Environment};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(
///     Credentials::from_hex("API_KEY", "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")?,
///     Environment::Test,
/// )?;
///
/// let balances = client.account().balance().await?;
/// let receipt = client.account().withdraw("EQabc", "TON", 1.5).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Transport,
    signer: Option<Arc<dyn Signer>>,
}

#[allow(clippy::missing_errors_doc)]
impl ApiClient {
    /// Creates a client for one of the platform deployments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key is empty or not a valid header value
    /// - A signing key is present but is not 32 bytes long
    pub fn new(credentials: Credentials, environment: Environment) -> Result<Self, Error> {
        Self::with_config(credentials, environment, RetryConfig::default())
    }

    /// Creates a client for a deployment with a custom retry configuration.
    pub fn with_config(
        credentials: Credentials,
        environment: Environment,
        config: RetryConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(environment.base_url())?;
        Self::with_base_url_and_config(credentials, base_url, config)
    }

    /// Creates a client against an arbitrary base URL (self-hosted or mock servers).
    pub fn with_base_url(credentials: Credentials, base_url: Url) -> Result<Self, Error> {
        Self::with_base_url_and_config(credentials, base_url, RetryConfig::default())
    }

    pub fn with_base_url_and_config(
        credentials: Credentials,
        base_url: Url,
        config: RetryConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Self::with_dispatcher(credentials, base_url, Arc::new(HttpDispatcher::new(config)))
    }

    /// Creates a client sending through a custom [`Dispatcher`] (useful for testing).
    pub fn with_dispatcher(
        credentials: Credentials,
        base_url: Url,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, Error> {
        let transport = Transport::new(base_url, credentials.api_key.expose_secret(), dispatcher)?;
        let signer = match credentials.signing_key {
            Some(key) => Some(Arc::new(Ed25519Signer::from_bytes(key.expose_secret())?) as Arc<dyn Signer>),
            None => None,
        };

        tracing::debug!(
            base_url = %transport.base_url(),
            signing = signer.is_some(),
            "Created xJet API client"
        );

        Ok(Self { transport, signer })
    }

    /// Creates a client from environment variables.
    ///
    /// - `XJET_API_KEY` (required)
    /// - `XJET_PRIVATE_KEY`: hex Ed25519 private key (optional)
    /// - `XJET_NETWORK`: `mainnet`, `testnet` or `localnet` (default: mainnet)
    /// - `XJET_API_BASE_URL`: overrides the network's base URL
    /// - the `XJET_RETRY_*` variables read by [`RetryConfig::from_env`]
    pub fn from_env() -> Result<Self, Error> {
        let api_key =
            env::var("XJET_API_KEY").map_err(|_| Error::MissingEnvVar("XJET_API_KEY".to_string()))?;
        let credentials = match env::var("XJET_PRIVATE_KEY") {
            Ok(key_hex) if !key_hex.trim().is_empty() => Credentials::from_hex(api_key, &key_hex)?,
            _ => Credentials::api_key_only(api_key),
        };
        let config = RetryConfig::from_env()?;

        if let Ok(base_url) = env::var("XJET_API_BASE_URL") {
            return Self::with_base_url_and_config(credentials, Url::parse(&base_url)?, config);
        }

        let environment = match env::var("XJET_NETWORK") {
            Ok(network) => network.parse()?,
            Err(_) => Environment::default(),
        };
        Self::with_config(credentials, environment, config)
    }

    /// The underlying transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns true if signed endpoints can be called
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Hex public key matching the configured private key
    pub fn verifying_key_hex(&self) -> Option<String> {
        self.signer.as_ref().map(|signer| signer.verifying_key_hex())
    }

    /// Signs an arbitrary payload with the client's key.
    ///
    /// # Panics
    ///
    /// Panics if `payload` already contains a `signature` field.
    pub fn sign(&self, payload: Payload) -> Result<Payload, SignerError> {
        self.signer
            .as_ref()
            .ok_or(SignerError::MissingKey)?
            .sign(payload)
    }

    /// Calls any operation by name; see [`Transport::call`].
    pub async fn call(
        &self,
        operation: &str,
        method: Method,
        body: Option<Payload>,
        query: &[(&str, &str)],
    ) -> ApiResponse {
        self.transport.call(operation, method, body, query).await
    }

    pub(crate) async fn post_empty(&self, operation: &str) -> ApiResponse {
        self.transport.post(operation, None).await
    }

    pub(crate) async fn post_json<T: Serialize>(&self, operation: &str, request: &T) -> ApiResponse {
        let payload = to_payload(request).map_err(|e| CallError::InvalidRequest(e.to_string()))?;
        self.transport.post(operation, Some(payload)).await
    }

    pub(crate) async fn post_signed<T: Serialize>(&self, operation: &str, request: &T) -> ApiResponse {
        let payload = to_payload(request).map_err(|e| CallError::InvalidRequest(e.to_string()))?;
        if payload.contains_key(SIGNATURE_FIELD) {
            return Err(CallError::InvalidRequest(format!(
                "request body for '{}' must not contain a `{}` field",
                operation, SIGNATURE_FIELD
            )));
        }
        let signed = self.sign(payload)?;
        self.transport.post(operation, Some(signed)).await
    }

    pub(crate) async fn post_query(&self, operation: &str, query: &[(&str, &str)]) -> ApiResponse {
        self.transport.call(operation, Method::POST, None, query).await
    }

    pub(crate) async fn get(&self, operation: &str) -> ApiResponse {
        self.transport.call(operation, Method::GET, None, &[]).await
    }

    /// Account info, balances, deposits, withdrawals and history
    pub fn account(&self) -> Account<'_> {
        Account::new(self)
    }

    /// Cheque creation, status, listing and cancellation
    pub fn cheques(&self) -> Cheques<'_> {
        Cheques::new(self)
    }

    /// Invoice creation, status and listing
    pub fn invoices(&self) -> Invoices<'_> {
        Invoices::new(self)
    }

    /// NFT listing and transfers
    pub fn nft(&self) -> Nft<'_> {
        Nft::new(self)
    }

    /// Exchange pairs, quotes and orders
    pub fn exchanges(&self) -> Exchanges<'_> {
        Exchanges::new(self)
    }

    /// Platform-wide reference data
    pub fn system(&self) -> System<'_> {
        System::new(self)
    }
}
