/*!
# Variant Service
Blocking client for the remote variant-annotation endpoint.
A batch of identifiers is POSTed in one request; the response maps each identifier to either an annotation
object or an error marker.
Rate-limiting (HTTP 429) is handled by waiting for the server-specified `Retry-After` and sending exactly one more request.
Anything else that is not a success is fatal.
*/
use derive_builder::Builder;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use std::time::Duration;

/// Raw payload for one batch: identifier to JSON object (or error marker)
pub type BatchResponse = HashMap<String, serde_json::Value>;

/// Default wait if the server rate-limits without a usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("still rate-limited after one retry (Retry-After: {}s)", .retry_after.as_secs_f64())]
    RateLimited { retry_after: Duration },
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can resolve a batch of identifiers into raw annotation payloads.
pub trait VariantService {
    /// Fetches one batch; the batch size must already respect the service limit
    fn fetch_batch(&self, ids: &[String]) -> Result<BatchResponse, ServiceError>;
}

/// Outcome of a single request before any retry policy is applied
#[derive(Debug)]
pub enum Attempt {
    /// The server answered successfully
    Complete(BatchResponse),
    /// The server asked us to slow down
    RateLimited { retry_after: Duration }
}

/// Applies the retry policy: on a rate-limit, wait the requested delay and try exactly once more.
/// There is no further retry and no backoff; a second rate-limit becomes `ServiceError::RateLimited`.
/// # Arguments
/// * `send` - issues one request
/// * `wait` - called with the requested delay between the two attempts
pub fn retry_once_on_rate_limit<S, W>(mut send: S, wait: W) -> Result<BatchResponse, ServiceError>
where
    S: FnMut() -> Result<Attempt, ServiceError>,
    W: FnOnce(Duration)
{
    match send()? {
        Attempt::Complete(response) => Ok(response),
        Attempt::RateLimited { retry_after } => {
            warn!("Rate-limited by server, retrying once in {}s...", retry_after.as_secs_f64());
            wait(retry_after);
            match send()? {
                Attempt::Complete(response) => Ok(response),
                Attempt::RateLimited { retry_after } => Err(ServiceError::RateLimited { retry_after })
            }
        }
    }
}

/// Parses a `Retry-After` header value in (possibly fractional) seconds, e.g. `40.0`.
/// Negative, non-finite, or unparseable values fall back to `DEFAULT_RETRY_AFTER`.
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Connection settings for the annotation endpoint
#[derive(Builder, Clone, Debug, Serialize)]
#[builder(default)]
pub struct ServiceConfig {
    /// Base URL of the REST server
    #[builder(setter(into))]
    server: String,
    /// Path of the batch POST endpoint
    #[builder(setter(into))]
    endpoint: String,
    /// Per-request timeout
    timeout: Duration
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: "https://grch37.rest.ensembl.org".to_string(),
            endpoint: "/variation/homo_sapiens".to_string(),
            timeout: Duration::from_secs(60)
        }
    }
}

impl ServiceConfig {
    /// Full URL of the batch endpoint
    pub fn url(&self) -> String {
        format!("{}{}", self.server.trim_end_matches('/'), self.endpoint)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Request body for the batch endpoint
#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String]
}

/// Blocking client for the Ensembl REST variation endpoint, requesting population frequencies.
pub struct EnsemblClient {
    /// Shared HTTP client with the configured timeout
    client: Client,
    /// Full endpoint URL
    url: String
}

impl EnsemblClient {
    /// Builds a client from the connection settings
    /// # Errors
    /// * if the underlying HTTP client cannot be constructed
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.url()
        })
    }

    /// Sends one request without any retry handling
    fn send_once(&self, ids: &[String]) -> Result<Attempt, ServiceError> {
        debug!("POST {} with {} identifiers", self.url, ids.len());
        let response = self.client.post(&self.url)
            .query(&[("pops", "1")])
            .header(ACCEPT, "application/json")
            .json(&BatchRequest { ids })
            .send()?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(
                response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok())
            );
            return Ok(Attempt::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Status { status: status.as_u16(), body });
        }

        let text = response.text()?;
        let payload: BatchResponse = serde_json::from_str(&text)?;
        Ok(Attempt::Complete(payload))
    }
}

impl VariantService for EnsemblClient {
    fn fetch_batch(&self, ids: &[String]) -> Result<BatchResponse, ServiceError> {
        retry_once_on_rate_limit(|| self.send_once(ids), std::thread::sleep)
    }
}
