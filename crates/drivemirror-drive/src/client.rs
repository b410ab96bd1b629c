//! HTTP transport for the Google Drive v3 API
//!
//! Wraps `reqwest::Client` with bearer authentication, the two Drive
//! base URLs (metadata vs media upload), and the mapping from HTTP
//! outcomes to [`RemoteStoreError`] classes:
//!
//! - transport failures, 429 and 5xx → [`RemoteStoreError::Transient`]
//! - any other non-success status → [`RemoteStoreError::Permanent`]
//!
//! A 429 is additionally retried in place a few times, honoring the
//! `Retry-After` header when the server sends one. This is below the
//! level the sync engine sees: an exhausted retry budget surfaces as a
//! transient per-item failure and the next cycle tries again.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use drivemirror_core::domain::RemoteStoreError;

use crate::token::TokenProvider;

/// Base URL for metadata and download requests.
const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for content upload requests.
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// In-place retries for a throttled request before giving up.
const MAX_THROTTLE_RETRIES: u32 = 3;

/// Backoff when a 429 arrives without a usable Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Authenticated HTTP client for Drive API calls.
pub struct DriveClient {
    client: Client,
    api_base: String,
    upload_base: String,
    token: Arc<dyn TokenProvider>,
}

impl DriveClient {
    /// Creates a client against the production Drive endpoints.
    pub fn new(token: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_urls(token, API_BASE_URL, UPLOAD_BASE_URL)
    }

    /// Creates a client with custom base URLs (useful for testing).
    pub fn with_base_urls(
        token: Arc<dyn TokenProvider>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
            token,
        }
    }

    /// Authenticated request builder against the metadata base URL.
    pub fn api(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        self.client
            .request(method, &url)
            .bearer_auth(self.token.bearer_token())
    }

    /// Authenticated request builder against the upload base URL.
    pub fn upload(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base, path);
        self.client
            .request(method, &url)
            .bearer_auth(self.token.bearer_token())
    }

    /// Sends a request and resolves it to a successful response or a
    /// classified error, retrying 429s in place.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Response, RemoteStoreError> {
        let mut current = builder;
        let mut attempt = 0u32;

        loop {
            // Bodies built from owned bytes are cloneable; streaming
            // bodies would not be, and then throttling is not retried.
            let next = current.try_clone();

            let response = current.send().await.map_err(|err| {
                warn!(error = %err, "Drive request transport failure");
                RemoteStoreError::Transient(format!("transport failure: {err}"))
            })?;

            let status = response.status();
            if status.is_success() {
                if attempt > 0 {
                    info!(attempt, "Drive request succeeded after throttling");
                }
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry) = next {
                    if attempt < MAX_THROTTLE_RETRIES {
                        let delay = response
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                            .unwrap_or(DEFAULT_RETRY_AFTER);
                        info!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Drive API throttled request, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        current = retry;
                        continue;
                    }
                }
                warn!(attempts = attempt + 1, "Drive API throttle retries exhausted");
            }

            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, &body));
        }
    }
}

/// Maps a non-success status to an error class. 429 and 5xx are worth
/// retrying on a later cycle; everything else will keep failing until a
/// human intervenes.
fn classify(status: StatusCode, body: &str) -> RemoteStoreError {
    let detail = format!("HTTP {}: {}", status.as_u16(), snippet(body));
    debug!(status = status.as_u16(), "Drive API error response");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        RemoteStoreError::Transient(detail)
    } else {
        RemoteStoreError::Permanent(detail)
    }
}

/// First line of an error body, bounded, for log-friendly messages.
fn snippet(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "<empty body>".to_string();
    }
    let mut out: String = line.chars().take(200).collect();
    if line.chars().count() > 200 {
        out.push('…');
    }
    out
}

/// Parses a Retry-After header value: integer seconds first, then
/// HTTP-date, falling back to `default`.
fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let now = chrono::Utc::now();
        let target = date.with_timezone(&chrono::Utc);
        if target > now {
            let diff = target - now;
            if let Some(secs) = diff
                .num_seconds()
                .try_into()
                .ok()
                .filter(|&s: &u64| s <= 3600)
            {
                return Duration::from_secs(secs);
            }
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
