//! HTTP client for the remote classification service.
//!
//! The service receives an application name and answers with one of the
//! closed category labels. Only the normalized app name leaves the process;
//! URLs and window titles never reach the network.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wt_core::{Category, Classify, ClassifyError};

/// Default request timeout for classification calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const CATEGORIZE_PATH: &str = "/categorize";

/// Classification client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL was unusable.
    #[error("invalid classifier URL: {reason}")]
    InvalidUrl { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service returned an error response.
    #[error("service error: {message}")]
    Service { message: String },
    /// Failed to parse the response body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Blocking HTTP client for the classification service.
///
/// Resolution is synchronous by contract, so requests block the calling
/// thread. The timeout bounds how long a single unresolved name can stall.
pub struct HttpClassifier {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl fmt::Debug for HttpClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClassifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpClassifier {
    /// Creates a client against the given service base URL with the
    /// default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or not HTTP(S), or if the
    /// HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(ClientError::InvalidUrl {
                reason: "URL cannot be empty",
            });
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ClientError::InvalidUrl {
                reason: "URL must start with http:// or https://",
            });
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self {
            http,
            endpoint: format!("{trimmed}{CATEGORIZE_PATH}"),
        })
    }

    /// Asks the service to categorize one application name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with an
    /// error status, or the response carries a label outside the closed
    /// category set.
    pub fn categorize(&self, app_name: &str) -> Result<Category, ClientError> {
        let request = CategorizeRequest { app_name };

        let response = self.http.post(&self.endpoint).json(&request).send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(parse_service_error(&body).unwrap_or_else(|| ClientError::Service {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: CategorizeResponse = serde_json::from_str(&body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        parse_category(&payload.category)
    }
}

impl Classify for HttpClassifier {
    fn classify(&self, normalized_name: &str) -> Result<Category, ClassifyError> {
        self.categorize(normalized_name).map_err(|err| match err {
            ClientError::Request(_) | ClientError::Service { .. } => {
                ClassifyError::Unavailable(err.to_string())
            }
            _ => ClassifyError::InvalidResponse(err.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct CategorizeRequest<'a> {
    app_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CategorizeResponse {
    category: String,
}

fn parse_category(label: &str) -> Result<Category, ClientError> {
    label
        .trim()
        .parse()
        .map_err(|err: wt_core::UnknownCategory| ClientError::InvalidResponse(err.to_string()))
}

fn parse_service_error(body: &str) -> Option<ClientError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| ClientError::Service {
            message: payload.error,
        })
}
