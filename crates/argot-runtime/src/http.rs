//! Blocking HTTP collaborator.
//!
//! Scripts get exactly one HTTP verb: a blocking GET returning the body
//! as a string. Rust owns the transport (TLS, timeout, error
//! classification); scripts own what to do with the body.

use argot_types::ErrorCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP GET, as scripts see it.
pub trait HttpClient: Send + Sync {
    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for invalid URLs, transport failures, and
    /// non-success statuses.
    fn get(&self, url: &str) -> Result<String, HttpError>;
}

/// HTTP helper errors, surfaced to scripts as native errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// URL did not start with `http://` or `https://`.
    #[error("invalid url (must be http:// or https://): {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("http status {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// DNS, connection, TLS, timeout, or body-read failure.
    #[error("http transport error: {0}")]
    Transport(String),
}

impl ErrorCode for HttpError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "HTTP_INVALID_URL",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Transport(_) => "HTTP_TRANSPORT",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}

/// Default [`HttpClient`] backed by a `ureq` agent.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom global timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<String, HttpError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(HttpError::InvalidUrl(url.to_string()));
        }
        debug!(url, "http get");

        let mut response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => HttpError::Status {
                status,
                url: url.to_string(),
            },
            other => HttpError::Transport(other.to_string()),
        })?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| HttpError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_types::assert_error_codes;

    #[test]
    fn rejects_non_http_schemes() {
        let client = UreqClient::new();
        assert!(matches!(
            client.get("ftp://example.com"),
            Err(HttpError::InvalidUrl(_))
        ));
        assert!(matches!(
            client.get("example.com"),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                HttpError::InvalidUrl("x".into()),
                HttpError::Status {
                    status: 502,
                    url: "http://example.com".into(),
                },
                HttpError::Transport("refused".into()),
            ],
            "HTTP_",
        );
    }
}
