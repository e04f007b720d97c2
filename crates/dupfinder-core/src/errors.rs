//! Duplicate finder error types

use dupfinder_http::{HttpError, Retryable, StatusCode};
use thiserror::Error;

/// Errors that can occur while fetching projects or building the report
#[derive(Debug, Error)]
pub enum FinderError {
    /// Credential rejected by the API (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Organization (or another resource) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection failure, timeout or server-side error
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Page body could not be parsed into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A project record is missing a required field
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Any other client error status
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FinderError {
    /// Create a new malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        FinderError::MalformedResponse(msg.into())
    }

    /// Create a new config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        FinderError::Config(msg.into())
    }

    /// Create a new invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        FinderError::InvariantViolation(msg.into())
    }

    /// Check if this is an auth error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, FinderError::Authentication(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, FinderError::NotFound(_))
    }

    /// Check if this error is worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, FinderError::TransientNetwork(_))
    }
}

impl Retryable for FinderError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

impl From<HttpError> for FinderError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::HttpStatus { status, message } => classify_status(status, message),
            HttpError::RequestFailed(e) if e.is_builder() => FinderError::Config(e.to_string()),
            HttpError::RequestFailed(e) => FinderError::TransientNetwork(e.to_string()),
            HttpError::Timeout(duration) => {
                FinderError::TransientNetwork(format!("request timed out after {duration:?}"))
            }
            HttpError::InvalidUrl(msg)
            | HttpError::InvalidProxy(msg)
            | HttpError::InvalidHeader(msg)
            | HttpError::BuildError(msg) => FinderError::Config(msg),
        }
    }
}

fn classify_status(status: StatusCode, message: String) -> FinderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FinderError::Authentication(format!("HTTP {status}: {message}"))
        }
        StatusCode::NOT_FOUND => FinderError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => {
            FinderError::TransientNetwork(format!("HTTP {status}: {message}"))
        }
        s if s.is_server_error() => FinderError::TransientNetwork(format!("HTTP {s}: {message}")),
        s => FinderError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

/// Result type for duplicate finder operations
pub type Result<T> = std::result::Result<T, FinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn from_status(status: StatusCode) -> FinderError {
        HttpError::HttpStatus {
            status,
            message: "body".to_string(),
        }
        .into()
    }

    #[test]
    fn test_auth_statuses() {
        assert!(from_status(StatusCode::UNAUTHORIZED).is_auth_error());
        assert!(from_status(StatusCode::FORBIDDEN).is_auth_error());
    }

    #[test]
    fn test_not_found_status() {
        assert!(from_status(StatusCode::NOT_FOUND).is_not_found());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(from_status(StatusCode::INTERNAL_SERVER_ERROR).is_transient());
        assert!(from_status(StatusCode::GATEWAY_TIMEOUT).is_transient());
        assert!(from_status(StatusCode::TOO_MANY_REQUESTS).is_transient());
    }

    #[test]
    fn test_other_client_error_is_not_retryable() {
        let err = from_status(StatusCode::BAD_REQUEST);
        assert!(matches!(err, FinderError::Api { status: 400, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_is_transient() {
        let err: FinderError = HttpError::Timeout(std::time::Duration::from_secs(30)).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_url_is_config() {
        let err: FinderError = HttpError::InvalidUrl("nope".to_string()).into();
        assert!(matches!(err, FinderError::Config(_)));
    }
}
