//! Error types for the food database client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Broad class of a retrieval failure, for callers deciding whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalKind {
    /// The request did not complete within the configured timeout
    Timeout,
    /// The service answered with a non-success status
    HttpStatus,
    /// The body was not the expected JSON shape
    Parse,
    /// Connection-level failure
    Transport,
}

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Identifier is not 8-14 digits; no request was made
    #[error("Invalid identifier {0:?}: expected 8 to 14 digits")]
    InvalidIdentifier(String),

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// API returned an error status other than not-found
    #[error("API error ({status}): {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, shortened
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Malformed response: {0}")]
    Parse(String),

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Retrieval class of this error, `None` for caller and config errors
    #[must_use]
    pub fn kind(&self) -> Option<RetrievalKind> {
        match self {
            Self::Timeout(_) => Some(RetrievalKind::Timeout),
            Self::HttpStatus { .. } => Some(RetrievalKind::HttpStatus),
            Self::Parse(_) => Some(RetrievalKind::Parse),
            Self::Request(_) => Some(RetrievalKind::Transport),
            Self::InvalidIdentifier(_) | Self::Config(_) => None,
        }
    }

    /// Check if a caller could reasonably retry this error
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::InvalidIdentifier(_) | Self::Parse(_) | Self::Config(_) => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::HttpStatus { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::HttpStatus { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).kind(),
            Some(RetrievalKind::Timeout)
        );
        assert_eq!(ApiError::http_status(500, "oops").kind(), Some(RetrievalKind::HttpStatus));
        assert_eq!(ApiError::parse("bad").kind(), Some(RetrievalKind::Parse));
        assert_eq!(ApiError::InvalidIdentifier("abc".into()).kind(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::http_status(503, "").is_retryable());
        assert!(ApiError::http_status(429, "").is_retryable());
        assert!(!ApiError::http_status(400, "").is_retryable());
        assert!(!ApiError::InvalidIdentifier("abc".into()).is_retryable());
    }

    #[test]
    fn test_status_classes() {
        assert!(ApiError::http_status(403, "").is_client_error());
        assert!(ApiError::http_status(502, "").is_server_error());
        assert!(!ApiError::parse("x").is_client_error());
    }

    #[test]
    fn test_from_json_error() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
