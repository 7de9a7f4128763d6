//! Content API error types

use thiserror::Error;

/// Errors raised while configuring or talking to the content API
#[derive(Error, Debug)]
pub enum ContentError {
    /// Missing or invalid endpoint/token, detected before any request
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure, timeout or server-side error
    #[error("Content API unavailable: {0}")]
    RemoteUnavailable(String),

    /// The access token was rejected
    #[error("Access token rejected: {0}")]
    Auth(String),

    /// Unknown content type or identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ContentError {
    /// Whether the error is not user-recoverable and should stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, ContentError::Configuration(_) | ContentError::Auth(_))
    }

    /// Whether the error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(ContentError::Configuration("x".into()).is_fatal());
        assert!(ContentError::Auth("x".into()).is_fatal());
        assert!(!ContentError::RemoteUnavailable("x".into()).is_fatal());
        assert!(!ContentError::NotFound("x".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = ContentError::NotFound("posts/missing".into());
        assert_eq!(err.to_string(), "Not found: posts/missing");
    }
}
