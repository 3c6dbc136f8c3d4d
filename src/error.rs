//! Unified error handling for the gesture console.
//!
//! Two failure classes matter to callers: transport failures (the service is
//! unreachable or answered with a non-success status) and validation failures
//! (a client-side precondition was violated before any request went out).
//! Render errors exist only for the raster surface's PNG export path.

use thiserror::Error;

/// Unified error type for gesture console operations.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The service was unreachable or answered with a non-success status.
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        /// HTTP status, when the failure came from a completed response.
        status: Option<u16>,
    },

    /// A client-side precondition was violated; no request was sent.
    #[error("validation failure: {message}")]
    Validation { message: String },

    /// The raster surface could not be exported.
    #[error("render failure: {message}")]
    Render { message: String },
}

impl ClientError {
    /// Build a transport error without a status code.
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Build a transport error from an HTTP status.
    pub fn status(message: impl Into<String>, status: u16) -> Self {
        ClientError::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
        }
    }

    /// Whether this is a client-side validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for ClientError {
    fn from(err: image::ImageError) -> Self {
        ClientError::Render {
            message: err.to_string(),
        }
    }
}

/// Result type alias for gesture console operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::status("service answered 503", 503);
        assert!(err.to_string().contains("transport failure"));
        assert!(err.to_string().contains("503"));

        let err = ClientError::validation("name must not be empty");
        assert!(err.to_string().contains("validation failure"));
    }

    #[test]
    fn test_is_validation() {
        assert!(ClientError::validation("x").is_validation());
        assert!(!ClientError::transport("x").is_validation());
    }
}
