//! Pusher client error types.

use thiserror::Error;

/// Result type for Pusher client operations.
pub type Result<T> = std::result::Result<T, PusherError>;

/// Boxed transport-level cause carried by [`PusherError::Http`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the Pusher client.
#[derive(Debug, Error)]
pub enum PusherError {
    /// A configuration value needed by the operation is missing.
    #[error("{0}")]
    Configuration(String),

    /// Webhook key or signature mismatch, or the API answered 401.
    #[error("{0}")]
    Authentication(String),

    /// The transport itself failed (timeout, refused connection, DNS, TLS).
    #[error("{message}")]
    Http {
        /// Human readable description.
        message: String,
        /// The original transport error.
        #[source]
        source: BoxError,
    },

    /// The request could not be completed, either because the API answered
    /// with an unsuccessful status or because it was rejected before sending.
    #[error("{message}")]
    Request {
        /// HTTP status code, when the API answered.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// Connection or proxy URL could not be parsed.
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error, e.g. while starting the blocking client's runtime.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PusherError {
    /// Build a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Build an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Wrap a transport failure, keeping it as the error source.
    pub fn http(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::Http {
            message: format!("Exception from transport ({})", source),
            source,
        }
    }

    /// Build a generic request error that never reached the API.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }

    /// Map an unsuccessful API status to the error taxonomy.
    ///
    /// `path` is the request path, used in the 404 message.
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        let message = match status {
            400 if body.is_empty() => "Bad request".to_string(),
            400 => body.to_string(),
            401 => {
                return Self::Authentication(if body.is_empty() {
                    "Authentication failed".to_string()
                } else {
                    body.to_string()
                });
            }
            404 => format!("404 Not found ({})", path),
            407 => "Proxy Authentication Required".to_string(),
            _ => format!("Unknown error (status code {}): {}", status, body),
        };

        Self::Request {
            status: Some(status),
            message,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an authentication error.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this wraps a transport failure.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Get the HTTP status code the API answered with, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_mapping() {
        assert!(PusherError::from_status(401, "/apps/1/x", "").is_authentication());

        let err = PusherError::from_status(404, "/apps/20/path", "");
        assert_eq!(err.to_string(), "404 Not found (/apps/20/path)");
        assert_eq!(err.status_code(), Some(404));

        let err = PusherError::from_status(407, "/", "ignored");
        assert_eq!(err.to_string(), "Proxy Authentication Required");

        let err = PusherError::from_status(500, "/", "some error");
        assert_eq!(err.to_string(), "Unknown error (status code 500): some error");

        let err = PusherError::from_status(418, "/", "teapot");
        assert_eq!(err.to_string(), "Unknown error (status code 418): teapot");
    }

    #[test]
    fn test_bad_request_uses_body() {
        let err = PusherError::from_status(400, "/", "Invalid channel name");
        assert_eq!(err.to_string(), "Invalid channel name");

        let err = PusherError::from_status(400, "/", "");
        assert_eq!(err.to_string(), "Bad request");
    }

    #[test]
    fn test_http_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = PusherError::http(io);

        assert!(err.is_http());
        assert_eq!(err.to_string(), "Exception from transport (timed out)");
        let source = err.source().unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
    }
}
