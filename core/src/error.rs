//! Error type for the Imagga client.
//!
//! # Design
//! Every failure surfaces as one `ApiError`. Local input checks produce
//! `Validation` before any request is built. A 4xx response whose body carries
//! a `message` becomes `Remote`, and its `Display` is exactly that message so
//! callers see the service's wording unchanged. Everything the service did not
//! explain (bodies without `message`, 5xx, undecodable JSON, network failures)
//! gets its own variant.

use thiserror::Error;

/// Errors returned by `ImaggaClient`, `Imagga` and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input was rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The service answered 4xx with a `message` in the body.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The service answered 4xx but the body had no readable `message`.
    #[error("HTTP {status} without an error message: {body}")]
    MalformedErrorBody { status: u16, body: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A success body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request never produced a response (DNS, connect, timeout, I/O).
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A local file could not be read for upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Wrap any transport-level failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport(err.into())
    }

    /// True when the error was raised locally, before a request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// HTTP status of the response that caused the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. }
            | ApiError::MalformedErrorBody { status, .. }
            | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_service_message_verbatim() {
        let err = ApiError::Remote {
            status: 400,
            message: "bad url".to_string(),
        };
        assert_eq!(err.to_string(), "bad url");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_error_has_no_status() {
        let err = ApiError::validation("You can only request ten URLs");
        assert!(err.is_validation());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "You can only request ten URLs");
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::transport(io);
        assert!(err.to_string().contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
