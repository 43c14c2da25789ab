//! Error types for the JSON API helpers.
//!
//! # Design
//! Every failure the layer can produce lands in one `ApiError` enum so callers
//! match on a single type. Nothing is retried or translated on the way out:
//! transport errors keep their source, serde errors are carried as-is, and a
//! non-2xx status keeps the raw body for debugging.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Errors returned by transports, POST helpers and `JsonApiClient` flows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// A required input was missing or blank. Raised before any I/O.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: &'static str },

    /// The transport failed to complete the round-trip.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The cancellation token fired before the transport finished.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered with a status outside 200..=299.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A `process_response` hook turned the response into a domain error.
    #[error("HTTP {status} rejected: {source}")]
    Rejected {
        status: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    pub(crate) fn blank_url() -> Self {
        ApiError::InvalidArgument {
            name: "url",
            reason: "must not be empty or whitespace",
        }
    }

    pub(crate) fn null_request() -> Self {
        ApiError::InvalidArgument {
            name: "request",
            reason: "must not serialize to null",
        }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ApiError::Transport(err.into())
    }

    /// Wrap a domain error raised while processing a response with `status`.
    pub fn rejected<E>(status: u16, err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ApiError::Rejected {
            status,
            source: err.into(),
        }
    }

    /// Status code carried by `Status` or `Rejected`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Downcast the domain error inside `Rejected`.
    pub fn rejection<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            ApiError::Rejected { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status() == Some(code)
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ApiError::InvalidArgument { .. })
    }
}

/// Reject empty or whitespace-only URLs before touching the transport.
pub(crate) fn require_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(ApiError::blank_url());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_and_body() {
        let err = ApiError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(err.is_status(503));
        assert!(!err.is_status(500));
    }

    #[test]
    fn require_url_rejects_blank_input() {
        for url in ["", "   ", "\t\n"] {
            let err = require_url(url).unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument { name: "url", .. }), "{url:?}");
        }
        assert!(require_url("http://localhost/x").is_ok());
    }

    #[test]
    fn transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::transport(io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("refused"));
        assert_eq!(err.status(), None);
    }
}
