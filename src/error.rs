//! Error types for remote asset operations.
//!
//! Orchestrators absorb [`Error::NotFound`] and retry the transient kinds;
//! everything else is propagated to the caller.

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the remote asset client and the orchestrators on top of it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Folder or asset is already absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service rejected the call because of its rate limits.
    #[error("rate limited by remote service: {0}")]
    RateLimited(String),

    /// The remote service could not be reached or failed internally.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A path or identifier argument is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote service rejected the request with a client error.
    #[error("remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The remote service answered with a body that could not be decoded.
    #[error("failed to decode remote response: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Create a remote client error.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Returns true if the target was already absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for failures worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::RemoteUnavailable(_))
    }

    /// Returns true if the remote refused the call without applying it.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Get the HTTP status code a caller should see for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidArgument(_) => 400,
            Self::RateLimited(_) => 429,
            Self::RemoteUnavailable(_) => 503,
            Self::Remote { .. } | Self::Decode(_) => 502,
            Self::Config(_) => 500,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status().map(|s| s.as_u16()) {
            Some(404) => Self::NotFound(err.to_string()),
            Some(420 | 429) => Self::RateLimited(err.to_string()),
            Some(status) if status < 500 => Self::remote(status, err.to_string()),
            _ => Self::RemoteUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(Error::RateLimited("slow down".into()).is_transient());
        assert!(Error::RemoteUnavailable("502".into()).is_transient());
        assert!(!Error::not_found("a/b").is_transient());
        assert!(!Error::remote(400, "folder is not empty").is_transient());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("x").status_code(), 404);
        assert_eq!(Error::invalid_argument("empty").status_code(), 400);
        assert_eq!(Error::RateLimited(String::new()).status_code(), 429);
        assert_eq!(Error::remote(409, "exists").status_code(), 502);
    }
}
