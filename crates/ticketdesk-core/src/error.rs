//! Error types for ticketdesk

/// Result type alias using ticketdesk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ticketdesk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote classifier could not produce a usable prediction
    #[error("remote classifier unavailable: {0}")]
    RemoteUnavailable(RemoteFailure),

    /// History storage could not be read or written
    #[error("history persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Another prediction for the same user has not resolved yet
    #[error("a prediction is already in flight for user '{0}'")]
    PredictionInFlight(String),

    /// The caller abandoned the request before it resolved
    #[error("prediction cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceUnavailable(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure came from the remote classifier and may be
    /// substituted with an offline estimate.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_))
    }
}

impl From<RemoteFailure> for Error {
    fn from(failure: RemoteFailure) -> Self {
        Self::RemoteUnavailable(failure)
    }
}

/// Why a remote classification call failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteFailure {
    /// No response within the request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_converts_to_remote_unavailable() {
        let err: Error = RemoteFailure::Status(503).into();
        assert!(err.is_fallback_eligible());
        assert_eq!(
            err.to_string(),
            "remote classifier unavailable: unexpected status 503"
        );
    }

    #[test]
    fn test_persistence_error_is_not_fallback_eligible() {
        let err = Error::persistence("quota exceeded");
        assert!(!err.is_fallback_eligible());
        assert!(err.to_string().contains("quota exceeded"));
    }
}
