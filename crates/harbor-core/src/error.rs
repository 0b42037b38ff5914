//! Error types for the Harbor script host

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the Harbor script host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed route pattern rejected at registration time
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// The same (verb, pattern) pair was registered twice
    #[error("route already registered: {verb} {pattern}")]
    DuplicateRoute {
        /// HTTP verb of the duplicate
        verb: String,
        /// Pattern of the duplicate
        pattern: String,
    },

    /// A middleware or handler failed while servicing a request
    #[error("handler fault: {0}")]
    Handler(String),

    /// An external collaborator reported a failure
    #[error("collaborator '{name}' failed: {message}")]
    Collaborator {
        /// Collaborator name (database, mail, ...)
        name: String,
        /// Failure detail
        message: String,
    },

    /// Invalid inbound request data
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a collaborator error
    pub fn collaborator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Collaborator {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a handler fault
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidRequest("empty method".to_string()).to_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Handler("boom".to_string()).to_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_collaborator_error() {
        let err = Error::collaborator("mail", "connection refused");
        assert!(matches!(err, Error::Collaborator { .. }));
        assert!(err.to_string().contains("mail"));
    }
}
