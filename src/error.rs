/// Error types for the translation relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Request body did not have the expected shape
    InvalidRequest(String),
    /// A single backend call exceeded its timeout
    Timeout(String),
    /// Transport-level failure talking to the backend
    NetworkError(String),
    /// Backend answered, but not with a usable translation
    TranslationError(String),
    /// Cohort rejected by admission control, or the scheduler could not grant capacity
    Overloaded { requested: usize, ceiling: usize },
    /// Dictionary could not be loaded
    DictionaryError(String),
    /// Invalid or missing configuration
    ConfigError(String),
    /// Anything that should not happen, e.g. a dispatch task dying without an outcome
    Internal(String),
}

impl RelayError {
    /// Whether this error is a call timeout rather than any other failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, RelayError::Timeout(_))
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            RelayError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            RelayError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RelayError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            RelayError::Overloaded { requested, ceiling } => write!(
                f,
                "Overloaded: {} tasks requested, admission ceiling is {}",
                requested, ceiling
            ),
            RelayError::DictionaryError(msg) => write!(f, "Dictionary error: {}", msg),
            RelayError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            RelayError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(err.to_string())
        } else if err.is_decode() {
            RelayError::TranslationError(format!("Failed to parse backend response: {}", err))
        } else {
            RelayError::NetworkError(err.to_string())
        }
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout() {
        assert!(RelayError::Timeout("slow".to_string()).is_timeout());
        assert!(!RelayError::NetworkError("refused".to_string()).is_timeout());
        assert!(!RelayError::TranslationError("bad".to_string()).is_timeout());
    }

    #[test]
    fn test_overloaded_display() {
        let err = RelayError::Overloaded {
            requested: 40,
            ceiling: 25,
        };
        assert_eq!(
            err.to_string(),
            "Overloaded: 40 tasks requested, admission ceiling is 25"
        );
    }
}
