use thiserror::Error;

/// Central error type for the publisher engine
#[derive(Error, Debug)]
pub enum PublisherError {
    // ============================================================================
    // Registry Errors
    // ============================================================================
    #[error("Unknown process type: {0}")]
    UnknownCategory(String),

    #[error("A process named '{0}' is already registered")]
    DuplicateProcess(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Process '{0}' does not collect a value")]
    NotACollector(String),

    // ============================================================================
    // Execution Errors
    // ============================================================================
    #[error("Value must be of type {expected} (got {found})")]
    TypeMismatch { expected: String, found: String },

    #[error("{process} failed:\n {details}")]
    PublishAborted { process: String, details: String },

    #[error("Process failed: {0}")]
    ProcessFailed(String),

    #[error("Fix method not yet implemented for {0}")]
    FixNotImplemented(String),

    // ============================================================================
    // Context Errors
    // ============================================================================
    #[error("Required context key not found: {0}")]
    MissingContextKey(String),

    #[error("Context key '{key}' is not a {expected}")]
    ContextType { key: String, expected: &'static str },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    GenericError(String),
}

// Implement conversion to String for UI layers
impl From<PublisherError> for String {
    fn from(error: PublisherError) -> Self {
        error.to_string()
    }
}

// Automatic conversion from String, handy inside process bodies
impl From<String> for PublisherError {
    fn from(err: String) -> Self {
        PublisherError::GenericError(err)
    }
}

impl From<&str> for PublisherError {
    fn from(err: &str) -> Self {
        PublisherError::GenericError(err.to_string())
    }
}

// Helper type alias for Results
pub type PublisherResult<T> = Result<T, PublisherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PublisherError::ProcessNotFound("task_id".to_string());
        assert_eq!(err.to_string(), "Process not found: task_id");
    }

    #[test]
    fn test_publish_aborted_message() {
        let err = PublisherError::PublishAborted {
            process: "Check X".to_string(),
            details: "Bad:node is broken".to_string(),
        };
        assert_eq!(err.to_string(), "Check X failed:\n Bad:node is broken");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = PublisherError::TypeMismatch {
            expected: "integer".to_string(),
            found: "string".to_string(),
        };
        let s: String = err.into();
        assert_eq!(s, "Value must be of type integer (got string)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PublisherError = io_err.into();
        assert!(matches!(err, PublisherError::Io(_)));
    }

    #[test]
    fn test_str_conversion() {
        let err: PublisherError = "scene is locked".into();
        assert!(matches!(err, PublisherError::GenericError(_)));
        assert_eq!(err.to_string(), "scene is locked");
    }
}
