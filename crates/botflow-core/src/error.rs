use thiserror::Error;

/// Core error type for the Botflow runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Node execution error
    #[error("Node execution error: {0}")]
    NodeExecutionError(String),

    /// Outbound send error
    #[error("Send error: {0}")]
    SendError(String),

    /// Traversal depth limit exceeded
    #[error("Traversal depth limit exceeded at node: {0}")]
    DepthLimitExceeded(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}
