use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegCapError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing parameter: {field} is required for {context}")]
    MissingParameter { field: String, context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RegCapError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RegCapError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for RegCapError {
    fn from(e: serde_json::Error) -> Self {
        RegCapError::SerializationError(e.to_string())
    }
}
