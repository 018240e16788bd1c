use crate::errors::ArborError;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to serialize state: {message}")]
    SerializationFailed { message: String },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ArborError for StateError {
    fn error_code(&self) -> &'static str {
        match self {
            StateError::SerializationFailed { .. } => "STATE_SERIALIZATION_FAILED",
            StateError::IoError { .. } => "STATE_IO_ERROR",
        }
    }
}
