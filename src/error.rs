//! Error types and handling for bytepipe

/// Result type alias for pipe operations
pub type Result<T> = std::result::Result<T, PipeError>;

/// Error kinds surfaced by the pipe, the buffer pool and sequence views
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipeError {
    /// Operation attempted after the relevant side closed the pipe
    #[error("Pipe closed: {context}")]
    PipeClosed { context: &'static str },

    /// Consumed/examined cursor moved backward or past the available data
    #[error("Invalid advance: {message} (consumed {consumed}, examined {examined})")]
    InvalidAdvance {
        consumed: u64,
        examined: u64,
        message: &'static str,
    },

    /// Copy target cannot hold the whole view
    #[error("Destination too small: required {required}, available {available}")]
    DestinationTooSmall { required: usize, available: usize },

    /// Fixed pool has no free buffer and growth is disabled
    #[error("Buffer pool exhausted: all {max_count} buffers checked out")]
    PoolExhausted { max_count: usize },

    /// Buffer released twice, or released by a party that never held it
    #[error("Double release of buffer {id}")]
    DoubleRelease { id: u64 },

    /// Operation aborted by a cancellation signal
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter {
        parameter: &'static str,
        message: String,
    },
}

impl PipeError {
    /// Create a closed-pipe error with context about the attempted operation
    pub fn closed(context: &'static str) -> Self {
        Self::PipeClosed { context }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            message: message.into(),
        }
    }
}

impl From<PipeError> for std::io::Error {
    fn from(error: PipeError) -> Self {
        use std::io::ErrorKind;

        let kind = match &error {
            PipeError::PipeClosed { .. } => ErrorKind::BrokenPipe,
            PipeError::Cancelled => ErrorKind::Interrupted,
            PipeError::PoolExhausted { .. } => ErrorKind::OutOfMemory,
            PipeError::InvalidAdvance { .. }
            | PipeError::DestinationTooSmall { .. }
            | PipeError::DoubleRelease { .. }
            | PipeError::InvalidParameter { .. } => ErrorKind::InvalidInput,
        };

        std::io::Error::new(kind, error)
    }
}
