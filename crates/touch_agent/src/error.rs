//! Error types for device communication and touch injection

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TouchError {
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Connection timeout: {0}")]
    Timeout(String),

    #[error("File transfer failed: {0}")]
    TransferFailed(String),

    #[error("{context}: {source}")]
    Injection {
        context: String,
        #[source]
        source: Box<TouchError>,
    },

    #[error("Unknown injection strategy: {0}")]
    InvalidStrategy(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TouchError {
    /// Wrap this error with an operation-specific message
    pub fn context(self, context: impl Into<String>) -> Self {
        TouchError::Injection {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the error came from the device channel rather than local input
    pub fn is_communication(&self) -> bool {
        match self {
            TouchError::CommandFailed(_)
            | TouchError::Timeout(_)
            | TouchError::TransferFailed(_)
            | TouchError::Io(_) => true,
            TouchError::Injection { source, .. } => source.is_communication(),
            TouchError::InvalidStrategy(_) | TouchError::Parse(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TouchError>;
