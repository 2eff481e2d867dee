use std::io;
use thiserror::Error;

/// Unified error type for the scmd dispatch core and shell front-end
#[derive(Error, Debug)]
pub enum ScmdError {
    /// A handler declared an unusable alias during registration
    #[error("invalid alias: {reason}")]
    InvalidAlias { reason: String },

    /// The single error kind surfaced by command execution, wrapping
    /// whatever failure escaped the handler
    #[error("command execution failed")]
    Execution {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yml::Error> for ScmdError {
    fn from(err: serde_yml::Error) -> Self {
        ScmdError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<serde_json::Error> for ScmdError {
    fn from(err: serde_json::Error) -> Self {
        ScmdError::Serialization(format!("JSON error: {}", err))
    }
}

impl ScmdError {
    /// Wrap a handler failure into the uniform execution error.
    pub fn execution(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ScmdError::Execution {
            source: source.into(),
        }
    }
}
