//! Error types for SAMARTH

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamarthError {
    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Provider errors
    #[error("Unknown LLM provider '{provider}'. Try: {remediation}")]
    UnknownProvider {
        provider: String,
        remediation: String,
    },

    // Response shape errors
    #[error("Unexpected response from {source_name}: {reason}")]
    UnexpectedResponse { source_name: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SamarthError {
    fn from(err: serde_json::Error) -> Self {
        SamarthError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SamarthError>;
