//! Error types for declaring, synthesizing and provisioning stacks

use thiserror::Error;

use crate::domain::ValidationError;
use crate::engine::ProvisioningError;

/// Errors that can occur while turning declarations into live resources
#[derive(Debug, Error)]
pub enum StackError {
    /// Declaration set violates an invariant; nothing was submitted
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Provisioning engine refused or failed the change
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StackError {
    /// Whether the failure was caught before anything reached the engine
    pub fn is_declaration_time(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StackError {
    fn from(err: std::io::Error) -> Self {
        StackError::Configuration(err.to_string())
    }
}
