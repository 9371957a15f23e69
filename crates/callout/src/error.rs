//! Errors raised by the host flow collaborators.

use thiserror::Error;

/// Failures reported by a [`FlowContext`](crate::FlowContext).
#[derive(Error, Debug)]
pub enum ContextError {
    /// The host refused to store a variable.
    #[error("Cannot set flow variable '{name}': {reason}")]
    VariableRejected { name: String, reason: String },

    /// The message for the requested direction is not available in this flow.
    #[error("No {0} message available in this flow")]
    MessageUnavailable(String),

    #[error("Invalid callout properties: {0}")]
    Config(String),
}

/// Result type alias for host collaborator operations.
pub type Result<T> = std::result::Result<T, ContextError>;
