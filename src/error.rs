//! Error taxonomy for the schedule engine

use thiserror::Error;

/// Errors produced while computing a contract schedule
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// A record-level input problem (bad value, empty rates, ...).
    /// Caught per record at the batch boundary; never aborts the batch.
    #[error("invalid input for `{field}`: {message}")]
    InvalidInput {
        /// Name of the offending input field
        field: &'static str,
        /// Human-readable description of what was wrong
        message: String,
    },

    /// Defensive guard for conditions the closed-form quarter calendar
    /// makes unreachable. Treated as a programmer error.
    #[error("logic invariant violated: {0}")]
    LogicInvariant(String),
}

impl EngineError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}
