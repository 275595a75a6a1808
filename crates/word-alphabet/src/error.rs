//! Word Error Types

use thiserror::Error;

/// Errors while building or parsing words
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WordError {
    /// Notation is not a valid word for the configured alphabet
    #[error("Malformed word '{notation}': {reason}")]
    MalformedWord { notation: String, reason: String },
}

impl WordError {
    pub(crate) fn malformed(notation: &str, reason: impl Into<String>) -> Self {
        WordError::MalformedWord {
            notation: notation.to_string(),
            reason: reason.into(),
        }
    }
}
