//! Sieve Error Types

use thiserror::Error;

/// Errors raised by sieves
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SieveError {
    /// `transform` before `fit` on a sieve with learnt thresholds
    #[error("{0} must be fitted before transform")]
    NotFitted(&'static str),

    /// Parameter outside its allowed range
    #[error("Invalid parameter for {sieve}: {reason}")]
    InvalidParameter { sieve: &'static str, reason: String },

    /// Sieves need at least one value
    #[error("{0} cannot sieve an empty array")]
    EmptyArray(&'static str),
}

impl SieveError {
    pub(crate) fn invalid(sieve: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            sieve,
            reason: reason.into(),
        }
    }
}
