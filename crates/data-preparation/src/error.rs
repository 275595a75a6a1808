//! Preparation Error Types

use iss_engine::IssError;
use series_batch::BatchError;
use thiserror::Error;

/// Errors raised while fitting or applying preparateurs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreparationError {
    /// `transform` called on a fittable preparateur before `fit`
    #[error("{0} must be fitted before transform")]
    NotFitted(&'static str),

    /// Parameter outside its allowed range
    #[error("Invalid parameter for {preparateur}: {reason}")]
    InvalidParameter {
        preparateur: &'static str,
        reason: String,
    },

    /// Fitting needs at least one series
    #[error("Cannot fit {0} on an empty batch")]
    EmptyBatch(&'static str),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Iss(#[from] IssError),
}

impl PreparationError {
    pub(crate) fn invalid(preparateur: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            preparateur,
            reason: reason.into(),
        }
    }
}
