//! Pipeline Error Types

use data_preparation::PreparationError;
use feature_sieve::SieveError;
use iss_engine::IssError;
use thiserror::Error;
use word_alphabet::WordError;

/// Errors raised while building, fitting or applying a [`crate::Fruit`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FruitError {
    /// A fittable component has not been fitted
    #[error("Branch {branch} is not fitted ({component} needs fit)")]
    BranchNotFitted { branch: usize, component: String },

    /// No series to fit or transform
    #[error("Cannot fit or transform an empty batch")]
    EmptyBatch,

    /// A branch without words produces nothing
    #[error("Branch {0} has no words")]
    NoWords(usize),

    #[error(transparent)]
    Word(#[from] WordError),

    #[error(transparent)]
    Iss(#[from] IssError),

    #[error(transparent)]
    Preparation(#[from] PreparationError),

    #[error(transparent)]
    Sieve(#[from] SieveError),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local worker pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    /// A global subscriber is already installed
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for FruitError {
    fn from(err: config::ConfigError) -> Self {
        FruitError::Config(err.to_string())
    }
}
