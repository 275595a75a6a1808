//! Batch Error Types

use thiserror::Error;

/// Errors while assembling or validating a batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    /// Batch holds no series
    #[error("Batch is empty")]
    EmptyBatch,

    /// A series disagrees with the batch channel count
    #[error("Series {index} has {actual} channels, expected {expected}")]
    ChannelMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Raw data could not be arranged into a series
    #[error("Invalid series shape: {0}")]
    Shape(String),
}
