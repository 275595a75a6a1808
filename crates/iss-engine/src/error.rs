//! ISS Error Types

use thiserror::Error;

/// Errors detected before iterated sums are computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssError {
    /// No series to compute on
    #[error("Cannot compute iterated sums of an empty batch")]
    EmptyBatch,

    /// A word references a channel the batch does not have
    #[error("Word {word} references channel {} but the batch has {channels} channels", channel + 1)]
    ChannelIndex {
        word: String,
        channel: usize,
        channels: usize,
    },

    /// A word without letters
    #[error("Word at position {0} has no letters")]
    EmptyWord(usize),
}
