//! Batch of Series

use crate::{BatchError, Series, SeriesShape};
use ndarray::{s, Array3};

/// An ordered set of series sharing a channel count
///
/// Lengths may differ between series. Row `i` of every feature matrix
/// derived from a batch corresponds to `batch.get(i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    series: Vec<Series>,
    channels: usize,
}

impl Batch {
    /// Create a batch, checking that all series share a channel count
    pub fn new(series: Vec<Series>) -> Result<Self, BatchError> {
        let channels = series.first().map(Series::channels).unwrap_or(0);
        for (index, s) in series.iter().enumerate() {
            if s.channels() != channels {
                return Err(BatchError::ChannelMismatch {
                    index,
                    expected: channels,
                    actual: s.channels(),
                });
            }
        }
        Ok(Self { series, channels })
    }

    /// Create an empty batch with a declared channel count
    pub fn empty(channels: usize) -> Self {
        Self {
            series: Vec::new(),
            channels,
        }
    }

    /// Split a `series × channels × time` array into a batch
    pub fn from_array3(data: &Array3<f64>) -> Self {
        let (n, channels, _) = data.dim();
        let series = (0..n)
            .map(|i| Series::new(data.slice(s![i, .., ..]).to_owned()))
            .collect();
        Self { series, channels }
    }

    /// Build a single-channel batch from raw value vectors
    pub fn from_univariate(values: Vec<Vec<f64>>) -> Self {
        let channels = if values.is_empty() { 0 } else { 1 };
        Self {
            series: values.into_iter().map(Series::univariate).collect(),
            channels,
        }
    }

    /// Number of series in the batch
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Fail with `EmptyBatch` if the batch holds no series
    pub fn ensure_not_empty(&self) -> Result<(), BatchError> {
        if self.is_empty() {
            Err(BatchError::EmptyBatch)
        } else {
            Ok(())
        }
    }

    /// Channel count shared by all series
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn get(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn into_series(self) -> Vec<Series> {
        self.series
    }

    /// Shape of series `index`
    pub fn shape_of(&self, index: usize) -> Option<SeriesShape> {
        self.series.get(index).map(Series::shape)
    }

    /// Common length if every series has the same number of time steps
    pub fn uniform_length(&self) -> Option<usize> {
        let first = self.series.first()?.len();
        self.series
            .iter()
            .all(|s| s.len() == first)
            .then_some(first)
    }

    /// Length of the longest series (0 for an empty batch)
    pub fn max_length(&self) -> usize {
        self.series.iter().map(Series::len).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
