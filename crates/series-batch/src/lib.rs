//! Series and Batch Containers
//!
//! Provides the multivariate time series type shared by every stage of the
//! signature feature pipeline.

mod batch;
mod error;

pub use batch::Batch;
pub use error::BatchError;

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Shape of a single series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesShape {
    pub channels: usize,
    pub length: usize,
}

impl SeriesShape {
    pub fn new(channels: usize, length: usize) -> Self {
        Self { channels, length }
    }
}

/// A multivariate time series stored as `channels × length`
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    data: Array2<f64>,
}

impl Series {
    /// Wrap a `channels × length` matrix
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Build a series from one vector per channel
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Result<Self, BatchError> {
        let n_channels = channels.len();
        let length = channels.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = channels.iter().position(|c| c.len() != length) {
            return Err(BatchError::Shape(format!(
                "channel {} has length {}, expected {}",
                bad,
                channels[bad].len(),
                length
            )));
        }
        let flat: Vec<f64> = channels.into_iter().flatten().collect();
        Array2::from_shape_vec((n_channels, length), flat)
            .map(Self::new)
            .map_err(|e| BatchError::Shape(e.to_string()))
    }

    /// Build a single-channel series
    pub fn univariate(values: Vec<f64>) -> Self {
        Self {
            data: Array1::from(values).insert_axis(Axis(0)),
        }
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    /// Check if the series has no time steps
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> SeriesShape {
        SeriesShape::new(self.channels(), self.len())
    }

    /// Value of channel `channel` at time step `t`
    #[inline]
    pub fn value(&self, channel: usize, t: usize) -> f64 {
        self.data[[channel, t]]
    }

    /// View of one channel over time
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f64> {
        self.data.row(channel)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}
