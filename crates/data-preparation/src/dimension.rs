//! Channel-adding preparateurs

use crate::preparateur::{map_series, Preparateur};
use crate::PreparationError;
use ndarray::{s, Array2};
use series_batch::{Batch, SeriesShape};

/// Lead-lag embedding
///
/// Channel `c` becomes channels `2c` (lead) and `2c + 1` (lag), each of
/// length `2L − 1`: lead `[x0, x1, x1, x2, x2, …]`, lag `[x0, x0, x1, x1, …]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeadLag;

impl LeadLag {
    fn apply(data: &Array2<f64>) -> Array2<f64> {
        let (channels, n) = data.dim();
        let length = (2 * n).saturating_sub(1);
        let mut out = Array2::zeros((2 * channels, length));
        for c in 0..channels {
            for j in 0..length {
                out[[2 * c, j]] = data[[c, (j + 1) / 2]];
                out[[2 * c + 1, j]] = data[[c, j / 2]];
            }
        }
        out
    }
}

impl Preparateur for LeadLag {
    fn name(&self) -> &'static str {
        "LeadLag"
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        map_series(batch, 2 * batch.channels(), |series| Self::apply(series.data()))
    }

    fn output_shape(&self, input: SeriesShape) -> SeriesShape {
        SeriesShape::new(2 * input.channels, (2 * input.length).saturating_sub(1))
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(*self)
    }
}

/// Appends a channel of ones
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct One;

impl Preparateur for One {
    fn name(&self) -> &'static str {
        "One"
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        map_series(batch, batch.channels() + 1, |series| {
            let (channels, n) = series.data().dim();
            let mut out = Array2::ones((channels + 1, n));
            out.slice_mut(s![..channels, ..]).assign(series.data());
            out
        })
    }

    fn output_shape(&self, input: SeriesShape) -> SeriesShape {
        SeriesShape::new(input.channels + 1, input.length)
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(*self)
    }
}
