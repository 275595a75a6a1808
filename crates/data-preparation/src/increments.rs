//! Increments

use crate::preparateur::{map_series, Preparateur};
use crate::PreparationError;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use series_batch::{Batch, SeriesShape};

/// How the first step of an increment series is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// `[0, x1 − x0, …]`
    #[default]
    Zero,
    /// `[x0, x1 − x0, …]`
    Keep,
    /// `[x1 − x0, …]`, one step shorter
    Drop,
}

/// Step-wise differences of every channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Increments {
    padding: Padding,
}

impl Increments {
    pub fn new(padding: Padding) -> Self {
        Self { padding }
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    fn apply(&self, data: &Array2<f64>) -> Array2<f64> {
        let (channels, n) = data.dim();
        if n == 0 {
            return data.clone();
        }
        let diffs = &data.slice(s![.., 1..]) - &data.slice(s![.., ..n - 1]);
        match self.padding {
            Padding::Drop => diffs,
            Padding::Zero | Padding::Keep => {
                let mut out = Array2::zeros((channels, n));
                out.slice_mut(s![.., 1..]).assign(&diffs);
                if self.padding == Padding::Keep {
                    out.column_mut(0).assign(&data.column(0));
                }
                out
            }
        }
    }
}

impl Preparateur for Increments {
    fn name(&self) -> &'static str {
        "Increments"
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        map_series(batch, batch.channels(), |series| self.apply(series.data()))
    }

    fn output_shape(&self, input: SeriesShape) -> SeriesShape {
        match self.padding {
            Padding::Drop => SeriesShape::new(input.channels, input.length.saturating_sub(1)),
            _ => input,
        }
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(*self)
    }
}
