//! Standardization

use crate::preparateur::{map_series, Preparateur};
use crate::PreparationError;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use series_batch::Batch;
use tracing::warn;

/// Where mean and standard deviation come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardizeMode {
    /// Each channel of each series is scaled by its own statistics
    #[default]
    PerSeries,
    /// Per-channel statistics learnt from the training batch
    Global,
}

/// Channel-wise z-score scaling
///
/// A channel with zero standard deviation is only centred.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Standardize {
    mode: StandardizeMode,
    /// `(mean, std)` per channel, `Global` mode only
    stats: Option<Vec<(f64, f64)>>,
}

impl Standardize {
    pub fn new(mode: StandardizeMode) -> Self {
        Self { mode, stats: None }
    }

    pub fn mode(&self) -> StandardizeMode {
        self.mode
    }

    /// Learnt `(mean, std)` per channel
    pub fn stats(&self) -> Option<&[(f64, f64)]> {
        self.stats.as_deref()
    }
}

fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    (mean, variance.sqrt())
}

fn scale(data: &Array2<f64>, stats: impl Fn(usize) -> (f64, f64)) -> Array2<f64> {
    let mut out = data.clone();
    for (c, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
        let (mean, std) = stats(c);
        if std > 0.0 {
            row.mapv_inplace(|v| (v - mean) / std);
        } else {
            row.mapv_inplace(|v| v - mean);
        }
    }
    out
}

impl Preparateur for Standardize {
    fn name(&self) -> &'static str {
        "Standardize"
    }

    fn requires_fit(&self) -> bool {
        self.mode == StandardizeMode::Global
    }

    fn is_fitted(&self) -> bool {
        !self.requires_fit() || self.stats.is_some()
    }

    fn fit(&mut self, batch: &Batch) -> Result<(), PreparationError> {
        if self.mode == StandardizeMode::PerSeries {
            return Ok(());
        }
        if batch.is_empty() {
            return Err(PreparationError::EmptyBatch(self.name()));
        }
        let stats: Vec<(f64, f64)> = (0..batch.channels())
            .map(|c| mean_std(batch.iter().flat_map(move |s| s.channel(c).into_iter().copied())))
            .collect();
        for (c, &(_, std)) in stats.iter().enumerate() {
            if std == 0.0 {
                warn!("Channel {} has zero variance; it will only be centred", c + 1);
            }
        }
        self.stats = Some(stats);
        Ok(())
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        match (self.mode, &self.stats) {
            (StandardizeMode::PerSeries, _) => map_series(batch, batch.channels(), |series| {
                scale(series.data(), |c| {
                    mean_std(series.channel(c).into_iter().copied())
                })
            }),
            (StandardizeMode::Global, Some(stats)) => {
                if stats.len() != batch.channels() {
                    return Err(PreparationError::invalid(
                        self.name(),
                        format!(
                            "fitted on {} channels, got {}",
                            stats.len(),
                            batch.channels()
                        ),
                    ));
                }
                map_series(batch, batch.channels(), |series| {
                    scale(series.data(), |c| stats[c])
                })
            }
            (StandardizeMode::Global, None) => Err(PreparationError::NotFitted(self.name())),
        }
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(self.clone())
    }
}
