//! Preparateur Trait

use crate::PreparationError;
use ndarray::Array2;
use series_batch::{Batch, Series, SeriesShape};
use std::fmt::Debug;

/// A batch-to-batch transform applied before iterated sums
///
/// Stateless preparateurs only implement [`Preparateur::transform`].
/// Preparateurs that learn parameters from training data override
/// `requires_fit`, `is_fitted` and `fit`; their `transform` fails with
/// [`PreparationError::NotFitted`] until fitted.
pub trait Preparateur: Debug + Send + Sync {
    /// Short display name
    fn name(&self) -> &'static str;

    /// Apply the preparateur to every series of `batch`
    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError>;

    /// Learn parameters from a training batch
    fn fit(&mut self, _batch: &Batch) -> Result<(), PreparationError> {
        Ok(())
    }

    fn fit_transform(&mut self, batch: &Batch) -> Result<Batch, PreparationError> {
        self.fit(batch)?;
        self.transform(batch)
    }

    /// Whether `fit` must run before `transform`
    fn requires_fit(&self) -> bool {
        false
    }

    fn is_fitted(&self) -> bool {
        !self.requires_fit()
    }

    /// Shape of the output series for an input series of shape `input`
    fn output_shape(&self, input: SeriesShape) -> SeriesShape {
        input
    }

    /// Identity of this preparateur, fitted state included
    ///
    /// Two preparateurs with equal keys produce identical output for
    /// identical input.
    fn cache_key(&self) -> String {
        format!("{:?}", self)
    }

    fn box_clone(&self) -> Box<dyn Preparateur>;
}

impl Clone for Box<dyn Preparateur> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Apply `f` to every series, keeping the batch's order
pub(crate) fn map_series<F>(
    batch: &Batch,
    channels: usize,
    f: F,
) -> Result<Batch, PreparationError>
where
    F: Fn(&Series) -> Array2<f64>,
{
    if batch.is_empty() {
        return Ok(Batch::empty(channels));
    }
    let series = batch.iter().map(|s| Series::new(f(s))).collect();
    Ok(Batch::new(series)?)
}
