//! Preparation Chain

use crate::{Preparateur, PreparationError};
use series_batch::{Batch, SeriesShape};
use tracing::debug;

/// Preparateurs applied left to right
#[derive(Debug, Clone, Default)]
pub struct PreparationChain {
    steps: Vec<Box<dyn Preparateur>>,
}

impl PreparationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, preparateur: Box<dyn Preparateur>) {
        self.steps.push(preparateur);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Box<dyn Preparateur>] {
        &self.steps
    }

    pub fn requires_fit(&self) -> bool {
        self.steps.iter().any(|p| p.requires_fit())
    }

    pub fn is_fitted(&self) -> bool {
        self.steps.iter().all(|p| p.is_fitted())
    }

    /// Names of the steps that still need fitting
    pub fn unfitted(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|p| !p.is_fitted())
            .map(|p| p.name())
            .collect()
    }

    /// Fit every step on the output of its predecessors and return the
    /// fully prepared training batch
    pub fn fit_transform(&mut self, batch: &Batch) -> Result<Batch, PreparationError> {
        let mut current = batch.clone();
        for step in &mut self.steps {
            debug!("Fitting preparateur {}", step.name());
            current = step.fit_transform(&current)?;
        }
        Ok(current)
    }

    pub fn fit(&mut self, batch: &Batch) -> Result<(), PreparationError> {
        self.fit_transform(batch).map(|_| ())
    }

    pub fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        self.transform_inspect(batch, |_| {})
    }

    /// Transform, handing every intermediate batch to `inspect`
    pub fn transform_inspect<F>(&self, batch: &Batch, mut inspect: F) -> Result<Batch, PreparationError>
    where
        F: FnMut(&Batch),
    {
        let mut current = batch.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
            inspect(&current);
        }
        Ok(current)
    }

    pub fn output_shape(&self, input: SeriesShape) -> SeriesShape {
        self.steps.iter().fold(input, |shape, p| p.output_shape(shape))
    }

    /// Identity of the whole chain; equal keys mean equal prepared batches
    pub fn cache_key(&self) -> String {
        self.steps
            .iter()
            .map(|p| p.cache_key())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
