//! Sieve Trait

use crate::SieveError;
use std::fmt::Debug;

/// Reduces one iterated sums array to a fixed number of features
pub trait Sieve: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of values `transform` returns, independent of the input
    fn nfeatures(&self) -> usize;

    /// Features of one array
    fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError>;

    /// Learn thresholds from a set of training arrays
    fn fit(&mut self, _arrays: &[&[f64]]) -> Result<(), SieveError> {
        Ok(())
    }

    /// Whether `fit` must run before `transform`
    fn requires_fit(&self) -> bool {
        false
    }

    fn is_fitted(&self) -> bool {
        !self.requires_fit()
    }

    /// Fit on `arrays` and return the features of each of them
    fn fit_transform(&mut self, arrays: &[&[f64]]) -> Result<Vec<Vec<f64>>, SieveError> {
        self.fit(arrays)?;
        arrays.iter().map(|a| self.transform(a)).collect()
    }

    fn box_clone(&self) -> Box<dyn Sieve>;
}

impl Clone for Box<dyn Sieve> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
