//! Threshold-based Sieves
//!
//! Both sieves compare an array against thresholds. A threshold is either a
//! constant or a quantile probability resolved during fit from the pooled
//! values of (a sample of) the training arrays.

use crate::{Sieve, SieveError};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A threshold given as a constant or as a quantile probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    /// `true`: `value` is the threshold itself; `false`: a probability in `[0, 1]`
    #[serde(default)]
    pub constant: bool,
}

impl Threshold {
    pub fn constant(value: f64) -> Self {
        Self {
            value,
            constant: true,
        }
    }

    pub fn quantile(probability: f64) -> Self {
        Self {
            value: probability,
            constant: false,
        }
    }
}

/// Linear-interpolation quantile of unsorted values
pub fn quantile(values: &[f64], probability: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let position = probability.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (position - lo as f64))
}

#[derive(Debug, Clone, PartialEq)]
struct Thresholds {
    specs: Vec<Threshold>,
    sample_size: f64,
    seed: u64,
    resolved: Option<Vec<f64>>,
}

impl Thresholds {
    fn new(
        sieve: &'static str,
        specs: Vec<Threshold>,
        sample_size: f64,
        seed: u64,
    ) -> Result<Self, SieveError> {
        if specs.is_empty() {
            return Err(SieveError::invalid(sieve, "at least one threshold is required"));
        }
        if !(sample_size > 0.0 && sample_size <= 1.0) {
            return Err(SieveError::invalid(
                sieve,
                format!("sample size {} must lie in (0, 1]", sample_size),
            ));
        }
        if let Some(bad) = specs
            .iter()
            .find(|t| !t.constant && !(0.0..=1.0).contains(&t.value))
        {
            return Err(SieveError::invalid(
                sieve,
                format!("quantile probability {} must lie in [0, 1]", bad.value),
            ));
        }
        let resolved = specs
            .iter()
            .all(|t| t.constant)
            .then(|| specs.iter().map(|t| t.value).collect());
        Ok(Self {
            specs,
            sample_size,
            seed,
            resolved,
        })
    }

    fn requires_fit(&self) -> bool {
        self.specs.iter().any(|t| !t.constant)
    }

    fn fit(&mut self, sieve: &'static str, arrays: &[&[f64]]) -> Result<(), SieveError> {
        if !self.requires_fit() {
            return Ok(());
        }
        let pooled: Vec<f64> = if self.sample_size >= 1.0 {
            arrays.iter().flat_map(|a| a.iter().copied()).collect()
        } else {
            let amount = ((self.sample_size * arrays.len() as f64) as usize)
                .clamp(1, arrays.len().max(1));
            let mut rng = StdRng::seed_from_u64(self.seed);
            sample(&mut rng, arrays.len(), amount.min(arrays.len()))
                .into_iter()
                .flat_map(|i| arrays[i].iter().copied())
                .collect()
        };
        if pooled.is_empty() {
            return Err(SieveError::EmptyArray(sieve));
        }

        let resolved = self
            .specs
            .iter()
            .map(|t| {
                if t.constant {
                    Ok(t.value)
                } else {
                    quantile(&pooled, t.value).ok_or(SieveError::EmptyArray(sieve))
                }
            })
            .collect::<Result<Vec<f64>, SieveError>>()?;
        debug!("{} thresholds resolved to {:?}", sieve, resolved);
        self.resolved = Some(resolved);
        Ok(())
    }

    fn get(&self, sieve: &'static str) -> Result<&[f64], SieveError> {
        self.resolved
            .as_deref()
            .ok_or(SieveError::NotFitted(sieve))
    }
}

/// Proportion of values at or above each threshold
///
/// With `segments`, thresholds are sorted and the sieve reports the
/// proportion inside each band `[q_{i−1}, q_i)` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Ppv {
    thresholds: Thresholds,
    segments: bool,
}

impl Ppv {
    pub fn new(
        thresholds: Vec<Threshold>,
        sample_size: f64,
        seed: u64,
        segments: bool,
    ) -> Result<Self, SieveError> {
        if segments && thresholds.len() < 2 {
            return Err(SieveError::invalid("Ppv", "segments need at least two thresholds"));
        }
        Ok(Self {
            thresholds: Thresholds::new("Ppv", thresholds, sample_size, seed)?,
            segments,
        })
    }

    /// Single-threshold sieve using every training array
    pub fn single(threshold: Threshold) -> Result<Self, SieveError> {
        Self::new(vec![threshold], 1.0, 0, false)
    }

    /// Resolved thresholds, once fitted
    pub fn thresholds(&self) -> Option<&[f64]> {
        self.thresholds.resolved.as_deref()
    }
}

impl Sieve for Ppv {
    fn name(&self) -> &'static str {
        "Ppv"
    }

    fn nfeatures(&self) -> usize {
        let n = self.thresholds.specs.len();
        if self.segments {
            n - 1
        } else {
            n
        }
    }

    fn requires_fit(&self) -> bool {
        self.thresholds.requires_fit()
    }

    fn is_fitted(&self) -> bool {
        self.thresholds.resolved.is_some()
    }

    fn fit(&mut self, arrays: &[&[f64]]) -> Result<(), SieveError> {
        self.thresholds.fit("Ppv", arrays)
    }

    fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError> {
        let thresholds = self.thresholds.get(self.name())?;
        if array.is_empty() {
            return Err(SieveError::EmptyArray(self.name()));
        }
        let n = array.len() as f64;
        let proportion = |keep: &dyn Fn(f64) -> bool| {
            array.iter().filter(|&&v| keep(v)).count() as f64 / n
        };

        if self.segments {
            let mut sorted = thresholds.to_vec();
            sorted.sort_by(f64::total_cmp);
            Ok(sorted
                .windows(2)
                .map(|band| proportion(&|v| band[0] <= v && v < band[1]))
                .collect())
        } else {
            Ok(thresholds
                .iter()
                .map(|&q| proportion(&|v| v >= q))
                .collect())
        }
    }

    fn box_clone(&self) -> Box<dyn Sieve> {
        Box::new(self.clone())
    }
}

/// Connected components of values at or above each threshold
///
/// Reports `2 · r / L` where `r` counts the rising edges of `a ≥ q`; a
/// leading run counts as rising.
#[derive(Debug, Clone, PartialEq)]
pub struct Cpv {
    thresholds: Thresholds,
}

impl Cpv {
    pub fn new(thresholds: Vec<Threshold>, sample_size: f64, seed: u64) -> Result<Self, SieveError> {
        Ok(Self {
            thresholds: Thresholds::new("Cpv", thresholds, sample_size, seed)?,
        })
    }

    pub fn thresholds(&self) -> Option<&[f64]> {
        self.thresholds.resolved.as_deref()
    }
}

impl Sieve for Cpv {
    fn name(&self) -> &'static str {
        "Cpv"
    }

    fn nfeatures(&self) -> usize {
        self.thresholds.specs.len()
    }

    fn requires_fit(&self) -> bool {
        self.thresholds.requires_fit()
    }

    fn is_fitted(&self) -> bool {
        self.thresholds.resolved.is_some()
    }

    fn fit(&mut self, arrays: &[&[f64]]) -> Result<(), SieveError> {
        self.thresholds.fit("Cpv", arrays)
    }

    fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError> {
        let thresholds = self.thresholds.get(self.name())?;
        if array.is_empty() {
            return Err(SieveError::EmptyArray(self.name()));
        }
        let n = array.len() as f64;
        Ok(thresholds
            .iter()
            .map(|&q| {
                let mut above = false;
                let mut rising = 0usize;
                for &v in array {
                    let now = v >= q;
                    if now && !above {
                        rising += 1;
                    }
                    above = now;
                }
                2.0 * rising as f64 / n
            })
            .collect())
    }

    fn box_clone(&self) -> Box<dyn Sieve> {
        Box::new(self.clone())
    }
}
