//! Moving Average

use crate::preparateur::{map_series, Preparateur};
use crate::PreparationError;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use series_batch::Batch;

/// A length given either in time steps or as a fraction of the series length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Fixed(usize),
    /// Resolved during fit as `max(1, floor(f · L))` for the longest training series
    Fraction(f64),
}

impl Span {
    pub(crate) fn validate(&self, owner: &'static str) -> Result<(), PreparationError> {
        match *self {
            Span::Fixed(0) => Err(PreparationError::invalid(owner, "span must be at least 1")),
            Span::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(PreparationError::invalid(
                owner,
                format!("fraction {} must lie in (0, 1]", f),
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn is_fraction(&self) -> bool {
        matches!(self, Span::Fraction(_))
    }

    /// Concrete span for a training batch
    pub(crate) fn resolve(&self, batch: &Batch) -> usize {
        match *self {
            Span::Fixed(n) => n,
            Span::Fraction(f) => ((f * batch.max_length() as f64).floor() as usize).max(1),
        }
    }
}

/// Trailing moving average
///
/// With window `w`, `out[t] = x[t]` for `t < w − 1` and the mean of
/// `x[t − w + 1 ..= t]` afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    window: Span,
    resolved: Option<usize>,
}

impl MovingAverage {
    pub fn new(window: Span) -> Result<Self, PreparationError> {
        window.validate("MovingAverage")?;
        let resolved = match window {
            Span::Fixed(n) => Some(n),
            Span::Fraction(_) => None,
        };
        Ok(Self { window, resolved })
    }

    /// Window length in time steps, once known
    pub fn window(&self) -> Option<usize> {
        self.resolved
    }

    fn apply(data: &Array2<f64>, w: usize) -> Array2<f64> {
        let mut out = data.clone();
        for (row, mut target) in data.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            let mut running = 0.0;
            for t in 0..row.len() {
                running += row[t];
                if t >= w {
                    running -= row[t - w];
                }
                if t + 1 >= w {
                    target[t] = running / w as f64;
                }
            }
        }
        out
    }
}

impl Preparateur for MovingAverage {
    fn name(&self) -> &'static str {
        "MovingAverage"
    }

    fn requires_fit(&self) -> bool {
        self.window.is_fraction()
    }

    fn is_fitted(&self) -> bool {
        self.resolved.is_some()
    }

    fn fit(&mut self, batch: &Batch) -> Result<(), PreparationError> {
        if self.window.is_fraction() {
            if batch.is_empty() {
                return Err(PreparationError::EmptyBatch(self.name()));
            }
            self.resolved = Some(self.window.resolve(batch));
        }
        Ok(())
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        let w = self.resolved.ok_or(PreparationError::NotFitted(self.name()))?;
        map_series(batch, batch.channels(), |series| Self::apply(series.data(), w))
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_batch_eq, sample_batch};

    #[test]
    fn test_fixed_window() {
        let out = MovingAverage::new(Span::Fixed(2))
            .unwrap()
            .transform(&sample_batch())
            .unwrap();
        assert_batch_eq(
            &out,
            &[
                vec![vec![-4.0, -1.6, 0.4, 2.5, 1.0], vec![2.0, 1.5, 0.5, 0.0, -3.5]],
                vec![vec![5.0, 6.5, 5.0, 4.0, 3.0], vec![-5.0, -3.0, -2.5, -2.25, -4.25]],
            ],
        );
    }

    #[test]
    fn test_fractional_window() {
        let mut mav = MovingAverage::new(Span::Fraction(0.6)).unwrap();
        assert!(mav.transform(&sample_batch()).is_err());

        let out = mav.fit_transform(&sample_batch()).unwrap();
        assert_eq!(mav.window(), Some(3));
        let expected: Vec<Vec<Vec<f64>>> = vec![
            vec![vec![-12.0, 2.4, -3.2, 5.8, 2.0], vec![6.0, 3.0, 3.0, 1.0, -7.0]],
            vec![vec![15.0, 24.0, 15.0, 16.0, 8.0], vec![-15.0, -3.0, -10.0, -5.5, -12.5]],
        ]
        .into_iter()
        .map(|s| s.into_iter().map(|c| c.into_iter().map(|v| v / 3.0).collect()).collect())
        .collect();
        assert_batch_eq(&out, &expected);
    }

    #[test]
    fn test_invalid_windows() {
        assert!(MovingAverage::new(Span::Fixed(0)).is_err());
        assert!(MovingAverage::new(Span::Fraction(1.5)).is_err());
        assert!(MovingAverage::new(Span::Fraction(0.0)).is_err());
    }
}
