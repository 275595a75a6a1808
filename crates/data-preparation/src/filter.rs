//! Time-step Filters
//!
//! Preparateurs that zero out parts of every series while keeping its shape.

use crate::increments::{Increments, Padding};
use crate::moving_average::Span;
use crate::preparateur::{map_series, Preparateur};
use crate::PreparationError;
use iss_engine::iterated_sums;
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use series_batch::Batch;
use tracing::debug;
use word_alphabet::{ExtendedLetter, Word};

/// Keeps every n-th time step (indices `n − 1, 2n − 1, …`) and zeroes the rest
#[derive(Debug, Clone, PartialEq)]
pub struct Dotting {
    spacing: Span,
    resolved: Option<usize>,
}

impl Dotting {
    pub fn new(spacing: Span) -> Result<Self, PreparationError> {
        spacing.validate("Dotting")?;
        let resolved = match spacing {
            Span::Fixed(n) => Some(n),
            Span::Fraction(_) => None,
        };
        Ok(Self { spacing, resolved })
    }

    pub fn spacing(&self) -> Option<usize> {
        self.resolved
    }

    fn apply(data: &Array2<f64>, n: usize) -> Array2<f64> {
        let length = data.ncols();
        let mut out = Array2::zeros(data.dim());
        if length == 0 {
            return out;
        }
        // a spacing longer than the series keeps its last point
        let n = n.min(length).max(1);
        for t in (n - 1..length).step_by(n) {
            out.column_mut(t).assign(&data.column(t));
        }
        out
    }
}

impl Preparateur for Dotting {
    fn name(&self) -> &'static str {
        "Dotting"
    }

    fn requires_fit(&self) -> bool {
        self.spacing.is_fraction()
    }

    fn is_fitted(&self) -> bool {
        self.resolved.is_some()
    }

    fn fit(&mut self, batch: &Batch) -> Result<(), PreparationError> {
        if self.spacing.is_fraction() {
            if batch.is_empty() {
                return Err(PreparationError::EmptyBatch(self.name()));
            }
            self.resolved = Some(self.spacing.resolve(batch));
        }
        Ok(())
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        let n = self.resolved.ok_or(PreparationError::NotFitted(self.name()))?;
        map_series(batch, batch.channels(), |series| Self::apply(series.data(), n))
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(self.clone())
    }
}

/// Zeroes every time step outside a band of normalised quadratic variation
///
/// `Q(t)` is the iterated sum of `[c^2]` over the zero-padded increments,
/// summed over channels and divided by its maximum, so it rises from 0 to 1.
/// Time steps with `Q(t)` outside `[start, end]` are set to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    start: f64,
    end: f64,
}

impl Window {
    pub fn new(start: f64, end: f64) -> Result<Self, PreparationError> {
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start > end {
            return Err(PreparationError::invalid(
                "Window",
                format!("need 0 <= start <= end <= 1, got [{}, {}]", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// Normalised quadratic variation of every series
    pub fn quadratic_variation(batch: &Batch) -> Result<Vec<Array1<f64>>, PreparationError> {
        let increments = Increments::new(Padding::Zero).transform(batch)?;
        let words: Vec<Word> = (0..batch.channels())
            .map(|c| Word::from_letters(vec![ExtendedLetter::from_pairs([(c, 2)])]))
            .collect();
        let sums = iterated_sums(&increments, &words)?;

        let variation = batch
            .iter()
            .enumerate()
            .map(|(i, series)| {
                let mut q = Array1::zeros(series.len());
                for output in 0..sums.len() {
                    q += sums.get(output, i);
                }
                let max = q.fold(0.0_f64, |m, &v| m.max(v));
                if max > 0.0 {
                    q /= max;
                }
                q
            })
            .collect();
        Ok(variation)
    }
}

impl Preparateur for Window {
    fn name(&self) -> &'static str {
        "Window"
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        if batch.is_empty() {
            return Ok(batch.clone());
        }
        let variation = Self::quadratic_variation(batch)?;
        let series = batch
            .iter()
            .zip(&variation)
            .map(|(series, q)| {
                let mut data = series.data().clone();
                for (t, &level) in q.iter().enumerate() {
                    if level < self.start || level > self.end {
                        data.column_mut(t).fill(0.0);
                    }
                }
                series_batch::Series::new(data)
            })
            .collect();
        Ok(Batch::new(series)?)
    }

    fn box_clone(&self) -> Box<dyn Preparateur> {
        Box::new(*self)
    }
}

/// Randomised zero strips
///
/// Fit draws strip starts and lengths as fractions of the series length;
/// transform zeroes `[⌊s·L⌋, ⌊s·L⌋ + ⌊l·L⌋)` for every strip `(s, l)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dilation {
    clusters: Option<f64>,
    seed: u64,
    strips: Option<Vec<(f64, f64)>>,
}

impl Dilation {
    /// `clusters` is the number of strips as a fraction of the longest
    /// training series; `None` draws between 1 and `L / 10 − 1` strips.
    pub fn new(clusters: Option<f64>, seed: u64) -> Result<Self, PreparationError> {
        if let Some(c) = clusters {
            if !(0.0..=1.0).contains(&c) {
                return Err(PreparationError::invalid(
                    "Dilation",
                    format!("clusters {} must lie in [0, 1]", c),
                ));
            }
        }
        Ok(Self {
            clusters,
            seed,
            strips: None,
        })
    }

    /// Fitted `(start, length)` fractions
    pub fn strips(&self) -> Option<&[(f64, f64)]> {
        self.strips.as_deref()
    }
}

impl Preparateur for Dilation {
    fn name(&self) -> &'static str {
        "Dilation"
    }

    fn requires_fit(&self) -> bool {
        true
    }

    fn is_fitted(&self) -> bool {
        self.strips.is_some()
    }

    fn fit(&mut self, batch: &Batch) -> Result<(), PreparationError> {
        if batch.is_empty() {
            return Err(PreparationError::EmptyBatch(self.name()));
        }
        let length = batch.max_length();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let count = match self.clusters {
            Some(c) => (c * length as f64) as usize,
            None => rng.gen_range(1..=(length / 10).saturating_sub(1).max(1)),
        };

        let mut starts: Vec<f64> = (0..count).map(|_| rng.gen::<f64>()).collect();
        starts.sort_by(f64::total_cmp);
        let strips = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let room = starts.get(i + 1).copied().unwrap_or(1.0) - start;
                (start, room * rng.gen::<f64>())
            })
            .collect();
        debug!("Dilation fitted with {} strips", count);
        self.strips = Some(strips);
        Ok(())
    }

    fn transform(&self, batch: &Batch) -> Result<Batch, PreparationError> {
        let strips = self
            .strips
            .as_ref()
            .ok_or(PreparationError::NotFitted(self.name()))?;
        map_series(batch, batch.channels(), |series| {
            let mut data = series.data().clone();
            let length = series.len();
            for &(start, len) in strips {
                let from = ((start * length as f64) as usize).min(length);
                let to = (from + (len * length as f64) as usize).min(length);
                data.slice_mut(s![.., from..to]).fill(0.0);
            }
            data
        })
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
    fn test_dotting_fixed() {
        let out = Dotting::new(Span::Fixed(2))
            .unwrap()
            .transform(&sample_batch())
            .unwrap();
        assert_batch_eq(
            &out,
            &[
                vec![vec![0.0, 0.8, 0.0, 5.0, 0.0], vec![0.0, 1.0, 0.0, 0.0, 0.0]],
                vec![vec![0.0, 8.0, 0.0, 6.0, 0.0], vec![0.0, -1.0, 0.0, -0.5, 0.0]],
            ],
        );
    }

    #[test]
    fn test_dotting_fraction_needs_fit() {
        let mut dot = Dotting::new(Span::Fraction(0.5)).unwrap();
        assert_eq!(
            dot.transform(&sample_batch()),
            Err(PreparationError::NotFitted("Dotting"))
        );
        dot.fit(&sample_batch()).unwrap();
        assert_eq!(dot.spacing(), Some(2));
    }

    #[test]
    fn test_dotting_spacing_longer_than_series() {
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0]]);
        let out = Dotting::new(Span::Fixed(10)).unwrap().transform(&batch).unwrap();
        assert_eq!(out.get(0).unwrap().channel(0).to_vec(), vec![0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_quadratic_variation() {
        let batch = Batch::from_univariate(vec![vec![0.0, 1.0, 3.0, 3.0, 4.0]]);
        let q = Window::quadratic_variation(&batch).unwrap();
        // squared increments 0, 1, 4, 0, 1 accumulate to 0, 1, 5, 5, 6
        let expected = [0.0, 1.0 / 6.0, 5.0 / 6.0, 5.0 / 6.0, 1.0];
        for (a, e) in q[0].iter().zip(expected) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_window_masks_outside_band() {
        let batch = Batch::from_univariate(vec![vec![0.0, 1.0, 3.0, 3.0, 4.0]]);
        let out = Window::new(0.1, 0.9).unwrap().transform(&batch).unwrap();
        assert_eq!(
            out.get(0).unwrap().channel(0).to_vec(),
            vec![0.0, 1.0, 3.0, 3.0, 0.0]
        );
        assert!(Window::new(0.8, 0.2).is_err());
    }

    #[test]
    fn test_dilation_is_seeded() {
        let batch = Batch::from_univariate(vec![(0..50).map(|v| v as f64 + 1.0).collect()]);
        let mut a = Dilation::new(Some(0.1), 7).unwrap();
        let mut b = Dilation::new(Some(0.1), 7).unwrap();
        assert!(a.transform(&batch).is_err());

        let out_a = a.fit_transform(&batch).unwrap();
        let out_b = b.fit_transform(&batch).unwrap();
        assert_eq!(out_a, out_b);
        assert_eq!(a.strips().map(<[_]>::len), Some(5));

        let zeros = out_a.get(0).unwrap().channel(0).iter().filter(|v| **v == 0.0).count();
        let expected: usize = a
            .strips()
            .unwrap()
            .iter()
            .map(|&(s, l)| {
                let from = (s * 50.0) as usize;
                ((from + (l * 50.0) as usize).min(50)) - from
            })
            .sum();
        assert_eq!(zeros, expected);
    }
}
