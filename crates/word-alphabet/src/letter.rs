//! Extended Letters (pointwise monomials)

use ndarray::Array1;
use series_batch::Series;

/// Largest exponent a factor may carry; `powi` takes an `i32`
pub const MAX_EXPONENT: u32 = i32::MAX as u32;

/// A monomial `Π x_c(t)^e` over the channels of a series
///
/// Stored as channel-sorted `(channel, exponent)` pairs with unique channels
/// and exponents of at least 1, so equal monomials compare equal no matter
/// how they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtendedLetter {
    factors: Vec<(usize, u32)>,
}

impl ExtendedLetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Letter for a single channel raised to the first power
    pub fn single(channel: usize) -> Self {
        Self {
            factors: vec![(channel, 1)],
        }
    }

    /// Build a letter from `(channel, exponent)` pairs in any order
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, u32)>) -> Self {
        let mut letter = Self::new();
        for (channel, exponent) in pairs {
            letter.push(channel, exponent);
        }
        letter
    }

    /// Multiply the letter by `x_channel^exponent`
    ///
    /// Exponents saturate at [`MAX_EXPONENT`].
    pub fn push(&mut self, channel: usize, exponent: u32) {
        let exponent = exponent.min(MAX_EXPONENT);
        if self.checked_push(channel, exponent).is_none() {
            if let Ok(pos) = self.factors.binary_search_by_key(&channel, |&(c, _)| c) {
                self.factors[pos].1 = MAX_EXPONENT;
            }
        }
    }

    /// Multiply the letter by `x_channel^exponent`, or `None` (leaving the
    /// letter unchanged) when the resulting exponent would exceed
    /// [`MAX_EXPONENT`]
    pub fn checked_push(&mut self, channel: usize, exponent: u32) -> Option<()> {
        if exponent == 0 {
            return Some(());
        }
        match self.factors.binary_search_by_key(&channel, |&(c, _)| c) {
            Ok(pos) => {
                let merged = self.factors[pos]
                    .1
                    .checked_add(exponent)
                    .filter(|&e| e <= MAX_EXPONENT)?;
                self.factors[pos].1 = merged;
            }
            Err(_) if exponent > MAX_EXPONENT => return None,
            Err(pos) => self.factors.insert(pos, (channel, exponent)),
        }
        Some(())
    }

    pub fn factors(&self) -> &[(usize, u32)] {
        &self.factors
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Total degree of the monomial
    pub fn weight(&self) -> u32 {
        self.factors
            .iter()
            .fold(0u32, |total, &(_, e)| total.saturating_add(e))
    }

    /// Largest channel index referenced
    pub fn max_channel(&self) -> Option<usize> {
        self.factors.last().map(|&(c, _)| c)
    }

    /// Monomial value at time step `t`
    #[inline]
    pub fn evaluate(&self, series: &Series, t: usize) -> f64 {
        self.factors
            .iter()
            .map(|&(c, e)| series.value(c, t).powi(e as i32))
            .product()
    }

    /// Monomial values over the whole series
    pub fn evaluate_series(&self, series: &Series) -> Array1<f64> {
        let mut out = Array1::ones(series.len());
        for &(c, e) in &self.factors {
            let exponent = e as i32;
            out.zip_mut_with(&series.channel(c), |o, &x| *o *= x.powi(exponent));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponent_limit() {
        let mut letter = ExtendedLetter::single(0);
        assert_eq!(letter.checked_push(0, MAX_EXPONENT), None);
        assert_eq!(letter.factors(), &[(0, 1)]);
        assert_eq!(letter.checked_push(1, MAX_EXPONENT + 1), None);
        assert_eq!(letter.checked_push(1, MAX_EXPONENT), Some(()));

        letter.push(0, u32::MAX);
        assert_eq!(letter.factors(), &[(0, MAX_EXPONENT), (1, MAX_EXPONENT)]);
        assert_eq!(letter.weight(), u32::MAX);
    }

    #[test]
    fn test_canonical_form() {
        let a = ExtendedLetter::from_pairs([(1, 1), (0, 1), (1, 1)]);
        let b = ExtendedLetter::from_pairs([(0, 1), (1, 2)]);
        assert_eq!(a, b);
        assert_eq!(a.factors(), &[(0, 1), (1, 2)]);
        assert_eq!(a.weight(), 3);
        assert_eq!(a.max_channel(), Some(1));
    }

    #[test]
    fn test_zero_exponent_ignored() {
        let letter = ExtendedLetter::from_pairs([(3, 0)]);
        assert!(letter.is_empty());
        assert_eq!(letter.max_channel(), None);
    }

    #[test]
    fn test_evaluate() {
        let series =
            Series::from_channels(vec![vec![1.0, 2.0, 3.0], vec![2.0, -1.0, 0.5]]).unwrap();
        let letter = ExtendedLetter::from_pairs([(0, 1), (1, 2)]);

        let values = letter.evaluate_series(&series);
        assert_eq!(values.to_vec(), vec![4.0, 2.0, 0.75]);
        assert_eq!(letter.evaluate(&series, 1), 2.0);
    }

    #[test]
    fn test_ordering() {
        let a = ExtendedLetter::single(0);
        let b = ExtendedLetter::from_pairs([(0, 2)]);
        let c = ExtendedLetter::single(1);
        assert!(a < b);
        assert!(b < c);
    }
}
