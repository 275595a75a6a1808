//! Iterated Sum Kernel

use ndarray::{Array1, ArrayView1};
use series_batch::Series;
use word_alphabet::ExtendedLetter;

/// Extend the iterated sums of a prefix by one letter
///
/// `parent` holds the prefix's sums over the same series (`None` for the
/// empty prefix, whose sums are identically 1). `alpha` is the gap
/// penalization between the prefix's last letter and `letter`.
pub fn extend_sums(
    letter: &ExtendedLetter,
    series: &Series,
    parent: Option<ArrayView1<'_, f64>>,
    alpha: f64,
) -> Array1<f64> {
    let n = series.len();
    let m = letter.evaluate_series(series);
    let mut out = Array1::zeros(n);
    let mut acc = 0.0;

    match parent {
        None => {
            for t in 0..n {
                acc += m[t];
                out[t] = acc;
            }
        }
        Some(p) if alpha == 0.0 => {
            for t in 0..n {
                let past = if t == 0 { 0.0 } else { p[t - 1] };
                acc += m[t] * past;
                out[t] = acc;
            }
        }
        Some(p) => {
            let decay = (-alpha / n as f64).exp();
            let mut discounted = 0.0;
            for t in 0..n {
                if t > 0 {
                    let before = if t >= 2 { p[t - 2] } else { 0.0 };
                    discounted = decay * (discounted + p[t - 1] - before);
                }
                acc += m[t] * discounted;
                out[t] = acc;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        Series::univariate(values.to_vec())
    }

    #[test]
    fn test_single_letter_is_cumulative_sum() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        let sums = extend_sums(&ExtendedLetter::single(0), &s, None, 0.0);
        assert_eq!(sums.to_vec(), vec![1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn test_strict_past_convention() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        let letter = ExtendedLetter::single(0);
        let first = extend_sums(&letter, &s, None, 0.0);
        let second = extend_sums(&letter, &s, Some(first.view()), 0.0);

        // Σ_{t1 < t2 ≤ t} x(t1) x(t2)
        assert_eq!(second.to_vec(), vec![0.0, 2.0, 11.0, 35.0]);
    }

    #[test]
    fn test_penalized_gap_discounts_distant_pairs() {
        let s = series(&[1.0, 1.0, 1.0]);
        let letter = ExtendedLetter::single(0);
        let first = extend_sums(&letter, &s, None, 0.0);
        let alpha = 3.0;
        let weighted = extend_sums(&letter, &s, Some(first.view()), alpha);

        // pairs (0,1), (1,2) have gap 1 and (0,2) has gap 2
        let q = (-alpha / 3.0_f64).exp();
        let expected = 2.0 * q + q * q;
        assert!((weighted[2] - expected).abs() < 1e-12);
        assert!((weighted[1] - q).abs() < 1e-12);
        assert_eq!(weighted[0], 0.0);
    }

    #[test]
    fn test_empty_series() {
        let s = series(&[]);
        let sums = extend_sums(&ExtendedLetter::single(0), &s, None, 0.0);
        assert!(sums.is_empty());
    }
}
