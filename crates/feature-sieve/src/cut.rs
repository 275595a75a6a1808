//! Cut Points

use crate::SieveError;
use serde::{Deserialize, Serialize};

/// A position inside an array of length `L`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cut {
    /// Index `max(ceil(f · L), 1) − 1`, `f` in `(0, 1]`
    Fraction(f64),
    /// First index where the cumulative absolute mass
    /// `M(t) = Σ_{s ≤ t} |a(s) − a(s − 1)|`, `a(−1) = 0`, reaches `q · M(L − 1)`
    Mass(f64),
}

impl Default for Cut {
    fn default() -> Self {
        Cut::Fraction(1.0)
    }
}

impl Cut {
    pub(crate) fn validate(&self, sieve: &'static str) -> Result<(), SieveError> {
        match *self {
            Cut::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(SieveError::invalid(
                sieve,
                format!("cut fraction {} must lie in (0, 1]", f),
            )),
            Cut::Mass(q) if !(0.0..=1.0).contains(&q) => Err(SieveError::invalid(
                sieve,
                format!("mass quantile {} must lie in [0, 1]", q),
            )),
            _ => Ok(()),
        }
    }

    /// Resolve the cut on a non-empty array
    pub fn index(&self, array: &[f64]) -> usize {
        let n = array.len();
        match *self {
            Cut::Fraction(f) => (ceil_tolerant(f * n as f64) as usize).min(n).max(1) - 1,
            Cut::Mass(q) => {
                let mut mass = Vec::with_capacity(n);
                let mut previous = 0.0;
                let mut total = 0.0;
                for &value in array {
                    total += (value - previous).abs();
                    previous = value;
                    mass.push(total);
                }
                let target = q * total;
                mass.iter().position(|&m| m >= target).unwrap_or(n.saturating_sub(1))
            }
        }
    }
}

/// `ceil` that treats values within rounding error of an integer as that integer
fn ceil_tolerant(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() <= 1e-9 * x.abs().max(1.0) {
        nearest
    } else {
        x.ceil()
    }
}
