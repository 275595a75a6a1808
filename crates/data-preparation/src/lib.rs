//! Data Preparation
//!
//! Preparateurs reshape or rescale a batch before its iterated sums are
//! taken. They compose left to right in a [`PreparationChain`].

mod chain;
mod config;
mod dimension;
mod error;
mod filter;
mod increments;
mod moving_average;
mod preparateur;
mod standardize;

pub use chain::PreparationChain;
pub use config::PreparateurConfig;
pub use dimension::{LeadLag, One};
pub use error::PreparationError;
pub use filter::{Dilation, Dotting, Window};
pub use increments::{Increments, Padding};
pub use moving_average::{MovingAverage, Span};
pub use preparateur::Preparateur;
pub use standardize::{Standardize, StandardizeMode};

#[cfg(test)]
pub(crate) mod test_support {
    use series_batch::{Batch, Series};

    pub fn sample_batch() -> Batch {
        let raw = vec![
            vec![vec![-4.0, 0.8, 0.0, 5.0, -3.0], vec![2.0, 1.0, 0.0, 0.0, -7.0]],
            vec![vec![5.0, 8.0, 2.0, 6.0, 0.0], vec![-5.0, -1.0, -4.0, -0.5, -8.0]],
        ];
        Batch::new(
            raw.into_iter()
                .map(|channels| Series::from_channels(channels).unwrap())
                .collect(),
        )
        .unwrap()
    }

    pub fn assert_batch_eq(actual: &Batch, expected: &[Vec<Vec<f64>>]) {
        assert_eq!(actual.len(), expected.len());
        for (series, rows) in actual.iter().zip(expected) {
            assert_eq!(series.channels(), rows.len());
            for (c, row) in rows.iter().enumerate() {
                let got = series.channel(c).to_vec();
                assert_eq!(got.len(), row.len());
                for (a, e) in got.iter().zip(row) {
                    assert!((a - e).abs() < 1e-9, "channel {}: {:?} != {:?}", c, got, row);
                }
            }
        }
    }
}
