//! Feature Sieves
//!
//! A sieve turns one iterated sums array into a fixed number of scalar
//! features. Position-based sieves ([`Max`], [`Min`], [`End`]) read the array
//! at [`Cut`] points; threshold-based sieves ([`Ppv`], [`Cpv`]) count values
//! against constants or quantiles learnt during fit.

mod config;
mod cut;
mod error;
mod extrema;
mod proportion;
mod sieve;

pub use config::SieveConfig;
pub use cut::Cut;
pub use error::SieveError;
pub use extrema::{End, Max, Min};
pub use proportion::{quantile, Cpv, Ppv, Threshold};
pub use sieve::Sieve;
