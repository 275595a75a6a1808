//! Iterated Sums Signature Engine
//!
//! Computes the iterated sums of a batch of series along a set of words.
//!
//! # Recursion
//!
//! For a word `w = p·e` (prefix `p`, last letter `e`) and a series of length
//! `L`:
//!
//! ```text
//! S_∅(t)   = 1
//! S_e(t)   = Σ_{s ≤ t} m_e(s)
//! S_w(t)   = Σ_{s ≤ t} m_e(s) · S_p(s − 1),      S_p(−1) = 0
//! ```
//!
//! where `m_e(s)` is the monomial of `e` evaluated at time `s`. The prefix is
//! always read strictly in the past (`s − 1`), so `S_w(t)` sums over
//! `t_1 < t_2 < … < t_k ≤ t`. A penalized gap `α` replaces `S_p(s − 1)` by
//! the exponentially discounted sum
//!
//! ```text
//! D(0) = 0,   D(s) = exp(−α / L) · (D(s − 1) + S_p(s − 1) − S_p(s − 2))
//! ```
//!
//! # Prefix sharing
//!
//! Words are arranged in a [`PrefixTrie`]; every distinct prefix is computed
//! once per batch and stored in an [`IssCache`] that the caller creates for a
//! single call and may hand to several calculators working on the same
//! prepared batch.

mod cache;
mod calculator;
mod error;
mod kernel;
mod trie;

pub use cache::{IssCache, SeriesSums};
pub use calculator::{iterated_sums, CalculatorMode, IssCalculator, IssOutput};
pub use error::IssError;
pub use kernel::extend_sums;
pub use trie::{PrefixTrie, TrieNode};
