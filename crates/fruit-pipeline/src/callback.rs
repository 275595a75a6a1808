//! Transform Callbacks

use ndarray::{Array1, Array2};
use series_batch::Batch;
use word_alphabet::Word;

/// Hooks observing intermediate results of [`crate::Fruit::transform_with_callback`]
///
/// Hooks run on the calling thread, in branch order, never concurrently.
pub trait FruitCallback {
    /// A new branch starts
    fn on_next_branch(&mut self, _index: usize) {}

    /// Output of one preparateur
    fn on_preparateur(&mut self, _batch: &Batch) {}

    /// Fully prepared batch of the current branch
    fn on_preparation_end(&mut self, _batch: &Batch) {}

    /// Iterated sums of one output, one array per series
    fn on_iterated_sum(&mut self, _word: &Word, _sums: &[Array1<f64>]) {}

    /// Features of the current branch
    fn on_sieve(&mut self, _features: &Array2<f64>) {}

    /// Final feature matrix
    fn on_sieving_end(&mut self, _features: &Array2<f64>) {}
}

/// Callback that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

impl FruitCallback for NoCallback {}
