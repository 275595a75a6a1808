//! ISS Calculator
//!
//! Evaluates a word set on a batch, one trie level at a time. Nodes of the
//! same depth only depend on the level above, so each level is computed in
//! parallel.

use crate::cache::{IssCache, SeriesSums};
use crate::error::IssError;
use crate::kernel::extend_sums;
use crate::trie::PrefixTrie;
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use series_batch::Batch;
use std::sync::Arc;
use tracing::debug;
use word_alphabet::{ExtendedLetter, Word};

/// Which arrays a calculator reports per word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorMode {
    /// One array per word
    #[default]
    Single,
    /// One array per prefix of every word, shortest first
    Extended,
}

/// Iterated sums calculator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssCalculator {
    mode: CalculatorMode,
}

impl IssCalculator {
    pub fn new(mode: CalculatorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CalculatorMode {
        self.mode
    }

    /// Number of outputs contributed by `word`
    pub fn outputs_per_word(&self, word: &Word) -> usize {
        match self.mode {
            CalculatorMode::Single => 1,
            CalculatorMode::Extended => word.len(),
        }
    }

    /// Total number of outputs for a word set
    pub fn output_count(&self, words: &[Word]) -> usize {
        words.iter().map(|w| self.outputs_per_word(w)).sum()
    }

    /// Compute the iterated sums of every word on every series
    ///
    /// Prefixes already present in `cache` are reused. The cache must belong
    /// to this exact batch.
    pub fn compute(
        &self,
        batch: &Batch,
        words: &[Word],
        cache: &IssCache,
    ) -> Result<IssOutput, IssError> {
        validate(batch, words)?;

        let trie = PrefixTrie::build(words);
        let levels = trie.levels();
        debug!(
            "Computing iterated sums: {} words, {} distinct prefixes, {} levels, {} series",
            words.len(),
            trie.len(),
            levels.len(),
            batch.len()
        );

        let mut node_sums: Vec<Option<Arc<SeriesSums>>> = vec![None; trie.len()];
        for level in &levels {
            let computed: Vec<(usize, Arc<SeriesSums>)> = level
                .par_iter()
                .filter_map(|&index| {
                    let node = trie.node(index);
                    let letter = node.letter()?;
                    let parent = node.parent.and_then(|p| node_sums[p].clone());
                    let sums = cache.get_or_compute(&node.prefix, || {
                        extend_batch(batch, letter, parent.as_deref(), node.alpha())
                    });
                    Some((index, sums))
                })
                .collect();
            for (index, sums) in computed {
                node_sums[index] = Some(sums);
            }
        }

        let mut output = IssOutput::default();
        for w in 0..words.len() {
            let path = trie.path(w);
            let selected: &[usize] = match self.mode {
                CalculatorMode::Single => &path[path.len() - 1..],
                CalculatorMode::Extended => path,
            };
            for &node in selected {
                if let Some(sums) = &node_sums[node] {
                    output.push(w, trie.node(node).prefix.clone(), Arc::clone(sums));
                }
            }
        }
        Ok(output)
    }

    /// Compute one word letter by letter without a trie or a cache
    pub fn compute_uncached(&self, batch: &Batch, word: &Word) -> Result<SeriesSums, IssError> {
        validate(batch, std::slice::from_ref(word))?;
        let mut sums: Option<SeriesSums> = None;
        for (k, letter) in word.letters().iter().enumerate() {
            sums = Some(extend_batch(batch, letter, sums.as_ref(), word.gap_before(k)));
        }
        Ok(sums.unwrap_or_default())
    }
}

/// Iterated sums of `words` on `batch` with a fresh cache
pub fn iterated_sums(batch: &Batch, words: &[Word]) -> Result<IssOutput, IssError> {
    IssCalculator::default().compute(batch, words, &IssCache::new())
}

fn validate(batch: &Batch, words: &[Word]) -> Result<(), IssError> {
    if batch.is_empty() {
        return Err(IssError::EmptyBatch);
    }
    for (i, word) in words.iter().enumerate() {
        if word.is_empty() {
            return Err(IssError::EmptyWord(i));
        }
        if let Some(channel) = word.max_channel().filter(|&c| c >= batch.channels()) {
            return Err(IssError::ChannelIndex {
                word: word.to_string(),
                channel,
                channels: batch.channels(),
            });
        }
    }
    Ok(())
}

fn extend_batch(
    batch: &Batch,
    letter: &ExtendedLetter,
    parent: Option<&SeriesSums>,
    alpha: f64,
) -> SeriesSums {
    batch
        .series()
        .par_iter()
        .enumerate()
        .map(|(i, series)| extend_sums(letter, series, parent.map(|p| p[i].view()), alpha))
        .collect()
}

/// Iterated sums of a word set, one entry per output
///
/// Outputs follow word order; in extended mode each word contributes its
/// prefixes shortest first.
#[derive(Debug, Clone, Default)]
pub struct IssOutput {
    words: Vec<Word>,
    sources: Vec<usize>,
    sums: Vec<Arc<SeriesSums>>,
}

impl IssOutput {
    fn push(&mut self, source: usize, word: Word, sums: Arc<SeriesSums>) {
        self.sources.push(source);
        self.words.push(word);
        self.sums.push(sums);
    }

    /// Number of outputs
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// The word (or prefix, in extended mode) behind each output
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Index of the input word each output came from
    pub fn source(&self, output: usize) -> usize {
        self.sources[output]
    }

    /// Iterated sums of output `output` on series `series`
    pub fn get(&self, output: usize, series: usize) -> &Array1<f64> {
        &self.sums[output][series]
    }

    /// Iterated sums of output `output` on every series
    pub fn arrays(&self, output: usize) -> &[Array1<f64>] {
        &self.sums[output]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn sample_batch() -> Batch {
        let raw = vec![
            vec![vec![-4.0, 0.8, 0.0, 5.0, -3.0], vec![2.0, 1.0, 0.0, 0.0, -7.0]],
            vec![vec![5.0, 8.0, 2.0, 6.0, 0.0], vec![-5.0, -1.0, -4.0, -0.5, -8.0]],
        ];
        Batch::new(
            raw.into_iter()
                .map(|channels| series_batch::Series::from_channels(channels).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_letter_cumsum() {
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0, 4.0]]);
        let output = iterated_sums(&batch, &words(&["[1]"])).unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output.get(0, 0).to_vec(), vec![1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn test_two_letter_word() {
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0, 4.0]]);
        let output = iterated_sums(&batch, &words(&["[1][1]"])).unwrap();
        assert_eq!(output.get(0, 0).to_vec(), vec![0.0, 2.0, 11.0, 35.0]);
    }

    #[test]
    fn test_mixed_letters() {
        let batch = sample_batch();
        let output = iterated_sums(&batch, &words(&["[12]", "[1][2]"])).unwrap();

        // [12] is the cumulative sum of x1 * x2
        let product = output.get(0, 0);
        for (a, e) in product.iter().zip([-8.0, -7.2, -7.2, -7.2, 13.8]) {
            assert!((a - e).abs() < 1e-12);
        }
        // [1][2]: Σ_{s<t} x1(s) x2(t)
        let s1 = [-4.0, -3.2, -3.2, 1.8, -1.2];
        let x2 = [2.0, 1.0, 0.0, 0.0, -7.0];
        let mut acc = 0.0;
        let mut expected = Vec::new();
        for t in 0..5 {
            if t > 0 {
                acc += x2[t] * s1[t - 1];
            }
            expected.push(acc);
        }
        let actual = output.get(1, 0).to_vec();
        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_each_prefix_computed_once() {
        let batch = sample_batch();
        let cache = IssCache::new();
        let calculator = IssCalculator::new(CalculatorMode::Single);
        let set = words(&["[1][2][1]", "[1][2]", "[1][2][2]", "[2]"]);

        calculator.compute(&batch, &set, &cache).unwrap();
        // [1], [1][2], [1][2][1], [1][2][2], [2]
        assert_eq!(cache.computed_count(), 5);
        assert_eq!(cache.hit_count(), 0);

        calculator.compute(&batch, &set, &cache).unwrap();
        assert_eq!(cache.computed_count(), 5);
        assert_eq!(cache.hit_count(), 5);
    }

    #[test]
    fn test_extended_mode_outputs_prefixes() {
        let batch = sample_batch();
        let calculator = IssCalculator::new(CalculatorMode::Extended);
        let set = words(&["[1][2][2]", "[2]"]);
        let output = calculator.compute(&batch, &set, &IssCache::new()).unwrap();

        assert_eq!(output.len(), 4);
        assert_eq!(calculator.output_count(&set), 4);
        let labels: Vec<String> = output.words().iter().map(Word::to_string).collect();
        assert_eq!(labels, vec!["[1]", "[1][2]", "[1][2][2]", "[2]"]);
        assert_eq!(output.source(2), 0);
        assert_eq!(output.source(3), 1);
    }

    #[test]
    fn test_errors() {
        let batch = sample_batch();
        let calculator = IssCalculator::default();
        let cache = IssCache::new();

        let err = calculator.compute(&batch, &words(&["[13]"]), &cache).unwrap_err();
        assert_eq!(
            err,
            IssError::ChannelIndex {
                word: "[13]".to_string(),
                channel: 2,
                channels: 2
            }
        );

        let err = calculator.compute(&batch, &[Word::new()], &cache).unwrap_err();
        assert_eq!(err, IssError::EmptyWord(0));

        let empty = Batch::empty(2);
        let err = calculator.compute(&empty, &words(&["[1]"]), &cache).unwrap_err();
        assert_eq!(err, IssError::EmptyBatch);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_weighted_word_matches_uncached() {
        let batch = sample_batch();
        let word: Word = "[1]{0.7}[2][11]".parse().unwrap();
        let calculator = IssCalculator::default();
        let cached = calculator
            .compute(&batch, std::slice::from_ref(&word), &IssCache::new())
            .unwrap();
        let reference = calculator.compute_uncached(&batch, &word).unwrap();
        for (i, expected) in reference.iter().enumerate() {
            assert_eq!(cached.get(0, i), expected);
        }
    }

    #[test]
    fn test_varying_lengths() {
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0], vec![], vec![3.0]]);
        let output = iterated_sums(&batch, &words(&["[1][1]"])).unwrap();
        assert_eq!(output.get(0, 0).to_vec(), vec![0.0, 2.0]);
        assert!(output.get(0, 1).is_empty());
        assert_eq!(output.get(0, 2).to_vec(), vec![0.0]);
    }

    fn arb_word() -> impl Strategy<Value = Word> {
        let letter = prop::collection::vec((0usize..2, 1u32..3), 1..3)
            .prop_map(ExtendedLetter::from_pairs);
        prop::collection::vec(letter, 1..4).prop_map(Word::from_letters)
    }

    proptest! {
        #[test]
        fn prop_trie_matches_uncached(
            values in prop::collection::vec(prop::collection::vec(-3.0f64..3.0, 8), 2),
            set in prop::collection::vec(arb_word(), 1..6),
        ) {
            let series = series_batch::Series::from_channels(values).unwrap();
            let batch = Batch::new(vec![series]).unwrap();
            let calculator = IssCalculator::default();
            let output = calculator.compute(&batch, &set, &IssCache::new()).unwrap();
            for (w, word) in set.iter().enumerate() {
                let reference = calculator.compute_uncached(&batch, word).unwrap();
                prop_assert_eq!(output.get(w, 0), &reference[0]);
            }
        }
    }
}
