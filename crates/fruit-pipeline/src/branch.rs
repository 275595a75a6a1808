//! Pipeline Branch
//!
//! A branch owns a preparation chain, a word set and a sieve set. Fitting
//! produces a fitted copy of the chain plus, for every iterated sums output,
//! fitted copies of every sieve.

use crate::FruitError;
use data_preparation::{PreparationChain, Preparateur};
use feature_sieve::{Sieve, SieveError};
use iss_engine::{CalculatorMode, IssCache, IssCalculator, IssError, IssOutput};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use series_batch::{Batch, SeriesShape};
use std::borrow::Cow;
use word_alphabet::Word;

/// Fitted state of a branch
#[derive(Debug, Clone)]
pub(crate) struct FittedBranch {
    chain: PreparationChain,
    /// `sieves[output][k]` is sieve `k` fitted on output `output`
    sieves: Vec<Vec<Box<dyn Sieve>>>,
}

/// One preparation → iterated sums → sieving path
#[derive(Debug, Clone, Default)]
pub struct Branch {
    chain: PreparationChain,
    words: Vec<Word>,
    sieves: Vec<Box<dyn Sieve>>,
    calculator: IssCalculator,
    fitted: Option<FittedBranch>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_preparateur(&mut self, preparateur: Box<dyn Preparateur>) {
        self.chain.push(preparateur);
        self.fitted = None;
    }

    pub fn add_word(&mut self, word: Word) {
        self.words.push(word);
        self.fitted = None;
    }

    pub fn add_words(&mut self, words: impl IntoIterator<Item = Word>) {
        self.words.extend(words);
        self.fitted = None;
    }

    pub fn add_sieve(&mut self, sieve: Box<dyn Sieve>) {
        self.sieves.push(sieve);
        self.fitted = None;
    }

    pub fn set_mode(&mut self, mode: CalculatorMode) {
        self.calculator = IssCalculator::new(mode);
        self.fitted = None;
    }

    pub fn mode(&self) -> CalculatorMode {
        self.calculator.mode()
    }

    pub fn chain(&self) -> &PreparationChain {
        &self.chain
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn sieves(&self) -> &[Box<dyn Sieve>] {
        &self.sieves
    }

    /// Number of iterated sums outputs
    pub fn noutputs(&self) -> usize {
        self.calculator.output_count(&self.words)
    }

    /// Number of feature columns this branch contributes
    pub fn nfeatures(&self) -> usize {
        self.noutputs() * self.sieve_width()
    }

    fn sieve_width(&self) -> usize {
        self.sieves.iter().map(|s| s.nfeatures()).sum()
    }

    /// Whether any component has to learn from training data
    pub fn requires_fit(&self) -> bool {
        self.chain.requires_fit() || self.sieves.iter().any(|s| s.requires_fit())
    }

    /// Whether the branch can transform
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some() || !self.requires_fit()
    }

    pub(crate) fn ensure_fitted(&self, index: usize) -> Result<(), FruitError> {
        if self.is_fitted() {
            return Ok(());
        }
        let component = self
            .chain
            .unfitted()
            .into_iter()
            .chain(
                self.sieves
                    .iter()
                    .filter(|s| !s.is_fitted())
                    .map(|s| s.name()),
            )
            .collect::<Vec<_>>()
            .join(", ");
        Err(FruitError::BranchNotFitted {
            branch: index,
            component,
        })
    }

    /// Check every word against the channels the chain produces from `batch`
    pub(crate) fn ensure_channels(&self, batch: &Batch) -> Result<(), FruitError> {
        let input = batch
            .shape_of(0)
            .unwrap_or_else(|| SeriesShape::new(batch.channels(), 0));
        let channels = self.active_chain().output_shape(input).channels;
        match self
            .words
            .iter()
            .find(|w| w.max_channel().map_or(false, |c| c >= channels))
        {
            Some(word) => Err(IssError::ChannelIndex {
                word: word.to_string(),
                channel: word.max_channel().unwrap_or_default(),
                channels,
            }
            .into()),
            None => Ok(()),
        }
    }

    pub(crate) fn set_fitted(&mut self, fitted: FittedBranch) {
        self.fitted = Some(fitted);
    }

    /// Iterated sums of the branch's words on a prepared batch
    pub(crate) fn compute(&self, prepared: &Batch, cache: &IssCache) -> Result<IssOutput, FruitError> {
        Ok(self.calculator.compute(prepared, &self.words, cache)?)
    }

    /// Chain used by transform: the fitted copy when present
    pub(crate) fn active_chain(&self) -> &PreparationChain {
        self.fitted.as_ref().map_or(&self.chain, |f| &f.chain)
    }

    fn active_sieves(&self, output: usize) -> &[Box<dyn Sieve>] {
        match &self.fitted {
            Some(fitted) => &fitted.sieves[output],
            None => &self.sieves,
        }
    }

    /// Fit a copy of the chain and return it with the prepared batch
    pub(crate) fn fit_chain(&self, batch: &Batch) -> Result<(PreparationChain, Batch), FruitError> {
        let mut chain = self.chain.clone();
        let prepared = chain.fit_transform(batch)?;
        Ok((chain, prepared))
    }

    /// Fit one copy of every sieve per output
    pub(crate) fn fit_sieves(
        &self,
        chain: PreparationChain,
        output: &IssOutput,
    ) -> Result<FittedBranch, FruitError> {
        let sieves = (0..output.len())
            .into_par_iter()
            .map(|o| {
                let arrays: Vec<Cow<'_, [f64]>> = output.arrays(o).iter().map(contiguous).collect();
                let views: Vec<&[f64]> = arrays.iter().map(|a| a.as_ref()).collect();
                self.sieves
                    .iter()
                    .map(|sieve| -> Result<Box<dyn Sieve>, SieveError> {
                        let mut fitted = sieve.clone();
                        fitted.fit(&views)?;
                        Ok(fitted)
                    })
                    .collect::<Result<Vec<_>, SieveError>>()
            })
            .collect::<Result<Vec<_>, SieveError>>()?;
        Ok(FittedBranch { chain, sieves })
    }

    /// Sieve every output of every series into a `(series, nfeatures)` block
    pub(crate) fn sieve(&self, output: &IssOutput, series: usize) -> Result<Array2<f64>, FruitError> {
        let width = output.len() * self.sieve_width();
        let rows = (0..series)
            .into_par_iter()
            .map(|i| -> Result<Vec<f64>, SieveError> {
                let mut row = Vec::with_capacity(width);
                for o in 0..output.len() {
                    let values = contiguous(output.get(o, i));
                    for sieve in self.active_sieves(o) {
                        row.extend(sieve.transform(&values)?);
                    }
                }
                Ok(row)
            })
            .collect::<Result<Vec<Vec<f64>>, SieveError>>()?;

        let mut block = Array2::zeros((series, width));
        for (mut target, row) in block.rows_mut().into_iter().zip(rows) {
            target.assign(&Array1::from(row));
        }
        Ok(block)
    }
}

fn contiguous(array: &Array1<f64>) -> Cow<'_, [f64]> {
    match array.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(array.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_sieve::{Max, Ppv, Threshold};

    fn branch() -> Branch {
        let mut branch = Branch::new();
        branch.add_words(["[1]", "[1][1]"].iter().map(|s| s.parse().unwrap()));
        branch.add_sieve(Box::new(Max::default()));
        branch
    }

    #[test]
    fn test_nfeatures() {
        let mut branch = branch();
        assert_eq!(branch.nfeatures(), 2);
        branch.set_mode(CalculatorMode::Extended);
        // [1] → 1 output, [1][1] → 2 outputs
        assert_eq!(branch.nfeatures(), 3);
    }

    #[test]
    fn test_stateless_branch_needs_no_fit() {
        let branch = branch();
        assert!(!branch.requires_fit());
        assert!(branch.is_fitted());
        assert!(branch.ensure_fitted(0).is_ok());
    }

    #[test]
    fn test_unfitted_components_are_named() {
        let mut branch = branch();
        branch.add_sieve(Box::new(Ppv::single(Threshold::quantile(0.5)).unwrap()));
        let err = branch.ensure_fitted(3).unwrap_err();
        assert_eq!(
            err,
            FruitError::BranchNotFitted {
                branch: 3,
                component: "Ppv".into()
            }
        );
    }

    #[test]
    fn test_channels_follow_the_chain() {
        let mut branch = Branch::new();
        branch.add_word("[2]".parse().unwrap());
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0]]);
        assert_eq!(
            branch.ensure_channels(&batch),
            Err(FruitError::Iss(IssError::ChannelIndex {
                word: "[2]".into(),
                channel: 1,
                channels: 1
            }))
        );

        branch.add_preparateur(Box::new(data_preparation::One));
        assert!(branch.ensure_channels(&batch).is_ok());
    }

    #[test]
    fn test_sieve_block() {
        let branch = branch();
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, -1.0]]);
        let output = branch.compute(&batch, &IssCache::new()).unwrap();
        let block = branch.sieve(&output, batch.len()).unwrap();
        assert_eq!(block.shape(), &[2, 2]);
        assert_eq!(block.row(0).to_vec(), vec![10.0, 35.0]);
        assert_eq!(block.row(1).to_vec(), vec![1.0, 0.0]);
    }
}
