//! Fruit Pipeline
//!
//! An ordered set of branches whose features are concatenated column-wise.

use crate::branch::{Branch, FittedBranch};
use crate::callback::{FruitCallback, NoCallback};
use crate::config::{ExecutionConfig, FruitConfig};
use crate::FruitError;
use ahash::AHashMap;
use data_preparation::Preparateur;
use feature_sieve::Sieve;
use iss_engine::{CalculatorMode, IssCache};
use ndarray::{s, Array2};
use rayon::{ThreadPool, ThreadPoolBuilder};
use series_batch::Batch;
use std::sync::Arc;
use tracing::{debug, info};
use word_alphabet::{parse_word, simple_words_by_weight, Word};

/// Feature extraction pipeline
///
/// Components are added to the current branch; [`Fruit::fork`] starts a
/// new one. Output columns follow branch order, then output order, then
/// sieve order.
#[derive(Debug, Clone)]
pub struct Fruit {
    name: String,
    branches: Vec<Branch>,
    current: usize,
    execution: ExecutionConfig,
}

impl Fruit {
    /// Create a pipeline with one empty branch
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: vec![Branch::new()],
            current: 0,
            execution: ExecutionConfig::default(),
        }
    }

    pub fn with_config(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    /// Build a pipeline from a validated configuration
    pub fn from_config(config: &FruitConfig) -> Result<Self, FruitError> {
        config.validate()?;
        let mut fruit = Fruit::new(config.name.clone()).with_config(config.execution.clone());
        for (i, branch) in config.branches.iter().enumerate() {
            if i > 0 {
                fruit.fork();
            }
            for preparateur in &branch.preparateurs {
                fruit.add_preparateur(preparateur.build()?);
            }
            for notation in &branch.words {
                fruit.add_word(parse_word(notation)?);
            }
            if let Some(generate) = branch.generate {
                fruit.add_words(simple_words_by_weight(generate.max_weight, generate.dim));
            }
            for sieve in &branch.sieves {
                fruit.add_sieve(sieve.build()?);
            }
            fruit.set_mode(branch.mode);
        }
        info!(
            "Built pipeline '{}' with {} branches and {} features",
            fruit.name,
            fruit.branches.len(),
            fruit.nfeatures()
        );
        Ok(fruit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execution(&self) -> &ExecutionConfig {
        &self.execution
    }

    pub fn add_preparateur(&mut self, preparateur: Box<dyn Preparateur>) {
        self.current_branch_mut().add_preparateur(preparateur);
    }

    pub fn add_word(&mut self, word: Word) {
        self.current_branch_mut().add_word(word);
    }

    pub fn add_words(&mut self, words: impl IntoIterator<Item = Word>) {
        self.current_branch_mut().add_words(words);
    }

    pub fn add_sieve(&mut self, sieve: Box<dyn Sieve>) {
        self.current_branch_mut().add_sieve(sieve);
    }

    pub fn set_mode(&mut self, mode: CalculatorMode) {
        self.current_branch_mut().set_mode(mode);
    }

    /// Start a new empty branch and make it current
    pub fn fork(&mut self) {
        self.fork_with(Branch::new());
    }

    /// Append `branch` and make it current
    pub fn fork_with(&mut self, branch: Branch) {
        self.branches.push(branch);
        self.current = self.branches.len() - 1;
    }

    pub fn branch(&self, index: usize) -> Option<&Branch> {
        self.branches.get(index)
    }

    pub fn branch_mut(&mut self, index: usize) -> Option<&mut Branch> {
        self.branches.get_mut(index)
    }

    pub fn current_branch_mut(&mut self) -> &mut Branch {
        &mut self.branches[self.current]
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Total number of feature columns
    pub fn nfeatures(&self) -> usize {
        self.branches.iter().map(Branch::nfeatures).sum()
    }

    pub fn is_fitted(&self) -> bool {
        self.branches.iter().all(Branch::is_fitted)
    }

    /// Fit every branch on `batch`
    ///
    /// Branches are fitted on copies; if any branch fails, the previous
    /// fitted state of every branch is kept.
    pub fn fit(&mut self, batch: &Batch) -> Result<(), FruitError> {
        if batch.is_empty() {
            return Err(FruitError::EmptyBatch);
        }
        self.validate_branches(batch)?;
        info!(
            "Fitting pipeline '{}': {} branches on {} series",
            self.name,
            self.branches.len(),
            batch.len()
        );

        let pool = self.build_pool()?;
        let mut caches = CacheRegistry::new(self.execution.share_cache);
        let mut fitted: Vec<FittedBranch> = Vec::with_capacity(self.branches.len());
        for (i, branch) in self.branches.iter().enumerate() {
            debug!("Fitting branch {}", i);
            let (chain, prepared) = branch.fit_chain(batch)?;
            let cache = caches.get(&chain.cache_key());
            let output = run(pool.as_ref(), || branch.compute(&prepared, &cache))?;
            fitted.push(run(pool.as_ref(), || branch.fit_sieves(chain, &output))?);
        }

        for (branch, state) in self.branches.iter_mut().zip(fitted) {
            branch.set_fitted(state);
        }
        info!("Pipeline '{}' fitted", self.name);
        Ok(())
    }

    /// Feature matrix of shape `(batch.len(), nfeatures)`
    pub fn transform(&self, batch: &Batch) -> Result<Array2<f64>, FruitError> {
        self.transform_with_callback(batch, &mut NoCallback)
    }

    pub fn fit_transform(&mut self, batch: &Batch) -> Result<Array2<f64>, FruitError> {
        self.fit(batch)?;
        self.transform(batch)
    }

    /// Transform while reporting intermediate results to `callback`
    pub fn transform_with_callback(
        &self,
        batch: &Batch,
        callback: &mut dyn FruitCallback,
    ) -> Result<Array2<f64>, FruitError> {
        if batch.is_empty() {
            return Err(FruitError::EmptyBatch);
        }
        for (i, branch) in self.branches.iter().enumerate() {
            branch.ensure_fitted(i)?;
        }
        self.validate_branches(batch)?;
        info!(
            "Transforming {} series through pipeline '{}'",
            batch.len(),
            self.name
        );

        let pool = self.build_pool()?;
        let mut caches = CacheRegistry::new(self.execution.share_cache);
        let mut blocks = Vec::with_capacity(self.branches.len());
        for (i, branch) in self.branches.iter().enumerate() {
            callback.on_next_branch(i);
            let chain = branch.active_chain();
            let prepared = chain.transform_inspect(batch, |b| callback.on_preparateur(b))?;
            callback.on_preparation_end(&prepared);

            let cache = caches.get(&chain.cache_key());
            let output = run(pool.as_ref(), || branch.compute(&prepared, &cache))?;
            for o in 0..output.len() {
                callback.on_iterated_sum(&output.words()[o], output.arrays(o));
            }

            let block = run(pool.as_ref(), || branch.sieve(&output, batch.len()))?;
            debug!("Branch {} produced {} features", i, block.ncols());
            callback.on_sieve(&block);
            blocks.push(block);
        }

        let features = concatenate(batch.len(), &blocks);
        callback.on_sieving_end(&features);
        Ok(features)
    }

    /// Every branch has words and every word fits its branch's channels
    fn validate_branches(&self, batch: &Batch) -> Result<(), FruitError> {
        if let Some(empty) = self.branches.iter().position(|b| b.words().is_empty()) {
            return Err(FruitError::NoWords(empty));
        }
        self.branches
            .iter()
            .try_for_each(|branch| branch.ensure_channels(batch))
    }

    fn build_pool(&self) -> Result<Option<ThreadPool>, FruitError> {
        match self.execution.num_threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map(Some)
                .map_err(|e| FruitError::ThreadPool(e.to_string())),
            None => Ok(None),
        }
    }
}

/// Run `op` inside the local pool when one is configured
fn run<T, F>(pool: Option<&ThreadPool>, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

fn concatenate(rows: usize, blocks: &[Array2<f64>]) -> Array2<f64> {
    let width = blocks.iter().map(|b| b.ncols()).sum();
    let mut features = Array2::zeros((rows, width));
    let mut column = 0;
    for block in blocks {
        features
            .slice_mut(s![.., column..column + block.ncols()])
            .assign(block);
        column += block.ncols();
    }
    features
}

/// Per-call caches keyed by preparation chain identity
struct CacheRegistry {
    share: bool,
    caches: AHashMap<String, Arc<IssCache>>,
}

impl CacheRegistry {
    fn new(share: bool) -> Self {
        Self {
            share,
            caches: AHashMap::new(),
        }
    }

    fn get(&mut self, key: &str) -> Arc<IssCache> {
        if !self.share {
            return Arc::new(IssCache::new());
        }
        Arc::clone(self.caches.entry(key.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_sieve::{End, Max};

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn test_fork_switches_current_branch() {
        let mut fruit = Fruit::new("fork");
        fruit.add_word(word("[1]"));
        fruit.add_sieve(Box::new(Max::default()));
        fruit.fork();
        fruit.add_words([word("[1]"), word("[1][1]")]);
        fruit.add_sieve(Box::new(Max::default()));
        fruit.add_sieve(Box::new(End::default()));

        assert_eq!(fruit.branches().len(), 2);
        assert_eq!(fruit.branch(0).unwrap().nfeatures(), 1);
        assert_eq!(fruit.branch(1).unwrap().nfeatures(), 4);
        assert_eq!(fruit.nfeatures(), 5);
    }

    #[test]
    fn test_cumsum_max_feature() {
        let mut fruit = Fruit::new("cumsum");
        fruit.add_word(word("[1]"));
        fruit.add_sieve(Box::new(Max::default()));
        let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0, 4.0]]);
        let features = fruit.fit_transform(&batch).unwrap();
        assert_eq!(features.shape(), &[1, 1]);
        assert_eq!(features[[0, 0]], 10.0);
    }

    #[test]
    fn test_concatenate_keeps_block_order() {
        let a = Array2::from_elem((2, 1), 1.0);
        let b = Array2::from_elem((2, 2), 2.0);
        let features = concatenate(2, &[a, b]);
        assert_eq!(features.row(0).to_vec(), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_unshared_caches_are_distinct() {
        let mut registry = CacheRegistry::new(false);
        assert!(!Arc::ptr_eq(&registry.get("k"), &registry.get("k")));
        let mut registry = CacheRegistry::new(true);
        assert!(Arc::ptr_eq(&registry.get("k"), &registry.get("k")));
    }
}
