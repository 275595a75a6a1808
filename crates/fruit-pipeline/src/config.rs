//! Pipeline Configuration
//!
//! A [`FruitConfig`] is read with the `config` crate from a file or a string
//! and layered with `FRUITS__…` environment variables, e.g.
//! `FRUITS__EXECUTION__NUM_THREADS=4`.

use crate::FruitError;
use config::{Config, Environment, File, FileFormat};
use data_preparation::PreparateurConfig;
use feature_sieve::SieveConfig;
use iss_engine::CalculatorMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use word_alphabet::parse_word;

/// How the pipeline uses the machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Worker threads for a local pool; `None` uses the global rayon pool
    #[serde(default)]
    pub num_threads: Option<usize>,
    /// Reuse iterated sums between branches with identical preparation
    #[serde(default = "default_share_cache")]
    pub share_cache: bool,
}

fn default_share_cache() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            share_cache: true,
        }
    }
}

impl ExecutionConfig {
    /// Run on a single worker thread
    pub fn sequential() -> Self {
        Self {
            num_threads: Some(1),
            ..Self::default()
        }
    }

    /// Run on a local pool of `threads` workers
    pub fn with_threads(threads: usize) -> Self {
        Self {
            num_threads: Some(threads),
            ..Self::default()
        }
    }
}

/// Generated word set: every word up to a total weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGeneration {
    pub max_weight: u32,
    pub dim: usize,
}

/// One branch of a pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BranchConfig {
    #[serde(default)]
    pub preparateurs: Vec<PreparateurConfig>,
    /// Words in bracket notation
    #[serde(default)]
    pub words: Vec<String>,
    /// Words appended after the explicit ones
    #[serde(default)]
    pub generate: Option<WordGeneration>,
    #[serde(default)]
    pub sieves: Vec<SieveConfig>,
    #[serde(default)]
    pub mode: CalculatorMode,
}

/// Complete pipeline description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FruitConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub execution: ExecutionConfig,
    pub branches: Vec<BranchConfig>,
}

impl FruitConfig {
    /// Load from a file; the format follows the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FruitError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a string in the given format
    pub fn from_str_format(source: &str, format: FileFormat) -> Result<Self, FruitError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, format))
            .add_source(environment())
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for errors
    pub fn validate(&self) -> Result<(), FruitError> {
        if self.branches.is_empty() {
            return Err(FruitError::Config("at least one branch is required".into()));
        }
        if self.execution.num_threads == Some(0) {
            return Err(FruitError::Config("num_threads must be at least 1".into()));
        }
        for (i, branch) in self.branches.iter().enumerate() {
            let generated = branch.generate.map_or(false, |g| g.max_weight > 0 && g.dim > 0);
            if branch.words.is_empty() && !generated {
                return Err(FruitError::Config(format!("branch {} has no words", i)));
            }
            if branch.sieves.is_empty() {
                return Err(FruitError::Config(format!("branch {} has no sieves", i)));
            }
            for word in &branch.words {
                parse_word(word)?;
            }
            for preparateur in &branch.preparateurs {
                preparateur.build()?;
            }
            for sieve in &branch.sieves {
                sieve.build()?;
            }
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("FRUITS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
