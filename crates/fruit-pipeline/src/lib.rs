//! Fruit Pipeline
//!
//! Orchestrates preparation, iterated sums and sieving across one or more
//! branches and concatenates the features into a `(series, features)`
//! matrix.
//!
//! ```no_run
//! use fruit_pipeline::{Fruit, sieving::Max, preparation::Increments};
//! use fruit_pipeline::series::Batch;
//!
//! let mut fruit = Fruit::new("example");
//! fruit.add_preparateur(Box::new(Increments::default()));
//! fruit.add_word("[1][1]".parse()?);
//! fruit.add_sieve(Box::new(Max::default()));
//!
//! let batch = Batch::from_univariate(vec![vec![1.0, 2.0, 3.0, 4.0]]);
//! let features = fruit.fit_transform(&batch)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod branch;
mod callback;
mod config;
mod error;
mod fruit;
mod logging;

pub use branch::Branch;
pub use callback::{FruitCallback, NoCallback};
pub use config::{BranchConfig, ExecutionConfig, FruitConfig, WordGeneration};
pub use error::FruitError;
pub use fruit::Fruit;
pub use logging::{init_json_logging, init_logging};

pub use ::config::FileFormat;
pub use tracing::Level;

pub use data_preparation as preparation;
pub use feature_sieve as sieving;
pub use iss_engine as iss;
pub use series_batch as series;
pub use word_alphabet as words;
