//! Prefix Cache
//!
//! Iterated sums keyed by prefix word for one prepared batch. A cache must
//! never be reused across different batches; the pipeline creates one per
//! fit or transform call and shares it only between calculators that see
//! the same prepared input.

use ahash::AHashMap;
use ndarray::Array1;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use word_alphabet::Word;

/// Iterated sums of one prefix, one array per series of the batch
pub type SeriesSums = Vec<Array1<f64>>;

/// Thread-safe prefix cache
///
/// Concurrent writers racing on the same prefix keep whichever value landed
/// first; both values are identical, so readers never observe a difference.
#[derive(Debug, Default)]
pub struct IssCache {
    entries: RwLock<AHashMap<Word, Arc<SeriesSums>>>,
    computed: AtomicUsize,
    hits: AtomicUsize,
}

impl IssCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached sums for `prefix`, if present
    pub fn get(&self, prefix: &Word) -> Option<Arc<SeriesSums>> {
        self.entries.read().get(prefix).cloned()
    }

    pub fn contains(&self, prefix: &Word) -> bool {
        self.entries.read().contains_key(prefix)
    }

    /// Return the cached sums for `prefix` or compute and insert them
    pub fn get_or_compute<F>(&self, prefix: &Word, compute: F) -> Arc<SeriesSums>
    where
        F: FnOnce() -> SeriesSums,
    {
        if let Some(hit) = self.get(prefix) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }

        let value = Arc::new(compute());
        self.computed.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write();
        entries.entry(prefix.clone()).or_insert(value).clone()
    }

    /// Number of cached prefixes
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// How many prefix computations ran through this cache
    pub fn computed_count(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// How many lookups were served from the cache
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_compute_counts() {
        let cache = IssCache::new();
        let word: Word = "[1][2]".parse().unwrap();

        let first = cache.get_or_compute(&word, || vec![Array1::from(vec![1.0, 2.0])]);
        let second = cache.get_or_compute(&word, || unreachable!("value is cached"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.computed_count(), 1);
        assert_eq!(cache.hit_count(), 1);
        assert!(cache.contains(&word));
    }

    #[test]
    fn test_distinct_alphas_are_distinct_keys() {
        let cache = IssCache::new();
        let plain: Word = "[1][2]".parse().unwrap();
        let weighted: Word = "[1]{1.5}[2]".parse().unwrap();

        cache.get_or_compute(&plain, Vec::new);
        assert!(cache.get(&weighted).is_none());
        cache.get_or_compute(&weighted, Vec::new);
        assert_eq!(cache.len(), 2);
    }
}
