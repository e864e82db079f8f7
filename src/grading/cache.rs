//! LRU cache of verified proof-of-work difficulties.
//!
//! The external mining hash is by far the most expensive call in the
//! pipeline. Difficulty is a pure function of the record hash and nonce, so
//! re-grading after a ledger reorganization can reuse earlier results.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::pow::DifficultyOracle;

/// Default capacity; a block admits at most `cutoff` records, so this holds
/// several blocks' worth of verifications.
pub const DEFAULT_CACHE_SIZE: usize = 2048;

#[derive(Debug)]
pub struct DifficultyCache {
    entries: Mutex<LruCache<[u8; 32], u64>>,
}

impl DifficultyCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap());
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computed difficulty for `oprhash`/`nonce`, from cache when available.
    pub fn difficulty(
        &self,
        oracle: &dyn DifficultyOracle,
        oprhash: &[u8; 32],
        nonce: &[u8],
    ) -> u64 {
        if let Ok(mut entries) = self.entries.lock() {
            if let Some(cached) = entries.get(oprhash) {
                return *cached;
            }
        }

        let computed = oracle.compute_difficulty(oprhash, nonce);

        if let Ok(mut entries) = self.entries.lock() {
            entries.put(*oprhash, computed);
        }
        computed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DifficultyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOracle(AtomicUsize);

    impl DifficultyOracle for CountingOracle {
        fn compute_difficulty(&self, _oprhash: &[u8; 32], _nonce: &[u8]) -> u64 {
            self.0.fetch_add(1, Ordering::SeqCst);
            42
        }
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let cache = DifficultyCache::new(16);
        let oracle = CountingOracle(AtomicUsize::new(0));
        let hash = [9u8; 32];

        assert_eq!(cache.difficulty(&oracle, &hash, b"n"), 42);
        assert_eq!(cache.difficulty(&oracle, &hash, b"n"), 42);
        assert_eq!(oracle.0.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = DifficultyCache::new(2);
        let oracle = CountingOracle(AtomicUsize::new(0));

        cache.difficulty(&oracle, &[1u8; 32], b"n");
        cache.difficulty(&oracle, &[2u8; 32], b"n");
        cache.difficulty(&oracle, &[3u8; 32], b"n");
        assert_eq!(cache.len(), 2);

        // The first hash was evicted and must be recomputed.
        cache.difficulty(&oracle, &[1u8; 32], b"n");
        assert_eq!(oracle.0.load(Ordering::SeqCst), 4);
    }
}
