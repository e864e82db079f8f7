//! Proof-of-work difficulty interface.
//!
//! The mining hash itself is an external collaborator: it may hold large
//! process-wide lookup tables and is initialized once before the runtime
//! starts. The grading core only needs to recompute the difficulty a miner
//! self-reported, so it consumes the hash behind [`DifficultyOracle`].

use sha2::{Digest, Sha256};

/// Recomputes the proof-of-work difficulty of a record.
///
/// Implementations must be deterministic and stateless after initialization;
/// Phase 2 of grading may fan calls out across records.
pub trait DifficultyOracle: Send + Sync {
    /// Difficulty of `nonce` against `oprhash` as a big-endian u64.
    fn compute_difficulty(&self, oprhash: &[u8; 32], nonce: &[u8]) -> u64;
}

/// SHA-256-based difficulty, used on the unit-test network and in fixtures.
///
/// Production networks plug in the real mining hash; the grading pipeline is
/// agnostic to which oracle is behind the trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Difficulty;

impl DifficultyOracle for Sha256Difficulty {
    fn compute_difficulty(&self, oprhash: &[u8; 32], nonce: &[u8]) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(oprhash);
        hasher.update(nonce);
        let digest = hasher.finalize();
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(raw)
    }
}
