//! Graded block model.

use serde::{Deserialize, Serialize};

use crate::record;

/// Outcome of running the pipeline on one ledger height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// A full winners set was produced.
    Graded,
    /// Fewer than `top_rank` candidates survived difficulty admission;
    /// no winners, no canonical prices.
    Degenerate,
    /// An internal consistency violation occurred mid-grade; not retried.
    Failed,
}

impl BlockState {
    pub fn label(&self) -> &'static str {
        match self {
            BlockState::Graded => "graded",
            BlockState::Degenerate => "degenerate",
            BlockState::Failed => "failed",
        }
    }
}

/// One record's final standing in a graded block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedCandidate {
    pub oprhash: [u8; 32],
    pub entry_hash: [u8; 32],
    pub identity: String,
    pub payout_address: String,
    pub prices: Vec<u64>,
    pub self_reported_difficulty: u64,
    /// Accuracy penalty in the round this record left the running (or the
    /// final round, for winners). Lower is better.
    pub grade: f64,
    /// 1-based final rank; ranks `1..=winner_count` are the winners.
    pub rank: usize,
}

impl GradedCandidate {
    pub fn short_hash(&self) -> String {
        record::short_hash(&self.oprhash)
    }

    /// Hex form of the record hash, for logs and diagnostics.
    pub fn oprhash_hex(&self) -> String {
        hex::encode(self.oprhash)
    }
}

/// The output of one grading transaction, and the unit the chain stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedBlock {
    pub height: i32,
    pub version: u8,
    pub state: BlockState,
    /// Difficulty cutoff in force for this block.
    pub cutoff: usize,
    /// Validated candidates handed to the grader (after ledger fetch).
    pub admitted: usize,
    /// Candidates surviving difficulty admission (Phase 2).
    pub graded_count: usize,
    /// Winners first in rank order, then eliminated records in reverse
    /// elimination order. Empty for degenerate and failed blocks.
    pub graded: Vec<GradedCandidate>,
    /// Number of leading entries of `graded` that are winners.
    pub winner_count: usize,
    /// Coordinate-wise median of the winners' prices; empty unless graded.
    pub canonical_prices: Vec<u64>,
    /// Winners' short-hashes in rank order; the `previous_winners`
    /// reference for the next height.
    pub short_hashes: Vec<String>,
}

impl GradedBlock {
    /// The winners in rank order (empty for degenerate/failed blocks).
    pub fn winners(&self) -> &[GradedCandidate] {
        &self.graded[..self.winner_count]
    }

    pub fn is_graded(&self) -> bool {
        self.state == BlockState::Graded
    }

    pub(crate) fn degenerate(
        height: i32,
        version: u8,
        cutoff: usize,
        admitted: usize,
        graded_count: usize,
    ) -> Self {
        Self {
            height,
            version,
            state: BlockState::Degenerate,
            cutoff,
            admitted,
            graded_count,
            graded: Vec::new(),
            winner_count: 0,
            canonical_prices: Vec::new(),
            short_hashes: Vec::new(),
        }
    }

    pub(crate) fn failed(
        height: i32,
        version: u8,
        cutoff: usize,
        admitted: usize,
        graded_count: usize,
    ) -> Self {
        Self {
            height,
            version,
            state: BlockState::Failed,
            cutoff,
            admitted,
            graded_count,
            graded: Vec::new(),
            winner_count: 0,
            canonical_prices: Vec::new(),
            short_hashes: Vec::new(),
        }
    }
}
