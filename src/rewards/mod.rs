//! Rank-indexed payout resolution.
//!
//! A pure mapping from a graded block to the payouts it earns. The schedule
//! is version-defined and rank-indexed; amounts are whole native tokens
//! scaled by the point multiple into integer reward units, so no payout
//! arithmetic touches floating point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grading::graded_block::GradedBlock;

/// Reward units per whole native token.
pub const POINT_MULTIPLE: u64 = 100_000_000;

/// One winner's payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub payout_address: String,
    /// Native-token units (scaled by [`POINT_MULTIPLE`]).
    pub reward_units: u64,
}

/// Whole-token reward for `rank` (1-based) under `version` rules.
/// Ranks outside the paid set earn zero.
pub fn schedule(version: u8, rank: usize) -> u64 {
    match version {
        1 => match rank {
            1 => 800,
            2 => 600,
            3..=10 => 450,
            _ => 0,
        },
        _ => match rank {
            1 => 800,
            2..=25 => 600,
            _ => 0,
        },
    }
}

/// Resolves the payout map of a graded block: winner rank to payout.
/// Degenerate and failed blocks resolve to an empty map.
pub fn resolve(block: &GradedBlock) -> BTreeMap<usize, Payout> {
    let mut payouts = BTreeMap::new();
    for winner in block.winners() {
        let reward = schedule(block.version, winner.rank);
        if reward == 0 {
            continue;
        }
        payouts.insert(
            winner.rank,
            Payout {
                payout_address: winner.payout_address.clone(),
                reward_units: reward * POINT_MULTIPLE,
            },
        );
    }
    payouts
}
