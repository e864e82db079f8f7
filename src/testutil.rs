//! Shared fixture builders for unit tests.

use sha2::{Digest, Sha256};

use crate::grading::rules::RuleSet;
use crate::grading::validate::Candidate;
use crate::pow::DifficultyOracle;
use crate::record::{self, codec, payout_address_from_rcd, PriceRecord, RawEntry};

/// Oracle that reads the difficulty straight out of the nonce. Fixtures
/// built by this module store the difficulty as a big-endian nonce, so their
/// claimed difficulties verify, while tests keep full control of ordering.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NonceDifficulty;

impl DifficultyOracle for NonceDifficulty {
    fn compute_difficulty(&self, _oprhash: &[u8; 32], nonce: &[u8]) -> u64 {
        let mut raw = [0u8; 8];
        let len = nonce.len().min(8);
        raw[..len].copy_from_slice(&nonce[..len]);
        u64::from_be_bytes(raw)
    }
}

/// Distinct, deterministic RCD seed per index.
pub(crate) fn seed(i: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..8].copy_from_slice(&i.to_be_bytes());
    out[31] = 1;
    out
}

/// A record for `height` carrying `winners` and per-asset prices
/// `100 * (index + 1)`.
pub(crate) fn record(
    rules: &RuleSet,
    height: i32,
    winners: &[String],
    identity: &str,
    rcd: [u8; 32],
) -> PriceRecord {
    let prices: Vec<u64> = (0..rules.assets.len()).map(|i| 100 * (i as u64 + 1)).collect();
    PriceRecord {
        version: rules.version,
        height,
        identity: identity.to_string(),
        payout_address: payout_address_from_rcd(&rcd),
        prices,
        previous_winners: winners.to_vec(),
    }
}

/// Wraps `record` in a raw ledger entry claiming `difficulty`. The nonce is
/// the big-endian difficulty, so the claim verifies under [`NonceDifficulty`].
pub(crate) fn raw_entry_for_record(
    rules: &RuleSet,
    record: &PriceRecord,
    difficulty: u64,
) -> RawEntry {
    let content = codec::encode(record);
    let mut hasher = Sha256::new();
    hasher.update(b"entry");
    hasher.update(&content);
    let entry_hash = hasher.finalize().to_vec();

    RawEntry {
        entry_hash,
        ext_ids: vec![
            difficulty.to_be_bytes().to_vec(),
            difficulty.to_be_bytes().to_vec(),
            vec![rules.version],
        ],
        content,
    }
}

/// A well-formed raw entry in one call.
pub(crate) fn raw_entry(
    rules: &RuleSet,
    height: i32,
    winners: &[String],
    rcd: [u8; 32],
    difficulty: u64,
    identity: &str,
) -> RawEntry {
    let record = record(rules, height, winners, identity, rcd);
    raw_entry_for_record(rules, &record, difficulty)
}

/// A validated candidate with chosen prices and difficulty, bypassing the
/// entry validator.
pub(crate) fn candidate(
    rules: &RuleSet,
    height: i32,
    winners: &[String],
    identity: &str,
    rcd: [u8; 32],
    prices: &[u64],
    difficulty: u64,
) -> Candidate {
    assert_eq!(prices.len(), rules.assets.len(), "fixture price cardinality");
    let mut rec = record(rules, height, winners, identity, rcd);
    rec.prices = prices.to_vec();

    let content = codec::encode(&rec);
    let oprhash = record::oprhash(&content);

    let mut hasher = Sha256::new();
    hasher.update(b"entry");
    hasher.update(&content);
    let digest = hasher.finalize();
    let mut entry_hash = [0u8; 32];
    entry_hash.copy_from_slice(&digest);

    Candidate {
        record: rec,
        entry_hash,
        nonce: difficulty.to_be_bytes().to_vec(),
        self_reported_difficulty: difficulty,
        oprhash,
    }
}
