//! Price-record model and wire formats.
//!
//! This module provides the data carried by one miner submission:
//! - [`PriceRecord`]: the decoded record content plus its version byte
//! - [`RawEntry`]: an undecoded ledger entry as fetched from the chain
//! - the canonical content codec ([`codec`]), per-version asset lists
//!   ([`assets`]), and payout-address validation ([`address`])

pub mod address;
pub mod assets;
pub mod codec;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use address::{payout_address_from_rcd, validate_payout_address, AddressError};
pub use codec::{CodecError, RecordContent};

/// Number of base58 characters of the record hash used to reference a
/// winner from the following block.
pub const SHORT_HASH_LEN: usize = 8;

/// One miner's price observation for one ledger block.
///
/// The content fields (everything except `version`) are what the canonical
/// codec encodes; `version` travels in the entry's external IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Protocol rule-set selector.
    pub version: u8,
    /// Ledger block height this record targets.
    pub height: i32,
    /// Miner identity, alphanumeric and commas only.
    pub identity: String,
    /// Base58-check payout address.
    pub payout_address: String,
    /// Positional asset prices, one per asset in the version's list.
    pub prices: Vec<u64>,
    /// Short-hashes of the prior block's winners, in rank order.
    pub previous_winners: Vec<String>,
}

/// A raw ledger entry before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// The ledger's hash of this entry.
    pub entry_hash: Vec<u8>,
    /// External ID fields; for records these are
    /// `[nonce, difficulty_be8, [version_byte]]`.
    pub ext_ids: Vec<Vec<u8>>,
    /// Canonical-encoded record content.
    pub content: Vec<u8>,
}

/// SHA-256 of canonical record content. This is the hash the proof-of-work
/// nonce is ground against and the hash short-hashes are derived from.
pub fn oprhash(content: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(content);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Truncated base58 form of a record hash, used to link a block's winners
/// into the next block's records.
pub fn short_hash(oprhash: &[u8; 32]) -> String {
    let encoded = bs58::encode(oprhash).into_string();
    encoded[..SHORT_HASH_LEN].to_string()
}
