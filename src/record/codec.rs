//! Canonical on-wire codec for price records.
//!
//! Record content is a positional, length-prefixed protobuf message: payout
//! address, miner identity, target height, the asset price vector, and the
//! previous-winners short-hash vector. The codec is version-aware only in
//! that the two vector cardinalities are fixed by the rule-set; cardinality
//! is enforced by the entry validator, not here.
//!
//! Decoding is strict: the input must be the canonical encoding of the
//! decoded record. Truncated, over-long, or non-canonical inputs are
//! rejected, which keeps `decode(encode(x)) == x` and `encode(decode(b)) == b`
//! bit-exact in both directions.

use prost::Message;
use thiserror::Error;

use crate::record::PriceRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("content does not decode: {0}")]
    Malformed(String),

    #[error("content is not the canonical encoding of its record")]
    NonCanonical,
}

/// Wire form of the record content. Field order is the wire contract.
#[derive(Clone, PartialEq, Message)]
pub struct RecordContent {
    #[prost(string, tag = "1")]
    pub address: String,

    #[prost(string, tag = "2")]
    pub identity: String,

    #[prost(int32, tag = "3")]
    pub height: i32,

    #[prost(uint64, repeated, tag = "4")]
    pub assets: Vec<u64>,

    #[prost(string, repeated, tag = "5")]
    pub winners: Vec<String>,
}

/// Canonically encodes the content fields of `record`.
///
/// The version byte, nonce, and difficulty are carried in the entry's
/// external IDs, not in the content, so they do not appear here.
pub fn encode(record: &PriceRecord) -> Vec<u8> {
    let content = RecordContent {
        address: record.payout_address.clone(),
        identity: record.identity.clone(),
        height: record.height,
        assets: record.prices.clone(),
        winners: record.previous_winners.clone(),
    };
    content.encode_to_vec()
}

/// Decodes `content` into the content fields of a record.
///
/// The returned record carries a zero version byte; the entry validator
/// fills it in from the external IDs.
pub fn decode(content: &[u8]) -> Result<PriceRecord, CodecError> {
    let decoded = RecordContent::decode(content)
        .map_err(|e| CodecError::Malformed(e.to_string()))?;

    // Protobuf decoding tolerates unknown fields and non-minimal varints;
    // the chain contract does not. Re-encode and compare.
    if decoded.encode_to_vec() != content {
        return Err(CodecError::NonCanonical);
    }

    Ok(PriceRecord {
        version: 0,
        height: decoded.height,
        identity: decoded.identity,
        payout_address: decoded.address,
        prices: decoded.assets,
        previous_winners: decoded.winners,
    })
}
