//! Payout address validation.
//!
//! Payout addresses are base58-check strings carrying a two-byte type prefix,
//! a 32-byte RCD hash, and a four-byte double-SHA-256 checksum. Only the
//! public factoid form (`FA...`, prefix `0x5f 0xb1`) is a valid payout
//! target for a price record.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Two-byte prefix for public factoid addresses. Encodes to the `FA` prefix
/// in base58.
const FA_PUB_PREFIX: [u8; 2] = [0x5f, 0xb1];

/// Decoded payload length: prefix (2) + RCD hash (32) + checksum (4).
const DECODED_LEN: usize = 38;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    Encoding(String),

    #[error("decoded address is {0} bytes, expected {DECODED_LEN}")]
    Length(usize),

    #[error("address prefix is not a public factoid prefix")]
    Prefix,

    #[error("address checksum mismatch")]
    Checksum,
}

/// Checks that `addr` is a well-formed public factoid payout address.
pub fn validate_payout_address(addr: &str) -> Result<(), AddressError> {
    let decoded = bs58::decode(addr)
        .into_vec()
        .map_err(|e| AddressError::Encoding(e.to_string()))?;

    if decoded.len() != DECODED_LEN {
        return Err(AddressError::Length(decoded.len()));
    }

    if decoded[..2] != FA_PUB_PREFIX {
        return Err(AddressError::Prefix);
    }

    let checksum = checksum(&decoded[..34]);
    if decoded[34..] != checksum {
        return Err(AddressError::Checksum);
    }

    Ok(())
}

/// Encodes a 32-byte RCD hash as a public factoid address.
///
/// The inverse of [`validate_payout_address`]; miners use this to derive the
/// payout address they embed in records, and tests use it to build fixtures.
pub fn payout_address_from_rcd(rcd_hash: &[u8; 32]) -> String {
    let mut payload = Vec::with_capacity(DECODED_LEN);
    payload.extend_from_slice(&FA_PUB_PREFIX);
    payload.extend_from_slice(rcd_hash);
    let checksum = checksum(&payload);
    payload.extend_from_slice(&checksum);
    bs58::encode(payload).into_string()
}

/// First four bytes of SHA-256d over `data`.
fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_valid() {
        let addr = payout_address_from_rcd(&[0xab; 32]);
        assert!(addr.starts_with("FA"), "got {}", addr);
        assert_eq!(validate_payout_address(&addr), Ok(()));
    }

    #[test]
    fn test_rejects_non_base58() {
        let err = validate_payout_address("FA0OIl+/").unwrap_err();
        assert!(matches!(err, AddressError::Encoding(_)));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = validate_payout_address("FA2abc").unwrap_err();
        assert!(matches!(err, AddressError::Length(_)));
    }

    #[test]
    fn test_rejects_corrupted_checksum() {
        let addr = payout_address_from_rcd(&[0x11; 32]);
        // Flip the final character to another base58 character.
        let mut corrupted: Vec<char> = addr.chars().collect();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == '2' { '3' } else { '2' };
        let corrupted: String = corrupted.into_iter().collect();

        assert_eq!(
            validate_payout_address(&corrupted),
            Err(AddressError::Checksum)
        );
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        // Build a payload with an entry-credit style prefix instead.
        let mut payload = vec![0x59, 0x2a];
        payload.extend_from_slice(&[0x22; 32]);
        let first = Sha256::digest(&payload);
        let second = Sha256::digest(first);
        payload.extend_from_slice(&second[..4]);
        let addr = bs58::encode(payload).into_string();

        assert_eq!(validate_payout_address(&addr), Err(AddressError::Prefix));
    }

    #[test]
    fn test_distinct_rcds_give_distinct_addresses() {
        assert_ne!(
            payout_address_from_rcd(&[1; 32]),
            payout_address_from_rcd(&[2; 32])
        );
    }
}
