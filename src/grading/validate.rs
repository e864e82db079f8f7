//! Entry validation.
//!
//! Turns a raw ledger entry into a grading [`Candidate`], or rejects it with
//! a typed [`ValidateError`]. Checks short-circuit on the first failure, in
//! a fixed order: entry-hash length, ext-ID count, difficulty-field length,
//! version byte, content decode, height match, asset cardinality, zero-value
//! assets, winners length, address validity, identity charset, winners
//! equality against the prior block.

use crate::grading::error::ValidateError;
use crate::grading::rules::RuleSet;
use crate::record::{self, codec, validate_payout_address, PriceRecord, RawEntry};

/// Number of external ID fields on a record entry:
/// nonce, difficulty, version byte.
const EXPECTED_EXT_IDS: usize = 3;

/// A validated record admitted to grading.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: PriceRecord,
    /// The ledger's hash of the carrying entry.
    pub entry_hash: [u8; 32],
    /// Miner's proof-of-work nonce.
    pub nonce: Vec<u8>,
    /// Difficulty claimed in the entry's second external ID.
    pub self_reported_difficulty: u64,
    /// SHA-256 of the canonical content, computed once here.
    pub oprhash: [u8; 32],
}

impl Candidate {
    /// Truncated base58 hash used by the next block's records.
    pub fn short_hash(&self) -> String {
        record::short_hash(&self.oprhash)
    }
}

/// Validates `entry` against the block being graded.
///
/// `expected_winners` is the prior graded block's short-hash vector; it is
/// empty at a network's genesis height and after a degenerate block.
pub fn validate_entry(
    entry: &RawEntry,
    height: i32,
    expected_winners: &[String],
    rules: &RuleSet,
) -> Result<Candidate, ValidateError> {
    if entry.entry_hash.len() != 32 {
        return Err(ValidateError::InvalidLength(entry.entry_hash.len()));
    }

    if entry.ext_ids.len() != EXPECTED_EXT_IDS {
        return Err(ValidateError::InvalidExtIdCount(entry.ext_ids.len()));
    }

    if entry.ext_ids[1].len() != 8 {
        return Err(ValidateError::InvalidDifficultyField(entry.ext_ids[1].len()));
    }

    if entry.ext_ids[2].len() != 1 || entry.ext_ids[2][0] != rules.version {
        return Err(ValidateError::InvalidVersion {
            expected: rules.version,
        });
    }

    let mut parsed = codec::decode(&entry.content)?;
    parsed.version = rules.version;

    if parsed.height != height {
        return Err(ValidateError::InvalidHeight {
            expected: height,
            got: parsed.height,
        });
    }

    if parsed.prices.len() != rules.assets.len() {
        return Err(ValidateError::InvalidAssets {
            expected: rules.assets.len(),
            got: parsed.prices.len(),
        });
    }

    if parsed.prices.iter().any(|price| *price == 0) {
        return Err(ValidateError::ZeroAsset);
    }

    if !winners_length_ok(&parsed.previous_winners, expected_winners, rules) {
        return Err(ValidateError::InvalidWinnersLength {
            expected: rules.winners_count,
        });
    }

    validate_payout_address(&parsed.payout_address)?;

    if !identity_ok(&parsed.identity) {
        return Err(ValidateError::InvalidIdentity);
    }

    if !winners_match(&parsed.previous_winners, expected_winners) {
        return Err(ValidateError::InvalidWinners);
    }

    let mut entry_hash = [0u8; 32];
    entry_hash.copy_from_slice(&entry.entry_hash);
    let mut difficulty = [0u8; 8];
    difficulty.copy_from_slice(&entry.ext_ids[1]);

    Ok(Candidate {
        oprhash: record::oprhash(&entry.content),
        entry_hash,
        nonce: entry.ext_ids[0].clone(),
        self_reported_difficulty: u64::from_be_bytes(difficulty),
        record: parsed,
    })
}

/// Identities are limited to alphanumerics and commas, and are non-empty.
fn identity_ok(identity: &str) -> bool {
    !identity.is_empty()
        && identity
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ',')
}

/// The winners vector must carry one short-hash per prior winner. With an
/// empty reference (genesis, or the block after a degenerate one) records
/// may carry either an empty vector or a full-length vector of empties.
fn winners_length_ok(winners: &[String], expected: &[String], rules: &RuleSet) -> bool {
    if expected.is_empty() {
        winners.is_empty() || winners.len() == rules.winners_count
    } else {
        winners.len() == rules.winners_count
    }
}

/// Set and order equality against the prior block's winners.
fn winners_match(winners: &[String], expected: &[String]) -> bool {
    if expected.is_empty() {
        return winners.iter().all(|w| w.is_empty());
    }
    winners == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::rules::{rules_at, Network};
    use crate::record::payout_address_from_rcd;
    use crate::testutil;

    fn v1_rules() -> RuleSet {
        rules_at(Network::UnitTest, 1).unwrap()
    }

    #[test]
    fn test_valid_entry_is_admitted() {
        let rules = v1_rules();
        let entry = testutil::raw_entry(&rules, 1, &[], [1; 32], 1000, "miner1");

        let candidate = validate_entry(&entry, 1, &[], &rules).unwrap();
        assert_eq!(candidate.record.height, 1);
        assert_eq!(candidate.record.version, 1);
        assert_eq!(candidate.self_reported_difficulty, 1000);
        assert_eq!(candidate.oprhash, record::oprhash(&entry.content));
    }

    #[test]
    fn test_rejects_bad_entry_hash_length() {
        let rules = v1_rules();
        let mut entry = testutil::raw_entry(&rules, 1, &[], [1; 32], 1000, "miner1");
        entry.entry_hash.truncate(31);

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidLength(31))
        );
    }

    #[test]
    fn test_rejects_wrong_extid_count() {
        let rules = v1_rules();
        let mut entry = testutil::raw_entry(&rules, 1, &[], [1; 32], 1000, "miner1");
        entry.ext_ids.pop();

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidExtIdCount(2))
        );
    }

    #[test]
    fn test_rejects_short_difficulty_field() {
        let rules = v1_rules();
        let mut entry = testutil::raw_entry(&rules, 1, &[], [1; 32], 1000, "miner1");
        entry.ext_ids[1] = vec![0; 4];

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidDifficultyField(4))
        );
    }

    #[test]
    fn test_rejects_wrong_version_byte() {
        let rules = v1_rules();
        let mut entry = testutil::raw_entry(&rules, 1, &[], [1; 32], 1000, "miner1");
        entry.ext_ids[2] = vec![9];

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidVersion { expected: 1 })
        );
    }

    #[test]
    fn test_rejects_height_mismatch() {
        let rules = v1_rules();
        let entry = testutil::raw_entry(&rules, 5, &[], [1; 32], 1000, "miner1");

        assert_eq!(
            validate_entry(&entry, 6, &[], &rules),
            Err(ValidateError::InvalidHeight { expected: 6, got: 5 })
        );
    }

    #[test]
    fn test_rejects_wrong_asset_cardinality() {
        let rules = v1_rules();
        let mut record = testutil::record(&rules, 1, &[], "miner1", [1; 32]);
        record.prices.pop();
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidAssets {
                expected: rules.assets.len(),
                got: rules.assets.len() - 1,
            })
        );
    }

    #[test]
    fn test_rejects_zero_asset() {
        let rules = v1_rules();
        let mut record = testutil::record(&rules, 1, &[], "miner1", [1; 32]);
        record.prices[3] = 0;
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::ZeroAsset)
        );
    }

    #[test]
    fn test_rejects_bad_identity() {
        let rules = v1_rules();
        let record = testutil::record(&rules, 1, &[], "miner one!", [1; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidIdentity)
        );
    }

    #[test]
    fn test_rejects_bad_address() {
        let rules = v1_rules();
        let mut record = testutil::record(&rules, 1, &[], "miner1", [1; 32]);
        record.payout_address = "FAnotanaddress".to_string();
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert!(matches!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_winners_set() {
        let rules = v1_rules();
        let expected: Vec<String> = (0..rules.winners_count)
            .map(|i| format!("winner{:02}", i))
            .collect();
        let mut wrong = expected.clone();
        wrong.swap(0, 1);

        let record = testutil::record(&rules, 1, &wrong, "miner1", [1; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert_eq!(
            validate_entry(&entry, 1, &expected, &rules),
            Err(ValidateError::InvalidWinners)
        );
    }

    #[test]
    fn test_rejects_wrong_winners_length() {
        let rules = v1_rules();
        let expected: Vec<String> = (0..rules.winners_count)
            .map(|i| format!("winner{:02}", i))
            .collect();

        let record = testutil::record(&rules, 1, &expected[..3], "miner1", [1; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);

        assert_eq!(
            validate_entry(&entry, 1, &expected, &rules),
            Err(ValidateError::InvalidWinnersLength {
                expected: rules.winners_count,
            })
        );
    }

    #[test]
    fn test_empty_reference_accepts_empty_and_all_empty_winners() {
        let rules = v1_rules();

        let record = testutil::record(&rules, 1, &[], "miner1", [1; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);
        assert!(validate_entry(&entry, 1, &[], &rules).is_ok());

        let empties = vec![String::new(); rules.winners_count];
        let record = testutil::record(&rules, 1, &empties, "miner1", [2; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);
        assert!(validate_entry(&entry, 1, &[], &rules).is_ok());

        // Non-empty short-hashes against an empty reference are rejected.
        let bogus = vec!["deadbeef".to_string(); rules.winners_count];
        let record = testutil::record(&rules, 1, &bogus, "miner1", [3; 32]);
        let entry = testutil::raw_entry_for_record(&rules, &record, 1000);
        assert_eq!(
            validate_entry(&entry, 1, &[], &rules),
            Err(ValidateError::InvalidWinners)
        );
    }

    #[test]
    fn test_address_generator_produces_valid_addresses() {
        let addr = payout_address_from_rcd(&[0x42; 32]);
        assert!(validate_payout_address(&addr).is_ok());
    }
}
