//! Grading error taxonomy.
//!
//! Entry-level failures ([`ValidateError`]) are local: the offending
//! candidate is dropped and grading proceeds. Block-level failures
//! ([`GradingError`]) mark the whole block and the chain advances with that
//! marker.

use thiserror::Error;

use crate::record::{AddressError, CodecError};

/// Why a raw entry was rejected before grading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("invalid entry hash length: {0} bytes")]
    InvalidLength(usize),

    #[error("invalid extid count: {0}")]
    InvalidExtIdCount(usize),

    #[error("self reported difficulty must be 8 bytes, got {0}")]
    InvalidDifficultyField(usize),

    #[error("invalid version byte, expected {expected}")]
    InvalidVersion { expected: u8 },

    #[error("content does not decode: {0}")]
    DecodeError(#[from] CodecError),

    #[error("record height {got} does not match block height {expected}")]
    InvalidHeight { expected: i32, got: i32 },

    #[error("invalid assets: expected {expected} entries, got {got}")]
    InvalidAssets { expected: usize, got: usize },

    #[error("assets must be greater than 0")]
    ZeroAsset,

    #[error("must have exactly {expected} previous winning shorthashes")]
    InvalidWinnersLength { expected: usize },

    #[error("payout address is invalid: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("only alphanumeric characters and commas are allowed in the identity")]
    InvalidIdentity,

    #[error("incorrect set of previous winners")]
    InvalidWinners,
}

impl ValidateError {
    /// Stable label for the failure-counter metric.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidateError::InvalidLength(_) => "entry_hash_length",
            ValidateError::InvalidExtIdCount(_) => "extid_count",
            ValidateError::InvalidDifficultyField(_) => "difficulty_field",
            ValidateError::InvalidVersion { .. } => "version",
            ValidateError::DecodeError(_) => "decode",
            ValidateError::InvalidHeight { .. } => "height",
            ValidateError::InvalidAssets { .. } => "assets",
            ValidateError::ZeroAsset => "zero_asset",
            ValidateError::InvalidWinnersLength { .. } => "winners_length",
            ValidateError::InvalidAddress(_) => "address",
            ValidateError::InvalidIdentity => "identity",
            ValidateError::InvalidWinners => "winners",
        }
    }
}

/// Why a block could not be fully graded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("no rule-set covers height {height} on {network}")]
    UnsupportedVersion { network: String, height: i32 },

    #[error("{network} is not active at height {height}")]
    NetworkInactive { network: String, height: i32 },

    #[error("grade computation produced a non-finite value")]
    NonFiniteGrade,
}
