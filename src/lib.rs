//! # Oracle Chain Core
//!
//! The deterministic grading, validation, and chain-assembly core of a
//! decentralized price-oracle protocol.
//!
//! ## Overview
//!
//! Independent miners observe external asset prices, assemble a price record
//! per ledger block, perform proof-of-work over the record hash, and publish
//! entries onto an append-only ledger. For each block this crate validates
//! the raw entries, ranks candidates by self-reported difficulty, grades the
//! survivors by price accuracy over repeated elimination rounds, and links
//! the graded result into a chain. Each block's winners and canonical prices
//! feed the next block's records, forming the consensus thread of the
//! protocol.
//!
//! ## Key Components
//!
//! - **record**: price-record model, canonical codec, asset lists, address
//!   validation
//! - **grading**: rule-set dispatch, entry validation, the block grader
//! - **chain**: the graded-block chain and its key-value persistence
//! - **rewards**: rank-indexed payout resolution
//! - **pow**: the difficulty-oracle interface to the external mining hash
//! - **node**: the grader runtime, ledger-client interface, retry policy
//!
//! ## Determinism
//!
//! Any two nodes observing the same candidate set produce bit-identical
//! graded blocks: ordering tie-breaks are total, and grade summation order
//! is fixed by the rule-set. Mining, price polling, wallet construction,
//! and transport are external collaborators and live elsewhere.

pub mod chain;
pub mod grading;
pub mod node;
pub mod pow;
pub mod record;
pub mod rewards;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use chain::{store::KeyValueStore, store::MemoryStore, ChainError, OracleChain};
pub use grading::{
    grade_block, rules_at, validate_entry, BlockState, Candidate, DifficultyCache,
    GradedBlock, GradedCandidate, GradingError, GradingMetrics, Network, RuleSet,
    ValidateError,
};
pub use node::{
    BlockEvent, GradedBlockEvent, GraderRuntime, LedgerClient, RuntimeCommand,
    RuntimeConfig, RuntimeError, RuntimeHandle,
};
pub use pow::DifficultyOracle;
pub use record::{PriceRecord, RawEntry};
pub use rewards::{resolve, Payout};
