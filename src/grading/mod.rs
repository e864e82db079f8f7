//! Deterministic grading pipeline.
//!
//! ## Key Components
//!
//! - **rules**: rule-set selection by block height and network
//! - **validate**: raw ledger entries to grading candidates
//! - **grade**: difficulty admission and multi-round accuracy grading
//! - **graded_block**: the pipeline's output model
//! - **cache**: LRU reuse of verified proof-of-work difficulties
//! - **metrics**: Prometheus counters for the pipeline
//!
//! ## Determinism
//!
//! Any two nodes observing the same candidate set must produce bit-identical
//! graded blocks. Everything order-dependent in this module (sorting,
//! elimination, tie-breaks, floating-point summation) is fixed by the
//! rule-set, never by insertion order or hashing artifacts.

pub mod cache;
pub mod error;
pub mod grade;
pub mod graded_block;
pub mod metrics;
pub mod rules;
pub mod validate;

pub use cache::DifficultyCache;
pub use error::{GradingError, ValidateError};
pub use grade::grade_block;
pub use graded_block::{BlockState, GradedBlock, GradedCandidate};
pub use metrics::GradingMetrics;
pub use rules::{rules_at, Network, RuleSet};
pub use validate::{validate_entry, Candidate};
