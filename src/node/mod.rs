//! Node runtime layer.
//!
//! Wires the deterministic grading pipeline to its external collaborators:
//! the ledger client delivering block events and raw entries, the retry
//! policy for ledger I/O, and the grader runtime that owns the chain.

pub mod backoff;
pub mod ledger;
pub mod runtime;

pub use ledger::{chain_id_from_fields, BlockEvent, LedgerClient};
pub use runtime::{
    GradedBlockEvent, GraderRuntime, RuntimeCommand, RuntimeConfig, RuntimeError,
    RuntimeHandle,
};
