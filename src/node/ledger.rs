//! Ledger client interface.
//!
//! The ledger provides block ordering, entry storage, and the minute marker
//! the runtime keys off. It is trusted to deliver monotonically advancing
//! heights and consistent entry hashes.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;

use crate::record::RawEntry;

/// A block-cadence event from the ledger: which height is open and which
/// minute of the block window the ledger is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEvent {
    pub height: i32,
    pub minute: u8,
}

/// Operations the grading core consumes from the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync + 'static {
    /// Stream of block events. Called once at runtime startup.
    async fn subscribe_block_events(&self) -> mpsc::Receiver<BlockEvent>;

    /// All entries of `chain_id` revealed at `height`, in the ledger's
    /// native order.
    async fn get_entries(&self, chain_id: &[u8; 32], height: i32)
        -> anyhow::Result<Vec<RawEntry>>;

    /// A single entry by hash.
    async fn get_entry(&self, entry_hash: &[u8; 32]) -> anyhow::Result<RawEntry>;
}

/// Chain ID derivation: SHA-256 over the concatenated SHA-256 digests of the
/// chain-name fields.
pub fn chain_id_from_fields(fields: &[&[u8]]) -> [u8; 32] {
    let mut outer = Sha256::new();
    for field in fields {
        outer.update(Sha256::digest(field));
    }
    let digest = outer.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_depends_on_field_boundaries() {
        let joined = chain_id_from_fields(&[b"PegNet", b"MainNet"]);
        let split = chain_id_from_fields(&[b"PegNetMain", b"Net"]);
        assert_ne!(joined, split);
    }

    #[test]
    fn test_chain_id_deterministic() {
        let a = chain_id_from_fields(&[b"PegNet", b"MainNet", b"OraclePriceRecords"]);
        let b = chain_id_from_fields(&[b"PegNet", b"MainNet", b"OraclePriceRecords"]);
        assert_eq!(a, b);
    }
}
