//! Chain assembly.
//!
//! [`OracleChain`] holds the ordered sequence of graded blocks for one
//! network. Blocks live in a vector indexed by height offset; cross-block
//! references are heights, never pointers, so reader snapshots are plain
//! value copies. The grader runtime is the only writer; a block is never
//! mutated once appended, only truncated away on a ledger reorganization.

pub mod store;

use std::sync::Arc;

use thiserror::Error;

use crate::grading::graded_block::GradedBlock;
use crate::grading::rules::Network;
use store::{KeyValueStore, StoreError};

/// Key of the persisted head pointer.
const HEAD_KEY: &str = "graded/head";

/// Key of one persisted graded block. Heights are zero-padded so that the
/// store's lexicographic iteration order is height order.
fn block_key(height: i32) -> String {
    format!("graded/{:010}", height)
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("append of height {got} onto head {expected}")]
    NonSequentialAppend { expected: i32, got: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("chain corruption: {0}")]
    Corrupt(String),
}

/// The ordered sequence of graded blocks, plus optional persistence.
pub struct OracleChain {
    network: Network,
    blocks: Vec<GradedBlock>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for OracleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleChain")
            .field("network", &self.network)
            .field("blocks", &self.blocks)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .finish()
    }
}

impl OracleChain {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            blocks: Vec::new(),
            store: None,
        }
    }

    pub fn with_store(network: Network, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            network,
            blocks: Vec::new(),
            store: Some(store),
        }
    }

    /// Rebuilds a chain from its persisted blocks, verifying contiguity and
    /// the head pointer.
    pub async fn load(
        network: Network,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ChainError> {
        let mut blocks: Vec<GradedBlock> = Vec::new();
        for (key, bytes) in store.iterate("graded/").await? {
            if key == HEAD_KEY {
                continue;
            }
            let block: GradedBlock = serde_json::from_slice(&bytes)
                .map_err(|e| ChainError::Corrupt(format!("block {}: {}", key, e)))?;
            blocks.push(block);
        }
        blocks.sort_by_key(|block| block.height);

        for pair in blocks.windows(2) {
            if pair[1].height != pair[0].height + 1 {
                return Err(ChainError::Corrupt(format!(
                    "gap between persisted heights {} and {}",
                    pair[0].height, pair[1].height
                )));
            }
        }

        let head = match store.get(HEAD_KEY).await? {
            Some(bytes) => Some(
                serde_json::from_slice::<i32>(&bytes)
                    .map_err(|e| ChainError::Corrupt(format!("head pointer: {}", e)))?,
            ),
            None => None,
        };
        match (head, blocks.last()) {
            (Some(head), Some(last)) if head != last.height => {
                return Err(ChainError::Corrupt(format!(
                    "head pointer {} does not match last persisted block {}",
                    head, last.height
                )));
            }
            (Some(head), None) => {
                return Err(ChainError::Corrupt(format!(
                    "head pointer {} with no persisted blocks",
                    head
                )));
            }
            _ => {}
        }

        Ok(Self {
            network,
            blocks,
            store: Some(store),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn head(&self) -> Option<&GradedBlock> {
        self.blocks.last()
    }

    pub fn get(&self, height: i32) -> Option<&GradedBlock> {
        let base = self.blocks.first()?.height;
        let offset = height.checked_sub(base)?;
        if offset < 0 {
            return None;
        }
        self.blocks.get(offset as usize)
    }

    /// The winners' short-hashes of `height`, if that block is on the chain.
    /// Degenerate and failed blocks yield an empty vector.
    pub fn winners(&self, height: i32) -> Option<Vec<String>> {
        self.get(height).map(|block| block.short_hashes.clone())
    }

    /// The `previous_winners` reference that records targeting `height` must
    /// carry: the winners of `height - 1`, or the empty reference when there
    /// is no graded predecessor.
    pub fn expected_winners(&self, height: i32) -> Vec<String> {
        self.winners(height - 1).unwrap_or_default()
    }

    /// Value snapshot of the blocks with heights in `from..=to`.
    pub fn range(&self, from: i32, to: i32) -> Vec<GradedBlock> {
        self.blocks
            .iter()
            .filter(|block| block.height >= from && block.height <= to)
            .cloned()
            .collect()
    }

    /// Appends the next graded block. Valid only when `block.height` extends
    /// the head by exactly one (any height starts an empty chain).
    pub async fn append(&mut self, block: GradedBlock) -> Result<(), ChainError> {
        if let Some(head) = self.head() {
            if block.height != head.height + 1 {
                return Err(ChainError::NonSequentialAppend {
                    expected: head.height + 1,
                    got: block.height,
                });
            }
        }

        if let Some(store) = &self.store {
            let bytes = serde_json::to_vec(&block)
                .map_err(|e| ChainError::Corrupt(format!("encode block: {}", e)))?;
            store.put(&block_key(block.height), bytes).await?;
            let head_bytes = serde_json::to_vec(&block.height)
                .map_err(|e| ChainError::Corrupt(format!("encode head: {}", e)))?;
            store.put(HEAD_KEY, head_bytes).await?;
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Drops every block above `height`, for re-grading past a ledger fork
    /// point. Truncating below the first block empties the chain.
    pub async fn truncate_to(&mut self, height: i32) -> Result<(), ChainError> {
        while let Some(last) = self.blocks.last() {
            if last.height <= height {
                break;
            }
            let last_height = last.height;
            self.blocks.pop();
            if let Some(store) = &self.store {
                store.delete(&block_key(last_height)).await?;
            }
        }

        if let Some(store) = &self.store {
            match self.blocks.last() {
                Some(head) => {
                    let bytes = serde_json::to_vec(&head.height)
                        .map_err(|e| ChainError::Corrupt(format!("encode head: {}", e)))?;
                    store.put(HEAD_KEY, bytes).await?;
                }
                None => store.delete(HEAD_KEY).await?,
            }
        }
        Ok(())
    }
}
