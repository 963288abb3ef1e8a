//! Genesis block creation.
//!
//! The genesis block is fixed: index 0, stamped at the epoch, no transactions,
//! no work, produced by `"system"`, linked to the [`BlockHash::ZERO`]
//! sentinel. Every node therefore derives the same genesis hash without any
//! coordination.

use poaw_types::{BlockHash, Timestamp};

use crate::Block;

/// Producer identity recorded on the genesis block.
pub const GENESIS_PRODUCER: &str = "system";

/// Build the genesis block.
pub fn genesis_block() -> Block {
    Block::new(
        0,
        Timestamp::EPOCH,
        Vec::new(),
        BlockHash::ZERO,
        None,
        None,
        GENESIS_PRODUCER,
    )
}

/// The deterministic genesis hash.
pub fn genesis_hash() -> BlockHash {
    genesis_block().hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_deterministic() {
        assert_eq!(genesis_block(), genesis_block());
        assert_eq!(genesis_hash(), genesis_block().hash);
    }

    #[test]
    fn genesis_shape() {
        let g = genesis_block();
        assert_eq!(g.index, 0);
        assert!(g.previous_hash.is_zero());
        assert!(g.transactions.is_empty());
        assert!(g.work_task.is_none() && g.work_solution.is_none());
        assert_eq!(g.producer, "system");
        assert!(g.has_valid_hash());
        assert!(!g.hash.is_zero());
    }
}
