//! Blocks and their content hash.

use serde::{Deserialize, Serialize};

use poaw_crypto::CanonicalEncoder;
use poaw_types::{BlockHash, Timestamp, Transaction, WorkPayload};

/// Domain tag for block pre-images. Bump the version if the field list changes.
const BLOCK_DOMAIN: &[u8] = b"poaw/block/v1";

/// A block in the chain. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain; 0 is genesis.
    pub index: u64,

    pub timestamp: Timestamp,

    /// Included transactions, in order.
    pub transactions: Vec<Transaction>,

    /// Hash of the preceding block, or [`BlockHash::ZERO`] for genesis.
    pub previous_hash: BlockHash,

    /// Task posed by the work oracle (`None` for genesis).
    pub work_task: Option<WorkPayload>,

    /// Solution submitted for `work_task` (`None` for genesis).
    pub work_solution: Option<WorkPayload>,

    /// Identity of the node that produced the block.
    pub producer: String,

    /// Digest over every field above.
    pub hash: BlockHash,
}

impl Block {
    /// Assemble a block and seal it with its computed hash.
    pub fn new(
        index: u64,
        timestamp: Timestamp,
        transactions: Vec<Transaction>,
        previous_hash: BlockHash,
        work_task: Option<WorkPayload>,
        work_solution: Option<WorkPayload>,
        producer: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            work_task,
            work_solution,
            producer: producer.into(),
            hash: BlockHash::ZERO,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Compute the hash of this block from its contents.
    ///
    /// The pre-image is built from an explicit field list in a fixed order;
    /// the stored `hash` is never part of it.
    pub fn compute_hash(&self) -> BlockHash {
        let mut enc = CanonicalEncoder::new(BLOCK_DOMAIN);
        enc.put_u64(self.index)
            .put_u64(self.timestamp.as_secs())
            .put_u64(self.transactions.len() as u64);
        for tx in &self.transactions {
            enc.put_str(&tx.sender)
                .put_str(&tx.recipient)
                .put_f64(tx.amount)
                .put_u64(tx.timestamp.as_secs());
        }
        enc.put_hash(&self.previous_hash)
            .put_optional_bytes(self.work_task.as_ref().map(WorkPayload::as_bytes))
            .put_optional_bytes(self.work_solution.as_ref().map(WorkPayload::as_bytes))
            .put_str(&self.producer);
        enc.finish()
    }

    /// Whether the stored hash matches the recomputed one.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        Block::new(
            3,
            Timestamp::new(1_700_000_000),
            vec![Transaction::new("alice", "bob", 1.25, Timestamp::new(1_699_999_999))],
            BlockHash::new([7u8; 32]),
            Some(WorkPayload::new(b"task".to_vec())),
            Some(WorkPayload::new(b"solution".to_vec())),
            "miner-1",
        )
    }

    #[test]
    fn hash_is_stable() {
        let block = sample();
        assert_eq!(block.compute_hash(), block.compute_hash());
        assert!(block.has_valid_hash());
    }

    #[test]
    fn every_field_feeds_the_hash() {
        let base = sample();
        let original = base.hash;

        let mut b = base.clone();
        b.index += 1;
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.timestamp = Timestamp::new(1);
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.transactions[0].amount = 1.26;
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.transactions[0].recipient = "carol".into();
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.transactions.clear();
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.previous_hash = BlockHash::ZERO;
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.work_task = None;
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.work_solution = Some(WorkPayload::new(b"solutioN".to_vec()));
        assert_ne!(b.compute_hash(), original);

        let mut b = base.clone();
        b.producer = "miner-2".into();
        assert_ne!(b.compute_hash(), original);
    }

    #[test]
    fn stored_hash_is_excluded_from_preimage() {
        let mut block = sample();
        let expected = block.compute_hash();
        block.hash = BlockHash::new([0xff; 32]);
        assert_eq!(block.compute_hash(), expected);
        assert!(!block.has_valid_hash());
    }

    #[test]
    fn swapping_task_and_solution_changes_hash() {
        let mut block = sample();
        std::mem::swap(&mut block.work_task, &mut block.work_solution);
        assert_ne!(block.compute_hash(), sample().hash);
    }

    #[test]
    fn json_roundtrip_keeps_hash_valid() {
        let block = sample();
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(back.has_valid_hash());
    }
}
