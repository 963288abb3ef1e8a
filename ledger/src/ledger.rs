//! The local chain.
//!
//! Normal operation only ever appends. The chain can be swapped wholesale
//! through [`Ledger::replace`], and only for a strictly longer candidate that
//! passes full validation.

use crate::admission::AdmissionCheck;
use crate::error::{ChainFault, LedgerError, LinkageFault};
use crate::genesis::genesis_block;
use crate::Block;

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    /// An empty ledger. Call [`Ledger::init_genesis`] before use.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// A ledger holding only the genesis block.
    pub fn with_genesis() -> Self {
        let mut ledger = Self::new();
        ledger.init_genesis();
        ledger
    }

    /// Rebuild a ledger from stored blocks, re-verifying the whole chain.
    pub fn from_blocks<A>(blocks: Vec<Block>, admission: &A) -> Result<Self, ChainFault>
    where
        A: AdmissionCheck + ?Sized,
    {
        Self::check_chain(&blocks, admission)?;
        Ok(Self { blocks })
    }

    /// Install the genesis block if the chain is empty. Idempotent.
    pub fn init_genesis(&mut self) -> &Block {
        if self.blocks.is_empty() {
            self.blocks.push(genesis_block());
        }
        &self.blocks[0]
    }

    /// The last block.
    pub fn head(&self) -> Result<&Block, LedgerError> {
        self.blocks.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a block that extends the current head.
    ///
    /// Structural check only: the block must link to the head, carry the next
    /// index and a correct digest. Work admission is checked by the caller
    /// beforehand.
    pub fn append(&mut self, block: Block) -> Result<(), LedgerError> {
        let head = self.head()?;
        check_link(head, &block).map_err(|fault| LedgerError::ChainLinkage {
            index: block.index,
            fault,
        })?;
        self.blocks.push(block);
        Ok(())
    }

    /// Validate `block` as the next block on this chain, including admission.
    pub fn check_continuation<A>(&self, block: &Block, admission: &A) -> Result<(), ChainFault>
    where
        A: AdmissionCheck + ?Sized,
    {
        let head = self.blocks.last().ok_or(ChainFault::Empty)?;
        check_link(head, block).map_err(|fault| ChainFault::Linkage {
            index: block.index,
            fault,
        })?;
        admission
            .check_admission(block)
            .map_err(|reason| ChainFault::Admission {
                index: block.index,
                reason: reason.to_string(),
            })
    }

    /// Walk a whole candidate chain, returning the first fault.
    ///
    /// Genesis must be well formed (index 0, sentinel previous hash, no work,
    /// correct digest) and is never sent to admission. Every later block must
    /// link to its predecessor, carry a correct digest and be admitted.
    pub fn check_chain<A>(chain: &[Block], admission: &A) -> Result<(), ChainFault>
    where
        A: AdmissionCheck + ?Sized,
    {
        let genesis = chain.first().ok_or(ChainFault::Empty)?;
        check_genesis(genesis).map_err(|fault| ChainFault::Linkage { index: 0, fault })?;

        for pair in chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            check_link(previous, current).map_err(|fault| ChainFault::Linkage {
                index: current.index,
                fault,
            })?;
            admission
                .check_admission(current)
                .map_err(|reason| ChainFault::Admission {
                    index: current.index,
                    reason: reason.to_string(),
                })?;
        }
        Ok(())
    }

    /// Whether a candidate chain is valid in full. Fail-fast.
    pub fn validate<A>(chain: &[Block], admission: &A) -> bool
    where
        A: AdmissionCheck + ?Sized,
    {
        Self::check_chain(chain, admission).is_ok()
    }

    /// Replace the local chain with `candidate` iff it is strictly longer and
    /// valid. Returns whether the replacement happened.
    pub fn replace<A>(&mut self, candidate: Vec<Block>, admission: &A) -> bool
    where
        A: AdmissionCheck + ?Sized,
    {
        if candidate.len() <= self.blocks.len() {
            return false;
        }
        if !Self::validate(&candidate, admission) {
            return false;
        }
        self.blocks = candidate;
        true
    }
}

fn check_genesis(block: &Block) -> Result<(), LinkageFault> {
    if block.index != 0 {
        return Err(LinkageFault::Index {
            expected: 0,
            found: block.index,
        });
    }
    if !block.previous_hash.is_zero() {
        return Err(LinkageFault::Genesis(
            "previous hash is not the sentinel".into(),
        ));
    }
    if block.work_task.is_some() || block.work_solution.is_some() {
        return Err(LinkageFault::Genesis("genesis carries work".into()));
    }
    check_digest(block)
}

fn check_link(previous: &Block, block: &Block) -> Result<(), LinkageFault> {
    if block.previous_hash != previous.hash {
        return Err(LinkageFault::PreviousHash {
            expected: previous.hash,
            found: block.previous_hash,
        });
    }
    let expected_index = previous.index.saturating_add(1);
    if block.index != expected_index {
        return Err(LinkageFault::Index {
            expected: expected_index,
            found: block.index,
        });
    }
    check_digest(block)
}

fn check_digest(block: &Block) -> Result<(), LinkageFault> {
    let computed = block.compute_hash();
    if computed != block.hash {
        return Err(LinkageFault::Hash {
            stored: block.hash,
            computed,
        });
    }
    Ok(())
}
