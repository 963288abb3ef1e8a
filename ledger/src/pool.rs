//! Pending transactions awaiting inclusion in the next block.

use poaw_types::Transaction;

use crate::error::LedgerError;

/// Default cap on the number of pending transactions.
pub const DEFAULT_POOL_LIMIT: usize = 10_000;

/// Ordered buffer of submitted transactions.
///
/// The buffer is drained as a whole when a block that consumed it has been
/// appended; a failed block proposal leaves it untouched.
#[derive(Clone, Debug)]
pub struct PendingPool {
    transactions: Vec<Transaction>,
    limit: usize,
}

impl Default for PendingPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_LIMIT)
    }
}

impl PendingPool {
    pub fn new(limit: usize) -> Self {
        Self {
            transactions: Vec::new(),
            limit,
        }
    }

    /// Queue a transaction. Fails once the pool holds `limit` entries.
    pub fn push(&mut self, tx: Transaction) -> Result<usize, LedgerError> {
        if self.transactions.len() >= self.limit {
            return Err(LedgerError::PoolFull(self.limit));
        }
        self.transactions.push(tx);
        Ok(self.transactions.len())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Copy of the current contents, in submission order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Reset to an empty buffer.
    pub fn clear(&mut self) {
        self.transactions = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poaw_types::Timestamp;

    fn tx(n: u64) -> Transaction {
        Transaction::new("alice", "bob", n as f64, Timestamp::new(n))
    }

    #[test]
    fn push_keeps_submission_order() {
        let mut pool = PendingPool::default();
        for n in 0..5 {
            pool.push(tx(n)).unwrap();
        }
        let amounts: Vec<f64> = pool.transactions().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn push_rejects_when_full() {
        let mut pool = PendingPool::new(2);
        pool.push(tx(1)).unwrap();
        pool.push(tx(2)).unwrap();
        assert!(matches!(pool.push(tx(3)), Err(LedgerError::PoolFull(2))));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn snapshot_is_detached_from_pool() {
        let mut pool = PendingPool::default();
        pool.push(tx(1)).unwrap();
        let snap = pool.snapshot();
        pool.clear();
        assert_eq!(snap.len(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn clear_allows_refill() {
        let mut pool = PendingPool::new(1);
        pool.push(tx(1)).unwrap();
        pool.clear();
        assert_eq!(pool.push(tx(2)).unwrap(), 1);
    }
}
