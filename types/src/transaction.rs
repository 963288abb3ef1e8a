//! Transactions carried by blocks.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, TypesError};

/// A value transfer awaiting (or included in) a block.
///
/// The ledger treats transactions as opaque: only their presence and order
/// inside a block feed into chain integrity. Signature checks and balance
/// rules belong to the wallet layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: Timestamp,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            timestamp,
        }
    }

    /// Shape checks applied when a transaction enters the pending pool.
    pub fn check_well_formed(&self) -> Result<(), TypesError> {
        if self.sender.trim().is_empty() {
            return Err(TypesError::InvalidTransaction("empty sender".into()));
        }
        if self.recipient.trim().is_empty() {
            return Err(TypesError::InvalidTransaction("empty recipient".into()));
        }
        if !self.amount.is_finite() {
            return Err(TypesError::InvalidTransaction(format!(
                "amount {} is not finite",
                self.amount
            )));
        }
        if self.amount < 0.0 {
            return Err(TypesError::InvalidTransaction(format!(
                "amount {} is negative",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64) -> Transaction {
        Transaction::new("alice", "bob", amount, Timestamp::new(10))
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(tx(0.0).check_well_formed().is_ok());
    }

    #[test]
    fn negative_and_nan_amounts_rejected() {
        assert!(tx(-1.0).check_well_formed().is_err());
        assert!(tx(f64::NAN).check_well_formed().is_err());
        assert!(tx(f64::INFINITY).check_well_formed().is_err());
    }

    #[test]
    fn blank_identities_rejected() {
        let t = Transaction::new(" ", "bob", 1.0, Timestamp::new(1));
        assert!(t.check_well_formed().is_err());
        let t = Transaction::new("alice", "", 1.0, Timestamp::new(1));
        assert!(t.check_well_formed().is_err());
    }

    #[test]
    fn timestamp_serialises_as_integer() {
        let json = serde_json::to_value(tx(2.5)).unwrap();
        assert_eq!(json["timestamp"], 10);
        assert_eq!(json["amount"], 2.5);
    }
}
