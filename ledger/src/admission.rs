//! Seam between structural validation and the consensus admission rule.

use std::fmt::Display;

use crate::Block;

/// Decides whether a block's work is admissible.
///
/// Implemented by the consensus engine. Chain validation calls it for every
/// block after genesis, once linkage and digest checks have passed.
pub trait AdmissionCheck {
    type Rejection: Display;

    fn check_admission(&self, block: &Block) -> Result<(), Self::Rejection>;
}

/// Admits everything: validation reduces to linkage and digest checks.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralOnly;

impl AdmissionCheck for StructuralOnly {
    type Rejection = std::convert::Infallible;

    fn check_admission(&self, _block: &Block) -> Result<(), Self::Rejection> {
        Ok(())
    }
}
