//! The work oracle boundary consumed by consensus and mining.

use poaw_types::WorkPayload;

use crate::WorkError;

/// A capability that poses tasks and judges solutions.
///
/// `propose_task` and `solve` may be expensive (training a model, calling a
/// remote service); callers run them off the async runtime and bound them
/// with a timeout. `verify` runs inside the node's chain critical section and
/// must be a local, bounded computation.
///
/// Any numeric tolerance used to compare continuous results is the oracle's
/// own policy; consensus only consumes the boolean verdict.
pub trait WorkOracle: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Pose a fresh task.
    fn propose_task(&self) -> Result<WorkPayload, WorkError>;

    /// Produce a solution for `task`.
    fn solve(&self, task: &WorkPayload) -> Result<WorkPayload, WorkError>;

    /// Judge `solution` against `task`.
    fn verify(&self, task: &WorkPayload, solution: &WorkPayload) -> Result<bool, WorkError>;
}
