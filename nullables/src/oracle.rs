//! Nullable work oracle with scripted verdicts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use poaw_types::WorkPayload;
use poaw_work::{WorkError, WorkOracle};

/// What `verify` answers once the script is exhausted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    Fail(String),
}

/// A test oracle.
///
/// Tasks are `task-<n>`, solutions are `solution:<task>`. `verify` pops the
/// next scripted verdict, falling back to the default verdict. Every call is
/// counted.
pub struct NullOracle {
    default_verdict: Mutex<Verdict>,
    script: Mutex<VecDeque<Verdict>>,
    solve_delay: Mutex<Option<Duration>>,
    proposed: AtomicUsize,
    solved: AtomicUsize,
    verified: AtomicUsize,
}

impl NullOracle {
    pub fn new(default_verdict: Verdict) -> Self {
        Self {
            default_verdict: Mutex::new(default_verdict),
            script: Mutex::new(VecDeque::new()),
            solve_delay: Mutex::new(None),
            proposed: AtomicUsize::new(0),
            solved: AtomicUsize::new(0),
            verified: AtomicUsize::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::new(Verdict::Accept)
    }

    pub fn rejecting() -> Self {
        Self::new(Verdict::Reject)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Verdict::Fail(message.into()))
    }

    /// Queue verdicts answered before the default applies again.
    pub fn script(&self, verdicts: impl IntoIterator<Item = Verdict>) {
        self.script.lock().unwrap().extend(verdicts);
    }

    pub fn set_default(&self, verdict: Verdict) {
        *self.default_verdict.lock().unwrap() = verdict;
    }

    /// Make `solve` block the calling thread for `delay`.
    pub fn set_solve_delay(&self, delay: Duration) {
        *self.solve_delay.lock().unwrap() = Some(delay);
    }

    pub fn propose_calls(&self) -> usize {
        self.proposed.load(Ordering::SeqCst)
    }

    pub fn solve_calls(&self) -> usize {
        self.solved.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verified.load(Ordering::SeqCst)
    }

    fn next_verdict(&self) -> Verdict {
        match self.script.lock().unwrap().pop_front() {
            Some(v) => v,
            None => self.default_verdict.lock().unwrap().clone(),
        }
    }
}

impl Default for NullOracle {
    fn default() -> Self {
        Self::accepting()
    }
}

impl WorkOracle for NullOracle {
    fn name(&self) -> &str {
        "null"
    }

    fn propose_task(&self) -> Result<WorkPayload, WorkError> {
        let n = self.proposed.fetch_add(1, Ordering::SeqCst);
        Ok(WorkPayload::new(format!("task-{n}").into_bytes()))
    }

    fn solve(&self, task: &WorkPayload) -> Result<WorkPayload, WorkError> {
        self.solved.fetch_add(1, Ordering::SeqCst);
        let delay = *self.solve_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut solution = b"solution:".to_vec();
        solution.extend_from_slice(task.as_bytes());
        Ok(WorkPayload::new(solution))
    }

    fn verify(&self, _task: &WorkPayload, _solution: &WorkPayload) -> Result<bool, WorkError> {
        self.verified.fetch_add(1, Ordering::SeqCst);
        match self.next_verdict() {
            Verdict::Accept => Ok(true),
            Verdict::Reject => Ok(false),
            Verdict::Fail(msg) => Err(WorkError::Unavailable(msg)),
        }
    }
}
