use std::fmt;

use bitflags::bitflags;
use tracing::debug;

use crate::bitreg::{BitRegister, Vocabulary, write_names};
use crate::error::JobError;

bitflags! {
    /// Lifecycle bits of a job.
    ///
    /// `COMPLETED`, `FAILED` and `TIMED_OUT` are terminal. `CANCEL_REQUESTED`
    /// is advisory and orthogonal to the rest.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JobFlag: u32 {
        const PENDING = 1 << 0;
        const RUNNING = 1 << 1;
        const CANCEL_REQUESTED = 1 << 2;
        const RETRYING = 1 << 3;
        const COMPLETED = 1 << 4;
        const FAILED = 1 << 5;
        const TIMED_OUT = 1 << 6;
    }
}

impl JobFlag {
    pub const TERMINAL: Self = Self::COMPLETED.union(Self::FAILED).union(Self::TIMED_OUT);

    pub fn is_terminal(self) -> bool {
        self.intersects(Self::TERMINAL)
    }
}

impl Default for JobFlag {
    fn default() -> Self {
        Self::empty()
    }
}

impl Vocabulary for JobFlag {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("pending", JobFlag::PENDING),
        ("running", JobFlag::RUNNING),
        ("cancel_requested", JobFlag::CANCEL_REQUESTED),
        ("retrying", JobFlag::RETRYING),
        ("completed", JobFlag::COMPLETED),
        ("failed", JobFlag::FAILED),
        ("timed_out", JobFlag::TIMED_OUT),
    ];
    const SORTED: bool = true;
}

/// Sorted, pipe-joined names (`completed|running`), or `none`.
impl fmt::Display for JobFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(*self, f)
    }
}

/// A guarded lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    Retry,
    Complete,
    Fail,
    Timeout,
}

impl Transition {
    /// `(set, clear)` masks. Every transition is forbidden once terminal.
    const fn masks(self) -> (JobFlag, JobFlag) {
        use JobFlag as J;
        match self {
            Self::Start => (
                J::RUNNING,
                J::TERMINAL.union(J::RUNNING).union(J::PENDING),
            ),
            Self::Retry => (J::RETRYING, J::RUNNING.union(J::PENDING)),
            Self::Complete => (
                J::COMPLETED,
                J::RUNNING
                    .union(J::RETRYING)
                    .union(J::CANCEL_REQUESTED)
                    .union(J::PENDING),
            ),
            Self::Fail => (J::FAILED, J::RUNNING.union(J::RETRYING).union(J::PENDING)),
            Self::Timeout => (
                J::TIMED_OUT,
                J::RUNNING.union(J::RETRYING).union(J::PENDING),
            ),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Start => write!(f, "start"),
            Transition::Retry => write!(f, "retry"),
            Transition::Complete => write!(f, "complete"),
            Transition::Fail => write!(f, "fail"),
            Transition::Timeout => write!(f, "timeout"),
        }
    }
}

/// Lock-free lifecycle state of a single job.
///
/// The default value is a pending job with no bits set. Any number of threads
/// may drive the same state through a shared reference. Once a terminal bit is
/// set, every transition fails with [`JobError::TerminalStateViolation`] and
/// leaves the word untouched.
#[derive(Debug, Default)]
pub struct JobState {
    reg: BitRegister<JobFlag>,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> JobFlag {
        self.reg.load()
    }

    /// Resets the word, bypassing the terminal guard.
    ///
    /// Only for reusing a state nobody else is driving.
    pub fn store(&self, flags: JobFlag) {
        self.reg.store(flags);
    }

    /// Marks the job running. Returns the new flags.
    pub fn start(&self) -> Result<JobFlag, JobError> {
        self.apply(Transition::Start)
    }

    /// Records a cancellation request for the executor to observe.
    ///
    /// Never fails. Returns `false` if the job had already finished, in which
    /// case nothing is recorded.
    pub fn request_cancel(&self) -> bool {
        let landed = self
            .reg
            .transition(JobFlag::TERMINAL, JobFlag::CANCEL_REQUESTED, JobFlag::empty())
            .is_ok();
        debug!(landed, "job cancel requested");
        landed
    }

    pub fn retry(&self) -> Result<JobFlag, JobError> {
        self.apply(Transition::Retry)
    }

    pub fn complete(&self) -> Result<JobFlag, JobError> {
        self.apply(Transition::Complete)
    }

    pub fn fail(&self) -> Result<JobFlag, JobError> {
        self.apply(Transition::Fail)
    }

    pub fn timeout(&self) -> Result<JobFlag, JobError> {
        self.apply(Transition::Timeout)
    }

    pub fn is_terminal(&self) -> bool {
        self.reg.any(JobFlag::TERMINAL)
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.reg.any(JobFlag::CANCEL_REQUESTED)
    }

    // Check and mutate happen in one CAS attempt; a terminal bit written by a
    // racing caller is seen on retry and rejects this transition.
    fn apply(&self, op: Transition) -> Result<JobFlag, JobError> {
        let (set, clear) = op.masks();
        match self.reg.transition(JobFlag::TERMINAL, set, clear) {
            Ok(prev) => {
                let next = prev.difference(clear).union(set);
                debug!(%op, from = %prev, to = %next, "job transition");
                Ok(next)
            }
            Err(state) => {
                debug!(%op, %state, "job transition rejected");
                Err(JobError::TerminalStateViolation { op, state })
            }
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.load(), f)
    }
}
