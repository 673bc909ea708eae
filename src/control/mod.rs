mod job;
mod secflags;
mod snapshot;

pub use job::{JobFlag, JobState, Transition};
pub use secflags::SecFlag;
pub use snapshot::StateSnapshot;
