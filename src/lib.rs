//! Lock-free job lifecycle and security capability registers.
//!
//! [`bitreg::BitRegister`] is a 32-bit atomic flag word mutated only through
//! compare-and-swap loops. [`control`] layers two vocabularies on top of it:
//! [`control::SecFlag`] for security capabilities and [`control::JobState`],
//! a job state machine whose terminal states reject every further
//! transition.

pub mod bitreg;
pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod runner;

pub use control::{JobFlag, JobState, SecFlag, StateSnapshot, Transition};
pub use error::{FlagParseError, JobError, XtuiError};
