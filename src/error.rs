use thiserror::Error;

use crate::control::{JobFlag, Transition};

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum XtuiError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures surfaced by [`JobState`](crate::control::JobState) transitions.
///
/// Contention inside the register is never reported here; it is retried
/// internally until the transition either lands or hits a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JobError {
    /// A lifecycle transition was attempted after the job finished.
    #[error("cannot {op}: job is in a terminal state ({state})")]
    TerminalStateViolation { op: Transition, state: JobFlag },
}

/// Errors produced when decoding a hex flag word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagParseError {
    #[error("invalid hex mask {0:?}")]
    InvalidHex(String),

    #[error("mask 0x{0:X} carries bits outside the vocabulary")]
    UnknownBits(u32),
}
