use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobFlag, JobState, SecFlag};
use crate::bitreg::{format_hex, parse_hex};
use crate::error::FlagParseError;

/// Point-in-time view of a job for logs and telemetry.
///
/// Built from a single `load()`, so the rendered names, hex word and booleans
/// always describe the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub job_id: String,
    /// Rendered job flags, e.g. `completed` or `cancel_requested|running`.
    pub state: String,
    pub state_hex: String,
    /// Rendered security flags.
    pub security: String,
    pub cap_mask: String,
    pub terminal: bool,
    pub cancel_requested: bool,
    pub observed_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn capture(job_id: impl Into<String>, state: &JobState, security: SecFlag) -> Self {
        let flags = state.load();
        Self {
            job_id: job_id.into(),
            state: flags.to_string(),
            state_hex: format_hex(flags),
            security: security.to_string(),
            cap_mask: format_hex(security),
            terminal: flags.is_terminal(),
            cancel_requested: flags.contains(JobFlag::CANCEL_REQUESTED),
            observed_at: Utc::now(),
        }
    }

    /// Parses the hex words back into flag values.
    pub fn decode(&self) -> Result<(JobFlag, SecFlag), FlagParseError> {
        Ok((parse_hex(&self.state_hex)?, parse_hex(&self.cap_mask)?))
    }
}
