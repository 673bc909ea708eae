//! Async executor that drives a [`JobState`] through its lifecycle.
//!
//! The runner owns no state of its own: everything it decides is written to
//! the shared `JobState`, so observers on other tasks see the same flags the
//! runner acts on. A cancellation request is honoured between attempts.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::control::JobState;
use crate::error::JobError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries before marking a job as failed.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
        }
    }
}

impl RetryConfig {
    /// Delay before retry `attempt`: `base_delay_ms * 2^(attempt - 1)`, saturating.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// How a run ended. `attempts` counts attempts actually started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed { attempts: u32 },
    Failed { attempts: u32, reason: String },
    TimedOut { attempts: u32 },
    Cancelled { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct JobRunner {
    pub retry: RetryConfig,
    /// Upper bound for a single attempt; exceeding it times the job out.
    pub attempt_timeout: Duration,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

impl JobRunner {
    pub fn new(retry: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            retry,
            attempt_timeout,
        }
    }

    /// Runs `attempt` until it succeeds, exhausts its retries, times out, or
    /// the job is cancelled.
    ///
    /// `attempt` receives the 1-based attempt number. A
    /// [`JobError::TerminalStateViolation`] means another party finished the
    /// job while this runner was driving it.
    pub async fn run<F, Fut>(&self, state: &JobState, mut attempt: F) -> Result<RunOutcome, JobError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<(), String>>,
    {
        let mut attempts = 0;
        loop {
            if state.is_cancel_requested() {
                state.fail()?;
                info!(attempts, "job cancelled");
                return Ok(RunOutcome::Cancelled { attempts });
            }

            state.start()?;
            attempts += 1;

            match timeout(self.attempt_timeout, attempt(attempts)).await {
                Ok(Ok(())) => {
                    state.complete()?;
                    info!(attempts, "job completed");
                    return Ok(RunOutcome::Completed { attempts });
                }
                Ok(Err(reason)) if attempts > self.retry.max_retries => {
                    state.fail()?;
                    warn!(attempts, %reason, "job failed, retries exhausted");
                    return Ok(RunOutcome::Failed { attempts, reason });
                }
                Ok(Err(reason)) => {
                    state.retry()?;
                    let delay = self.retry.delay_for_attempt(attempts);
                    warn!(attempts, %reason, delay_ms = delay, "job attempt failed, retrying");
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(_) => {
                    state.timeout()?;
                    warn!(attempts, timeout = ?self.attempt_timeout, "job timed out");
                    return Ok(RunOutcome::TimedOut { attempts });
                }
            }
        }
    }
}
