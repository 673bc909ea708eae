//! Configuration loaded from `xtui.toml`.
//!
//! Missing fields fall back to defaults. The `XTUI_LOG` environment variable
//! takes precedence over `log_level` from the file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::control::SecFlag;
use crate::error::XtuiError;
use crate::runner::RetryConfig;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "xtui.toml";
/// Environment variable that overrides `log_level`.
pub const LOG_ENV: &str = "XTUI_LOG";

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct XtuiConfig {
    /// `tracing` filter directive, e.g. `info` or `xtui=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Legacy boolean security table. Absent and empty are both valid and
    /// yield no flags.
    #[serde(default)]
    pub security: Option<HashMap<String, bool>>,

    /// Maximum retries before a job is marked failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff between attempts.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single job attempt, in milliseconds. Must be non-zero.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

// Default log directive: "info".
fn default_log_level() -> String {
    "info".to_string()
}

// Default maximum retries: 3.
fn default_max_retries() -> u32 {
    3
}

// Default backoff base: 100ms.
fn default_base_delay_ms() -> u64 {
    100
}

// Default attempt timeout: 2s.
fn default_attempt_timeout_ms() -> u64 {
    2_000
}

impl Default for XtuiConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            security: None,
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

impl XtuiConfig {
    /// Loads `xtui.toml` from the working directory, or defaults if absent.
    pub fn load() -> Result<Self, XtuiError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads the file at `path`, or defaults if it does not exist.
    ///
    /// An unreadable file is an [`XtuiError::Io`], malformed TOML an
    /// [`XtuiError::Toml`], and out-of-range values an [`XtuiError::Config`].
    pub fn load_from(path: &Path) -> Result<Self, XtuiError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<XtuiConfig>(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;

        Ok(config.with_log_override(std::env::var(LOG_ENV).ok()))
    }

    fn validate(&self) -> Result<(), XtuiError> {
        if self.attempt_timeout_ms == 0 {
            return Err(XtuiError::Config(
                "attempt_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    // Environment wins over the file when the value is non-blank.
    fn with_log_override(mut self, value: Option<String>) -> Self {
        if let Some(level) = value.filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        self
    }

    /// Security flags derived from the legacy `[security]` table.
    pub fn sec_flags(&self) -> SecFlag {
        SecFlag::from_legacy_map(self.security.as_ref())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}
