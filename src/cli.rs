//! Command-line interface for the `xtui` binary.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Inspect and exercise job and security flag registers.
#[derive(Debug, Parser)]
#[command(name = "xtui", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file.
    #[arg(long, global = true, default_value = xtui::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging for this crate.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Which vocabulary a hex word belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagKind {
    /// Security capability flags.
    Sec,
    /// Job lifecycle flags.
    Job,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a batch of simulated jobs concurrently and print their final state.
    Demo {
        /// Number of jobs to run.
        #[arg(long, default_value_t = 4)]
        jobs: usize,

        /// Request cancellation of the first job while it runs.
        #[arg(long, default_value_t = false)]
        cancel: bool,
    },

    /// Derive security flags from legacy `key=bool` pairs.
    ///
    /// Without pairs, the `[security]` table of the config file is used.
    Flags {
        /// Pairs such as `auth=true` or `validateAndSanitize=1`.
        #[arg(value_parser = parse_pair)]
        pairs: Vec<(String, bool)>,
    },

    /// Render a hex flag word as names.
    Decode {
        /// Vocabulary of the word.
        #[arg(long, value_enum, default_value_t = FlagKind::Sec)]
        kind: FlagKind,

        /// Hex word, e.g. `0x6`.
        hex: String,
    },
}

/// Parses `key=bool`; a bare `key` means `true`.
pub fn parse_pair(s: &str) -> Result<(String, bool), String> {
    let (key, value) = match s.split_once('=') {
        Some((k, v)) => (k.trim(), v.trim()),
        None => (s.trim(), "true"),
    };
    if key.is_empty() {
        return Err(format!("missing key in {s:?}"));
    }
    let on = match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        other => return Err(format!("invalid boolean {other:?} for {key}")),
    };
    Ok((key.to_string(), on))
}

/// Collects parsed pairs into a legacy security map; later keys win.
pub fn pairs_to_map(pairs: &[(String, bool)]) -> HashMap<String, bool> {
    pairs.iter().cloned().collect()
}
