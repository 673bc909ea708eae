mod cli;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use cli::{Cli, Command, FlagKind};
use ui::JobProgress;
use xtui::bitreg::{format_hex, parse_hex};
use xtui::config::XtuiConfig;
use xtui::control::{JobFlag, JobState, SecFlag, StateSnapshot};
use xtui::logging::init_tracing;
use xtui::runner::{JobRunner, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = XtuiConfig::load_from(&cli.config)?;
    init_tracing(&config.log_level, cli.verbose);
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Command::Demo { jobs, cancel } => run_demo(&config, jobs, cancel).await,
        Command::Flags { pairs } => {
            let flags = if pairs.is_empty() {
                config.sec_flags()
            } else {
                SecFlag::from_legacy_map(Some(&cli::pairs_to_map(&pairs)))
            };
            println!("{}", ui::security_line(flags, &format_hex(flags)));
            println!("{}", serde_json::to_string(&flags.to_legacy_map())?);
            Ok(())
        }
        Command::Decode { kind, hex } => {
            let rendered = match kind {
                FlagKind::Sec => parse_hex::<SecFlag>(&hex)?.to_string(),
                FlagKind::Job => parse_hex::<JobFlag>(&hex)?.to_string(),
            };
            println!("{rendered}");
            Ok(())
        }
    }
}

// Attempt behaviour per job index: succeed, flake once, always fail, hang.
async fn simulated_attempt(profile: usize, attempt: u32, hang: Duration) -> Result<(), String> {
    match profile % 4 {
        0 => Ok(()),
        1 if attempt < 2 => Err("transient failure".to_string()),
        1 => Ok(()),
        2 => Err("validation failed".to_string()),
        _ => {
            sleep(hang).await;
            Ok(())
        }
    }
}

async fn run_demo(config: &XtuiConfig, jobs: usize, cancel: bool) -> Result<()> {
    let runner = JobRunner::new(config.retry_config(), config.attempt_timeout());
    let security = config.sec_flags();
    let hang = config.attempt_timeout() * 2;
    info!(jobs, %security, "starting demo");

    let states: Vec<(String, Arc<JobState>)> = (0..jobs)
        .map(|_| (Uuid::new_v4().to_string(), Arc::new(JobState::new())))
        .collect();

    let progress = JobProgress::start(jobs);
    let mut set = JoinSet::new();
    for (i, (id, state)) in states.iter().enumerate() {
        let runner = runner.clone();
        let state = Arc::clone(state);
        let id = id.clone();
        // the cancelled job keeps failing so the request is seen between attempts
        let profile = if cancel && i == 0 { 2 } else { i };
        set.spawn(async move {
            let outcome = runner
                .run(&state, |n| simulated_attempt(profile, n, hang))
                .await;
            (id, state, outcome)
        });
    }

    if cancel {
        if let Some((id, state)) = states.first() {
            let landed = state.request_cancel();
            info!(job_id = %id, landed, "cancel requested");
        }
    }

    let mut snapshots = Vec::with_capacity(jobs);
    let mut done = 0;
    while let Some(joined) = set.join_next().await {
        let (id, state, outcome) = joined?;
        let outcome: RunOutcome = outcome?;
        let snapshot = StateSnapshot::capture(id, &state, security);
        done += 1;
        progress.update(done, jobs);
        progress.report(&snapshot, state.load(), &outcome);
        snapshots.push(snapshot);
    }
    progress.finish();

    for snapshot in &snapshots {
        progress.print_snapshot(snapshot)?;
    }
    Ok(())
}
