//! Terminal output for the `xtui` binary: a spinner while jobs run and
//! coloured status lines once they finish.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use xtui::control::{JobFlag, SecFlag, StateSnapshot};
use xtui::runner::RunOutcome;

/// Marker shown in front of a job's status line.
pub fn status_symbol(flags: JobFlag) -> &'static str {
    if flags.contains(JobFlag::COMPLETED) {
        "✓"
    } else if flags.contains(JobFlag::TIMED_OUT) {
        "⏱"
    } else if flags.contains(JobFlag::FAILED) {
        "✗"
    } else if flags.contains(JobFlag::RETRYING) {
        "↻"
    } else {
        "…"
    }
}

/// Spinner and colour palette for a batch of jobs.
pub struct JobProgress {
    // Spinner shown while jobs run.
    pb: ProgressBar,
    // Completed jobs.
    green: Style,
    // Failed or timed-out jobs.
    red: Style,
    // Anything not yet terminal.
    yellow: Style,
    // Outcome details.
    dim: Style,
}

impl JobProgress {
    /// Starts a ticking spinner for `total` jobs.
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("running 0/{total} jobs"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Updates the spinner message with the finished count.
    pub fn update(&self, done: usize, total: usize) {
        self.pb.set_message(format!("running {done}/{total} jobs"));
    }

    fn style_for(&self, flags: JobFlag) -> &Style {
        if flags.contains(JobFlag::COMPLETED) {
            &self.green
        } else if flags.intersects(JobFlag::FAILED | JobFlag::TIMED_OUT) {
            &self.red
        } else {
            &self.yellow
        }
    }

    /// Prints one line per finished job above the spinner.
    pub fn report(&self, snapshot: &StateSnapshot, flags: JobFlag, outcome: &RunOutcome) {
        let style = self.style_for(flags);
        self.pb.println(format!(
            "  {} {} {} {}",
            style.apply_to(status_symbol(flags)),
            snapshot.job_id,
            style.apply_to(&snapshot.state),
            self.dim.apply_to(format!("{outcome:?}")),
        ));
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Prints the snapshot as pretty JSON.
    pub fn print_snapshot(&self, snapshot: &StateSnapshot) -> serde_json::Result<()> {
        println!("{}", snapshot_json(snapshot)?);
        Ok(())
    }
}

/// Pretty JSON for one snapshot.
pub fn snapshot_json(snapshot: &StateSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// One-line summary of security flags for the `flags` command.
pub fn security_line(flags: SecFlag, hex: &str) -> String {
    let style = if flags.is_empty() {
        Style::new().dim()
    } else {
        Style::new().cyan().bold()
    };
    format!("{} {}", style.apply_to(flags), Style::new().dim().apply_to(hex))
}
