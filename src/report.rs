//! Human-facing status output. Everything here goes to stderr so stdout stays machine readable.

use std::{
    fmt::Display,
    io::{IsTerminal, stderr},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::locator::{Failure, Resolution};

#[derive(Clone, Copy, Debug)]
pub struct Reporter {
    color: bool,
    interactive: bool,
}

impl Reporter {
    pub fn from_env() -> Self {
        let interactive = stderr().is_terminal();
        let color = interactive && std::env::var_os("NO_COLOR").is_none();
        Reporter { color, interactive }
    }

    pub fn ok(&self, msg: impl Display) {
        if self.color {
            eprintln!("{} {msg}", "✓".green().bold());
        } else {
            eprintln!("✓ {msg}");
        }
    }

    pub fn fail(&self, msg: impl Display) {
        if self.color {
            eprintln!("{} {msg}", "✗".red().bold());
        } else {
            eprintln!("✗ {msg}");
        }
    }

    pub fn warn(&self, msg: impl Display) {
        if self.color {
            eprintln!("{} {msg}", "!".yellow().bold());
        } else {
            eprintln!("! {msg}");
        }
    }

    pub fn detail(&self, msg: impl Display) {
        if self.color {
            eprintln!("  {}", msg.dimmed());
        } else {
            eprintln!("  {msg}");
        }
    }

    /// A spinner on stderr while a slow call runs. Hidden when stderr is not a terminal.
    pub fn spinner(&self, msg: impl Into<String>) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg.into());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print every probe attempt followed by the `✓ n ✗ m` tally.
    pub fn resolution(&self, resolution: &Resolution) {
        for attempt in &resolution.attempts {
            match &attempt.failure {
                None => self.ok(format!("database id {}", attempt.candidate)),
                Some(Failure::Rejected) => {
                    self.fail(format!("database id {} not found", attempt.candidate))
                }
                Some(Failure::Error(e)) => {
                    self.fail(format!("database id {}", attempt.candidate));
                    self.detail(e);
                }
            }
        }
        let failed = resolution.failures();
        let succeeded = resolution.attempts.len() - failed;
        self.summary(succeeded, failed);
    }

    pub fn summary(&self, succeeded: usize, failed: usize) {
        if self.color {
            eprintln!(
                "{} {}",
                format!("✓ {succeeded}").green(),
                format!("✗ {failed}").red()
            );
        } else {
            eprintln!("✓ {succeeded} ✗ {failed}");
        }
    }
}
