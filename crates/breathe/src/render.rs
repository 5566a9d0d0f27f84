//! Display formatting
//!
//! Turns engine snapshots into the lines shown in the terminal.

use breathe_core::format;

use crate::engine::Snapshot;
use crate::params::BreathParams;
use crate::session::{Phase, Status};

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
pub fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Applies ANSI colors, or nothing
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colors when configured and stdout is a terminal
    pub fn detect(configured: bool) -> Self {
        Self::new(configured && use_colors())
    }

    pub fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", code, text, NC)
        } else {
            text.to_string()
        }
    }

    pub fn ok(&self, text: &str) -> String {
        format!("{} {}", self.paint(GREEN, "[ok]"), text)
    }

    pub fn info(&self, text: &str) -> String {
        format!("{} {}", self.paint(CYAN, "[info]"), text)
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(&format!("{}{}", BOLD, MAGENTA), text)
    }

    pub fn label(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Everything shown while a session is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub status: Status,
    /// Total elapsed time as mm:ss
    pub elapsed: String,
    pub phase: Phase,
    /// Seconds left in the current phase
    pub countdown: u32,
    /// The phase changes on the next tick
    ///
    /// Set on the last second of a phase (countdown 1), not on the first
    /// second as the earlier web version of this timer did.
    pub switching_next: bool,
}

impl Frame {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let countdown = snapshot.countdown();
        Self {
            status: snapshot.status(),
            elapsed: format::clock(snapshot.state.total_elapsed_seconds),
            phase: snapshot.state.phase,
            countdown,
            switching_next: snapshot.state.running && countdown == 1,
        }
    }

    /// Single status line, suitable for redrawing with `\r`
    pub fn line(&self, painter: &Painter) -> String {
        let phase = match self.phase {
            Phase::Inhale => painter.paint(&format!("{}{}", BOLD, CYAN), self.phase.label()),
            Phase::Exhale => painter.paint(&format!("{}{}", BOLD, MAGENTA), self.phase.label()),
        };
        let mut line = format!(
            "{} {}  {} {:>3}",
            painter.label("Elapsed"),
            self.elapsed,
            phase,
            self.countdown
        );
        if self.switching_next {
            line.push_str(&painter.paint(DIM, "  (switching)"));
        }
        line
    }
}

/// One-line description of the configured exercise
pub fn settings_line(params: &BreathParams) -> String {
    format!(
        "inhale {}s, exhale {}s, {} min",
        params.inhale_seconds, params.exhale_seconds, params.training_minutes
    )
}

/// Summary of a finished session
pub fn summary_line(total_elapsed_seconds: u64) -> String {
    format!(
        "Breathing exercise complete, time: {}",
        format::clock(total_elapsed_seconds)
    )
}

/// Closing line for a session that has ended, either way
pub fn closing_line(snapshot: &Snapshot) -> Option<String> {
    match snapshot.status() {
        Status::Finished => Some(summary_line(snapshot.state.total_elapsed_seconds)),
        Status::Idle if snapshot.params.is_some() => Some(format!(
            "Stopped after {}",
            format::clock(snapshot.state.total_elapsed_seconds)
        )),
        _ => None,
    }
}
