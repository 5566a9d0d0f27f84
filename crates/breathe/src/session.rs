//! Breath session types
//!
//! Handles the core session model: the current phase, the per-phase and
//! total counters, and the derived engine status.

use serde::{Deserialize, Serialize};

/// Half of a breath
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Inhale,
    Exhale,
}

impl Phase {
    /// The phase that follows this one
    pub fn other(&self) -> Self {
        match self {
            Phase::Inhale => Phase::Exhale,
            Phase::Exhale => Phase::Inhale,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::Exhale => "exhale",
        }
    }

    /// Label shown to the user while the phase is active
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe in",
            Phase::Exhale => "Breathe out",
        }
    }
}

/// Engine status derived from a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not running: never started, or stopped by the user
    Idle,
    Inhale,
    Exhale,
    /// Ran to completion; the counters hold the summary
    Finished,
}

/// Live counters of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current phase
    pub phase: Phase,
    /// Seconds completed in the current phase, counting up from 0
    pub seconds_into_phase: u32,
    /// Seconds completed since start
    pub total_elapsed_seconds: u64,
    /// Whether ticks are being processed
    pub running: bool,
    /// Whether the last run ended on its own (not stopped)
    pub finished: bool,
}

impl SessionState {
    /// Fresh state for a run that is about to start
    pub fn started() -> Self {
        Self {
            phase: Phase::Inhale,
            seconds_into_phase: 0,
            total_elapsed_seconds: 0,
            running: true,
            finished: false,
        }
    }

    pub fn status(&self) -> Status {
        if self.running {
            match self.phase {
                Phase::Inhale => Status::Inhale,
                Phase::Exhale => Status::Exhale,
            }
        } else if self.finished {
            Status::Finished
        } else {
            Status::Idle
        }
    }

    /// Seconds left in the current phase of `phase_seconds` length
    pub fn countdown(&self, phase_seconds: u32) -> u32 {
        phase_seconds.saturating_sub(self.seconds_into_phase)
    }
}
