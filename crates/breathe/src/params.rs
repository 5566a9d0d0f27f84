//! Exercise parameters
//!
//! `BreathParams` is the validated, per-run configuration. `BreathParamsPatch`
//! carries user-entered overrides that are merged over saved settings.

use breathe_core::Defaults;
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::session::Phase;

/// Durations for one exercise run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathParams {
    /// Length of each inhale in seconds
    pub inhale_seconds: u32,
    /// Length of each exhale in seconds
    pub exhale_seconds: u32,
    /// Minimum training length in minutes
    pub training_minutes: u32,
}

impl Default for BreathParams {
    fn default() -> Self {
        Self::from(Defaults::default())
    }
}

impl From<Defaults> for BreathParams {
    fn from(defaults: Defaults) -> Self {
        Self {
            inhale_seconds: defaults.inhale_seconds,
            exhale_seconds: defaults.exhale_seconds,
            training_minutes: defaults.training_minutes,
        }
    }
}

impl BreathParams {
    pub fn new(inhale_seconds: u32, exhale_seconds: u32, training_minutes: u32) -> Self {
        Self {
            inhale_seconds,
            exhale_seconds,
            training_minutes,
        }
    }

    /// Reject any non-positive duration
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("inhale_seconds", self.inhale_seconds),
            ("exhale_seconds", self.exhale_seconds),
            ("training_minutes", self.training_minutes),
        ];
        match fields.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(EngineError::InvalidParams { field }),
            None => Ok(()),
        }
    }

    /// Configured length of a phase in seconds
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale_seconds,
            Phase::Exhale => self.exhale_seconds,
        }
    }

    /// Length of one inhale plus one exhale
    pub fn cycle_seconds(&self) -> u64 {
        u64::from(self.inhale_seconds) + u64::from(self.exhale_seconds)
    }

    /// Training length in seconds
    pub fn training_seconds(&self) -> u64 {
        u64::from(self.training_minutes) * 60
    }

    /// Elapsed seconds at which a run of these params finishes
    ///
    /// A run only ends on a completed exhale, so the training length is
    /// rounded up to a whole number of cycles.
    pub fn projected_seconds(&self) -> u64 {
        let cycle = self.cycle_seconds();
        if cycle == 0 {
            return 0;
        }
        self.training_seconds().div_ceil(cycle).max(1) * cycle
    }

    /// Number of full breaths a run will contain
    pub fn projected_cycles(&self) -> u64 {
        match self.cycle_seconds() {
            0 => 0,
            cycle => self.projected_seconds() / cycle,
        }
    }
}

/// Partial settings entered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreathParamsPatch {
    pub inhale_seconds: Option<u32>,
    pub exhale_seconds: Option<u32>,
    pub training_minutes: Option<u32>,
}

impl BreathParamsPatch {
    /// Override the fields of `base` that are set in this patch
    pub fn apply(&self, base: BreathParams) -> BreathParams {
        BreathParams {
            inhale_seconds: self.inhale_seconds.unwrap_or(base.inhale_seconds),
            exhale_seconds: self.exhale_seconds.unwrap_or(base.exhale_seconds),
            training_minutes: self.training_minutes.unwrap_or(base.training_minutes),
        }
    }
}
