//! Breath cycle state machine
//!
//! The engine holds the single authoritative `SessionState` of a run and is
//! mutated only through `start`, `on_tick` and `stop`. It knows nothing about
//! wall-clock time: something else (see `driver`) calls `on_tick` once per
//! second while the run is active.
//!
//! Counting: `seconds_into_phase` counts up from 0. An N-second phase is
//! complete on the tick that brings it to N; that tick also counts toward the
//! elapsed total. A run ends only when an exhale completes with at least
//! `training_minutes * 60` seconds elapsed.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::params::BreathParams;
use crate::session::{Phase, SessionState, Status};
use crate::store::SettingsStore;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid settings: {field} must be greater than zero")]
    InvalidParams { field: &'static str },

    #[error("Timer driver has shut down")]
    DriverClosed,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed
    Ignored,
    /// One more second of the current phase
    Advanced,
    /// The previous phase completed and this one began
    Switched(Phase),
    /// The final exhale completed; carries the session summary
    Finished { total_elapsed_seconds: u64 },
}

/// Point-in-time copy of the engine, handed to renderers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Settings of the current (or last) run
    pub params: Option<BreathParams>,
    pub state: SessionState,
}

impl Snapshot {
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Seconds left in the current phase
    pub fn countdown(&self) -> u32 {
        match self.params {
            Some(params) => self.state.countdown(params.duration_of(self.state.phase)),
            None => 0,
        }
    }
}

/// The breath-pacing state machine
pub struct BreathCycleEngine {
    settings: SettingsStore,
    params: Option<BreathParams>,
    state: SessionState,
}

impl BreathCycleEngine {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            settings,
            params: None,
            state: SessionState::default(),
        }
    }

    /// Settings to pre-fill the form with: saved ones, else `fallback`
    pub fn initial_params(&self, fallback: BreathParams) -> BreathParams {
        self.settings.load().unwrap_or(fallback)
    }

    pub fn params(&self) -> Option<BreathParams> {
        self.params
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            params: self.params,
            state: self.state,
        }
    }

    /// Begin a new run, discarding any current one
    ///
    /// Invalid params leave the engine untouched.
    pub fn start(&mut self, params: BreathParams) -> Result<(), EngineError> {
        params.validate()?;

        if self.state.running {
            info!(
                elapsed = self.state.total_elapsed_seconds,
                "Restarting: previous run discarded"
            );
        }

        self.params = Some(params);
        self.state = SessionState::started();
        self.settings.save(&params);

        info!(
            inhale = params.inhale_seconds,
            exhale = params.exhale_seconds,
            minutes = params.training_minutes,
            "Breathing session started"
        );
        Ok(())
    }

    /// Advance the run by one second
    pub fn on_tick(&mut self) -> TickOutcome {
        let params = match self.params {
            Some(params) if self.state.running => params,
            _ => return TickOutcome::Ignored,
        };

        let state = &mut self.state;
        state.seconds_into_phase += 1;
        state.total_elapsed_seconds += 1;

        if state.seconds_into_phase < params.duration_of(state.phase) {
            return TickOutcome::Advanced;
        }

        if state.phase == Phase::Exhale && state.total_elapsed_seconds >= params.training_seconds() {
            state.running = false;
            state.finished = true;
            info!(
                elapsed = state.total_elapsed_seconds,
                "Breathing session finished"
            );
            return TickOutcome::Finished {
                total_elapsed_seconds: state.total_elapsed_seconds,
            };
        }

        state.phase = state.phase.other();
        state.seconds_into_phase = 0;
        debug!(
            phase = state.phase.as_str(),
            elapsed = state.total_elapsed_seconds,
            "Phase switch"
        );
        TickOutcome::Switched(state.phase)
    }

    /// Abort the current run
    ///
    /// Returns whether a run was actually stopped.
    pub fn stop(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        info!(
            elapsed = self.state.total_elapsed_seconds,
            "Breathing session stopped"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::store::MemoryStore;

    /// Short and long phases, uneven cycles, and a phase longer than the training
    const PARAM_SETS: [BreathParams; 6] = [
        BreathParams { inhale_seconds: 1, exhale_seconds: 1, training_minutes: 1 },
        BreathParams { inhale_seconds: 5, exhale_seconds: 5, training_minutes: 1 },
        BreathParams { inhale_seconds: 3, exhale_seconds: 2, training_minutes: 1 },
        BreathParams { inhale_seconds: 7, exhale_seconds: 3, training_minutes: 2 },
        BreathParams { inhale_seconds: 1, exhale_seconds: 59, training_minutes: 1 },
        BreathParams { inhale_seconds: 61, exhale_seconds: 1, training_minutes: 1 },
    ];

    fn engine() -> BreathCycleEngine {
        BreathCycleEngine::new(SettingsStore::in_memory())
    }

    /// Tick until the run ends, returning the number of ticks taken
    fn run_to_end(engine: &mut BreathCycleEngine, limit: u64) -> u64 {
        for n in 1..=limit {
            if let TickOutcome::Finished { .. } = engine.on_tick() {
                return n;
            }
        }
        panic!("run did not finish within {} ticks", limit);
    }

    #[test]
    fn test_start_resets_state() {
        let mut engine = engine();
        assert_eq!(engine.state().status(), Status::Idle);

        engine.start(BreathParams::new(3, 4, 1)).unwrap();
        let state = engine.state();
        assert!(state.running);
        assert!(!state.finished);
        assert_eq!(state.phase, Phase::Inhale);
        assert_eq!(state.seconds_into_phase, 0);
        assert_eq!(state.total_elapsed_seconds, 0);
        assert_eq!(engine.snapshot().countdown(), 3);
    }

    #[test]
    fn test_invalid_start_leaves_idle() {
        let mut engine = engine();

        let err = engine.start(BreathParams::new(0, 5, 1)).unwrap_err();
        assert_eq!(err, EngineError::InvalidParams { field: "inhale_seconds" });
        assert_eq!(engine.state(), &SessionState::default());
        assert_eq!(engine.state().status(), Status::Idle);
        assert!(engine.params().is_none());
        assert_eq!(engine.on_tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_invalid_restart_keeps_current_run() {
        let mut engine = engine();
        engine.start(BreathParams::new(5, 5, 1)).unwrap();
        engine.on_tick();
        engine.on_tick();
        let before = engine.snapshot();

        assert!(engine.start(BreathParams::new(5, 5, 0)).is_err());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_phases_alternate_and_elapsed_counts_every_tick() {
        for params in PARAM_SETS {
            let mut engine = engine();
            engine.start(params).unwrap();

            let mut last_phase = Phase::Inhale;
            let mut phase_length = 0;
            let mut finished = false;
            for tick in 1..=params.projected_seconds() {
                let before = *engine.state();
                let outcome = engine.on_tick();
                let after = *engine.state();

                assert_eq!(
                    after.total_elapsed_seconds,
                    before.total_elapsed_seconds + 1,
                    "params {:?} tick {}",
                    params,
                    tick
                );
                phase_length += 1;

                match outcome {
                    TickOutcome::Advanced => assert_eq!(after.phase, last_phase),
                    TickOutcome::Switched(phase) => {
                        assert_eq!(phase, last_phase.other());
                        assert_eq!(phase_length, params.duration_of(last_phase));
                        assert_eq!(after.seconds_into_phase, 0);
                        last_phase = phase;
                        phase_length = 0;
                    }
                    TickOutcome::Finished { total_elapsed_seconds } => {
                        assert_eq!(last_phase, Phase::Exhale);
                        assert_eq!(phase_length, params.exhale_seconds);
                        assert_eq!(total_elapsed_seconds, tick);
                        finished = true;
                    }
                    TickOutcome::Ignored => panic!("params {:?} ignored tick {}", params, tick),
                }
            }
            assert!(finished, "params {:?} never finished", params);
        }
    }

    #[test]
    fn test_countdown_runs_from_duration_to_one() {
        let mut engine = engine();
        engine.start(BreathParams::new(3, 2, 1)).unwrap();

        let mut shown = vec![engine.snapshot().countdown()];
        for _ in 0..5 {
            engine.on_tick();
            shown.push(engine.snapshot().countdown());
        }
        assert_eq!(shown, vec![3, 2, 1, 2, 1, 3]);
    }

    #[test]
    fn test_finishes_at_sixty_seconds_on_exhale() {
        let mut engine = engine();
        engine.start(BreathParams::new(5, 5, 1)).unwrap();

        for _ in 0..59 {
            assert_ne!(engine.on_tick(), TickOutcome::Ignored);
            assert!(engine.state().running);
        }
        assert_eq!(engine.state().phase, Phase::Exhale);
        assert_eq!(
            engine.on_tick(),
            TickOutcome::Finished { total_elapsed_seconds: 60 }
        );

        let state = engine.state();
        assert!(!state.running);
        assert!(state.finished);
        assert_eq!(state.status(), Status::Finished);
        assert_eq!(state.total_elapsed_seconds, 60);

        // Further ticks are no-ops
        assert_eq!(engine.on_tick(), TickOutcome::Ignored);
        assert_eq!(engine.state().total_elapsed_seconds, 60);
    }

    #[test]
    fn test_does_not_finish_mid_inhale() {
        let mut engine = engine();
        // 11s cycles: second 60 falls inside the sixth inhale (56..=61)
        engine.start(BreathParams::new(6, 5, 1)).unwrap();

        for _ in 0..60 {
            engine.on_tick();
        }
        assert!(engine.state().running);
        assert_eq!(engine.state().phase, Phase::Inhale);
        assert_eq!(engine.state().seconds_into_phase, 5);

        let ticks = 60 + run_to_end(&mut engine, 100);
        assert_eq!(ticks, 66);
        assert_eq!(engine.state().phase, Phase::Exhale);
    }

    #[test]
    fn test_projection_matches_engine() {
        for params in [
            BreathParams::new(5, 5, 1),
            BreathParams::new(4, 7, 1),
            BreathParams::new(4, 3, 2),
            BreathParams::new(90, 90, 1),
        ] {
            let mut engine = engine();
            engine.start(params).unwrap();
            let ticks = run_to_end(&mut engine, 10_000);
            assert_eq!(ticks, params.projected_seconds(), "params {:?}", params);
            assert_eq!(engine.state().total_elapsed_seconds, ticks);
        }
    }

    #[test]
    fn test_stop_is_immediate_and_final() {
        for params in PARAM_SETS {
            for stop_at in 0..params.projected_seconds() {
                let mut engine = engine();
                engine.start(params).unwrap();
                for _ in 0..stop_at {
                    engine.on_tick();
                }

                assert!(engine.stop(), "params {:?} stop at {}", params, stop_at);
                let stopped = *engine.state();
                assert!(!stopped.running);
                assert!(!stopped.finished);
                assert_eq!(stopped.status(), Status::Idle);
                assert_eq!(stopped.total_elapsed_seconds, stop_at);

                for _ in 0..3 {
                    assert_eq!(engine.on_tick(), TickOutcome::Ignored);
                }
                assert_eq!(*engine.state(), stopped);
                assert!(!engine.stop());
            }
        }
    }

    #[test]
    fn test_restart_begins_from_zero() {
        let mut engine = engine();
        engine.start(BreathParams::new(5, 5, 1)).unwrap();
        for _ in 0..7 {
            engine.on_tick();
        }

        engine.start(BreathParams::new(2, 2, 1)).unwrap();
        assert_eq!(engine.state().total_elapsed_seconds, 0);
        assert_eq!(engine.state().phase, Phase::Inhale);
        assert_eq!(engine.params(), Some(BreathParams::new(2, 2, 1)));
    }

    #[test]
    fn test_start_persists_params() {
        let settings = SettingsStore::new(Arc::new(MemoryStore::new()));
        let mut engine = BreathCycleEngine::new(settings.clone());
        let fallback = BreathParams::default();

        assert_eq!(engine.initial_params(fallback), fallback);

        let params = BreathParams::new(6, 8, 4);
        engine.start(params).unwrap();
        assert_eq!(settings.load(), Some(params));
        assert_eq!(engine.initial_params(fallback), params);

        // Rejected params are never saved
        let _ = engine.start(BreathParams::new(6, 0, 4));
        assert_eq!(settings.load(), Some(params));
    }
}
