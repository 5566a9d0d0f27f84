//! breathe - Breath-pacing exercise timer
//!
//! "Breathe in. Breathe out. Repeat until the clock says stop."
//!
//! Guides a breathing exercise of alternating inhale and exhale phases:
//! - Configurable inhale and exhale lengths (seconds)
//! - Configurable training length (minutes); a run always ends on an exhale
//! - One tick per second, showing elapsed time and the phase countdown
//! - Last-used settings remembered between runs
//!
//! Commands:
//! - start: Run a session (Ctrl-C stops it)
//! - plan: Show how long a session would take
//! - settings: Show saved settings
//! - reset: Forget saved settings

pub mod driver;
pub mod engine;
pub mod params;
pub mod render;
pub mod session;
pub mod store;

pub use driver::DriverHandle;
pub use engine::{BreathCycleEngine, EngineError, Snapshot, TickOutcome};
pub use params::{BreathParams, BreathParamsPatch};
pub use session::{Phase, SessionState, Status};
pub use store::{FileStore, KeyValueStore, MemoryStore, SettingsStore};
