//! breathe-core - Shared functionality for the breathe tools
//!
//! Standard paths, the global configuration file and display formatting.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{Config, Defaults};
pub use paths::Paths;
