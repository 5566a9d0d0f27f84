//! Formatting utilities

use chrono::{DateTime, Local};

/// Format whole seconds as a `mm:ss` clock
///
/// Minutes keep growing past two digits rather than rolling into hours.
pub fn clock(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}", minutes, secs)
}

/// Format a duration in human-readable form
pub fn duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let mins = seconds / 60;
        let secs = seconds % 60;
        if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m {}s", mins, secs)
        }
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

/// Format a timestamp as HH:MM
pub fn time(dt: DateTime<Local>) -> String {
    dt.format("%H:%M").to_string()
}
