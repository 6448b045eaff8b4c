//! Advisory text written into the lock file.

use chrono::{DateTime, Utc};
use std::fmt;

/// Diagnostic content written to the lock file by the current holder.
///
/// Only the first line has a fixed format: the holder's PID in decimal.
#[derive(Debug, Clone)]
pub struct HolderNote {
    /// Process ID of the holder.
    pub pid: u32,

    /// When the lock was acquired.
    pub acquired_at: DateTime<Utc>,

    /// Host name of the machine, or `unknown` when it can't be determined.
    pub host: String,
}

impl HolderNote {
    /// Build a note for the current process.
    pub fn current() -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            pid: std::process::id(),
            acquired_at: Utc::now(),
            host,
        }
    }
}

impl fmt::Display for HolderNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.pid)?;
        writeln!(f)?;
        writeln!(
            f,
            "puppet-cron does not delete this file on completion, so the PID above may no"
        )?;
        writeln!(
            f,
            "longer represent a puppet-cron process. puppet-cron uses flock, so the lock is"
        )?;
        writeln!(f, "automatically released on process exit.")?;
        writeln!(
            f,
            "acquired: {} on {}",
            self.acquired_at.to_rfc3339(),
            self.host
        )
    }
}

/// Extract the holder PID from lock file content.
///
/// Returns `None` if the file is empty or the first line is not a PID.
pub fn parse_holder(content: &str) -> Option<u32> {
    content.lines().next()?.trim().parse().ok()
}
