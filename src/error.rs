//! Error types for puppet-cron.
//!
//! Uses thiserror for derive macros. Every variant is fatal: the run stops and
//! the process exits with the variant's exit code. Retrying is left to cron.
//! An inconclusive environment check is not an error; see
//! [`crate::validator::Validation::Indeterminate`].

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for puppet-cron.
#[derive(Error, Debug)]
pub enum CronError {
    /// The settings file or a command-line value is invalid.
    #[error("{0}")]
    Settings(String),

    /// Another instance holds the run lock.
    #[error("puppet-cron is already running{}", holder_suffix(.holder, .path))]
    LockHeld {
        path: PathBuf,
        holder: Option<u32>,
    },

    /// The lock file could not be created, opened, locked or written.
    #[error("Lock file error: {0}")]
    LockIo(String),

    /// The node's certificate, private key or CA bundle is missing or malformed.
    #[error("Failed to load node identity: {0}")]
    IdentityLoad(String),

    /// `puppet config` failed to read or write a value.
    #[error("Agent configuration access failed: {0}")]
    ConfigAccess(String),

    /// The agent executable could not be launched.
    #[error("Failed to execute {program}: {source}")]
    Exec {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn holder_suffix(holder: &Option<u32>, path: &std::path::Path) -> String {
    match holder {
        Some(pid) => format!(" with pid {} ({})", pid, path.display()),
        None => format!(" (could not read pid from {})", path.display()),
    }
}

impl CronError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CronError::Settings(_) => exit_codes::SETTINGS_ERROR,
            CronError::LockHeld { .. } => exit_codes::LOCK_HELD,
            CronError::LockIo(_) => exit_codes::LOCK_IO_FAILURE,
            CronError::IdentityLoad(_) => exit_codes::IDENTITY_FAILURE,
            CronError::ConfigAccess(_) => exit_codes::CONFIG_ACCESS_FAILURE,
            CronError::Exec { .. } => exit_codes::EXEC_FAILURE,
        }
    }
}

/// Result type alias for puppet-cron operations.
pub type Result<T> = std::result::Result<T, CronError>;
