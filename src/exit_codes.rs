//! Exit code constants for puppet-cron.
//!
//! These codes are only ever observed when the run fails before the hand-off
//! to the agent. Once the agent has replaced this process, cron sees the
//! agent's own exit status.
//! - 0: Success (only reachable through the agent itself)
//! - 1: Settings error (bad settings file, flags or command line)
//! - 2: Agent configuration could not be read or written
//! - 3: Node identity (certificate, key, CA) could not be loaded
//! - 4: Another run holds the lock
//! - 5: The lock file could not be created, opened or locked
//! - 6: The agent could not be executed

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Settings file, flag values or the command line itself are invalid.
///
/// clap's usage errors are mapped here instead of clap's default of 2.
pub const SETTINGS_ERROR: i32 = 1;

/// Reading or writing the agent configuration failed.
pub const CONFIG_ACCESS_FAILURE: i32 = 2;

/// Client certificate, private key or CA bundle could not be loaded.
pub const IDENTITY_FAILURE: i32 = 3;

/// Another instance is already running.
pub const LOCK_HELD: i32 = 4;

/// Lock file I/O failed for a reason other than contention.
pub const LOCK_IO_FAILURE: i32 = 5;

/// The agent executable could not be launched.
pub const EXEC_FAILURE: i32 = 6;
