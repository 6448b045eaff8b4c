//! Run lock for puppet-cron.
//!
//! Only one puppet-cron (or the agent it hands off to) may run on a host at a
//! time. This is enforced with an exclusive, non-blocking `flock` on a
//! well-known file.
//!
//! # Lock File
//!
//! The file is created on first use with mode 0600 and is never deleted. Its
//! existence means nothing; only the OS-level lock on it matters. The kernel
//! drops the lock when the holding process exits for any reason, so a crashed
//! run never leaves a stale lock behind.
//!
//! # Holder Note
//!
//! After acquiring the lock the file is rewritten with the holder's PID on the
//! first line followed by a short explanation. The PID is only used to make the
//! "already running" message helpful. It is never read back to decide whether
//! the lock is held.
//!
//! # Hand-off
//!
//! The lock descriptor is normally close-on-exec. [`RunLock::keep_across_exec`]
//! clears that flag so the agent that replaces this process keeps holding the
//! lock until it exits.

mod guard;
mod note;
mod operations;


// Re-export public API
pub use guard::RunLock;
pub use operations::acquire;

/// Default location of the run lock.
pub const DEFAULT_LOCK_PATH: &str = "/var/run/puppet-cron.lock";
