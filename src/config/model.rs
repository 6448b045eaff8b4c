//! Settings model.

use crate::lock::DEFAULT_LOCK_PATH;
use crate::process::DEFAULT_PUPPET;
use crate::validator::DEFAULT_TIMEOUT;
use serde::Deserialize;
use std::path::PathBuf;

/// Settings for one run.
///
/// This struct represents the optional settings file, e.g.
/// `/etc/puppetlabs/puppet-cron.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the run lock (default: `/var/run/puppet-cron.lock`).
    pub lock_path: PathBuf,

    /// Puppet executable used for `puppet config` and the agent run.
    pub puppet: PathBuf,

    /// Environment written when the configured one is missing or gone.
    pub fallback_environment: String,

    /// Minutes to wait before writing the fallback environment.
    pub env_reset_delay_minutes: u64,

    /// Timeout for the environment check request, in seconds.
    pub timeout_seconds: u64,

    /// Agent arguments. Empty means `agent --no-daemonize --onetime`.
    pub agent_args: Vec<String>,

    /// Verbose logging.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
            puppet: PathBuf::from(DEFAULT_PUPPET),
            fallback_environment: "production".to_string(),
            env_reset_delay_minutes: 0,
            timeout_seconds: DEFAULT_TIMEOUT.as_secs(),
            agent_args: Vec::new(),
            debug: false,
        }
    }
}
