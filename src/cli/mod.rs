//! CLI argument parsing for puppet-cron.
//!
//! Uses clap derive macros. Every option can also be given through an
//! environment variable, which is handy in crontabs.

use crate::config::Settings;
use crate::error::Result;
use crate::exit_codes::{SETTINGS_ERROR, SUCCESS};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that turns on debug output when set to anything.
pub const DEBUG_ENV: &str = "PUPPET_RUNNER_DEBUG";

/// puppet-cron: run the Puppet agent once, safely, from cron.
///
/// Takes a host-wide lock, makes sure the agent's configured environment
/// still exists on the Puppet server (falling back if it doesn't), then
/// replaces itself with `puppet agent`.
#[derive(Parser, Debug)]
#[command(name = "puppet-cron")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment to fall back to when the configured one is gone.
    #[arg(long = "env", value_name = "NAME", env = "PUPPET_CRON_ENV")]
    pub fallback_environment: Option<String>,

    /// Minutes to wait before falling back to the default environment.
    #[arg(long, value_name = "MINUTES", env = "PUPPET_CRON_ENV_RESET_DELAY")]
    pub env_reset_delay: Option<u64>,

    /// Path of the run lock.
    #[arg(long, value_name = "PATH", env = "PUPPET_CRON_LOCK_PATH")]
    pub lock_path: Option<PathBuf>,

    /// Puppet executable.
    #[arg(long, value_name = "PATH", env = "PUPPET_CRON_PUPPET")]
    pub puppet: Option<PathBuf>,

    /// Timeout for the environment check, in seconds.
    #[arg(long, value_name = "SECONDS", env = "PUPPET_CRON_TIMEOUT")]
    pub timeout: Option<u64>,

    /// YAML settings file.
    #[arg(long, value_name = "PATH", env = "PUPPET_CRON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debugging information (also enabled by PUPPET_RUNNER_DEBUG).
    #[arg(long)]
    pub debug: bool,

    /// Arguments passed to puppet instead of `agent --no-daemonize --onetime`.
    #[arg(
        value_name = "AGENT_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub agent_args: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// A bad command line exits with [`SETTINGS_ERROR`] rather than clap's
    /// own code, which would read as a `puppet config` failure.
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|err| {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err))
        })
    }

    /// Build the effective settings: defaults, then the settings file, then
    /// flags and their environment variables.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(env) = &self.fallback_environment {
            settings.fallback_environment = env.clone();
        }
        if let Some(delay) = self.env_reset_delay {
            settings.env_reset_delay_minutes = delay;
        }
        if let Some(path) = &self.lock_path {
            settings.lock_path = path.clone();
        }
        if let Some(puppet) = &self.puppet {
            settings.puppet = puppet.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_seconds = timeout;
        }
        if !self.agent_args.is_empty() {
            settings.agent_args = self.agent_args.clone();
        }
        settings.debug =
            settings.debug || debug_requested(self.debug, std::env::var_os(DEBUG_ENV));

        settings.validate()?;
        Ok(settings)
    }
}

/// Exit code for a command line clap refused. `--help` and `--version`
/// also end up here and are not failures.
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        SETTINGS_ERROR
    } else {
        SUCCESS
    }
}

/// Debug output is on if the flag is given or the variable is non-empty.
fn debug_requested(flag: bool, env_value: Option<OsString>) -> bool {
    flag || env_value.is_some_and(|v| !v.is_empty())
}
