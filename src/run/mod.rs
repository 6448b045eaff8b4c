//! The guarded run: lock, settle the environment, hand off to the agent.
//!
//! ```text
//! Start -> LockAcquired -> EnvironmentRead -> EnvironmentConfirmedValid -> Launched
//!                                          \-> EnvironmentReset ---------/
//! ```
//!
//! [`Orchestrator::prepare`] walks every state up to the hand-off and returns a
//! [`Prepared`] run that still owns the lock. [`Prepared::launch`] is the
//! terminal transition.

mod check;


pub use check::{EnvironmentCheck, RemoteCheck};

use crate::error::{CronError, Result};
use crate::lock::{self, RunLock};
use crate::process::{self, AgentCommand};
use crate::puppet::{ConfigPort, ENVIRONMENT};
use crate::validator::Validation;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path of the run lock.
    pub lock_path: PathBuf,

    /// Environment written when the configured one is missing or gone.
    pub fallback_environment: String,

    /// Wait before writing the fallback.
    pub reset_delay: Duration,

    /// What to hand off to.
    pub command: AgentCommand,
}

/// How the environment was settled before the hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentState {
    /// The configured environment was kept.
    Confirmed(String),
    /// The configured environment was replaced with the fallback.
    Reset { from: String, to: String },
}

/// A run that holds the lock and is ready to hand off.
#[derive(Debug)]
pub struct Prepared {
    lock: RunLock,
    command: AgentCommand,
    environment: EnvironmentState,
}

impl Prepared {
    pub fn lock(&self) -> &RunLock {
        &self.lock
    }

    pub fn command(&self) -> &AgentCommand {
        &self.command
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.environment
    }

    /// Replace this process with the agent.
    ///
    /// The lock is handed to the agent and released when it exits. Only
    /// returns if the hand-off failed.
    pub fn launch(self) -> CronError {
        let Prepared { lock, command, .. } = self;

        if let Err(err) = lock.keep_across_exec() {
            return err;
        }

        tracing::debug!(
            "Current value of $PATH: {}",
            command.search_path().to_string_lossy()
        );
        tracing::info!("Running '{}'", command);

        let err = process::hand_off(&command);
        drop(lock);
        err
    }
}

/// Sequences one guarded run.
pub struct Orchestrator<'a> {
    options: &'a RunOptions,
    config: &'a dyn ConfigPort,
    check: &'a dyn EnvironmentCheck,
    sleep: Box<dyn Fn(Duration) + 'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        options: &'a RunOptions,
        config: &'a dyn ConfigPort,
        check: &'a dyn EnvironmentCheck,
    ) -> Self {
        Self {
            options,
            config,
            check,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace how the reset delay is waited out.
    pub fn with_sleep<F: Fn(Duration) + 'a>(mut self, sleep: F) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Take the lock and make sure the configured environment is usable.
    ///
    /// Nothing touches the agent configuration before the lock is held.
    pub fn prepare(&self) -> Result<Prepared> {
        let lock = lock::acquire(&self.options.lock_path)?;
        tracing::info!(
            pid = lock.pid(),
            path = %lock.path().display(),
            "acquired run lock"
        );

        let current = ENVIRONMENT.read(self.config)?;
        let environment = self.settle_environment(current)?;

        Ok(Prepared {
            lock,
            command: self.options.command.clone(),
            environment,
        })
    }

    fn settle_environment(&self, current: String) -> Result<EnvironmentState> {
        if !current.is_empty() && !self.is_gone(&current)? {
            return Ok(EnvironmentState::Confirmed(current));
        }

        let fallback = &self.options.fallback_environment;
        let delay = self.options.reset_delay;
        if delay.is_zero() {
            tracing::warn!("Environment {:?} is invalid; resetting now", current);
        } else {
            tracing::warn!(
                "Environment {:?} is invalid, resetting in {} minutes",
                current,
                delay.as_secs() / 60
            );
            (self.sleep)(delay);
        }

        ENVIRONMENT.write(self.config, fallback)?;
        tracing::info!("Environment set to {:?}", fallback);

        Ok(EnvironmentState::Reset {
            from: current,
            to: fallback.clone(),
        })
    }

    /// True only when the server confirmed the environment does not exist.
    fn is_gone(&self, environment: &str) -> Result<bool> {
        match self.check.check(self.config, environment)? {
            Validation::Valid => Ok(false),
            Validation::Invalid => Ok(true),
            Validation::Indeterminate(reason) => {
                tracing::warn!(
                    "Could not check environment {:?} ({}). Keeping environment.",
                    environment,
                    reason
                );
                Ok(false)
            }
        }
    }
}
