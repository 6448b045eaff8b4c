//! Settings loading, validation and conversion.

use super::model::Settings;
use crate::error::{CronError, Result};
use crate::process::AgentCommand;
use crate::run::RunOptions;
use std::path::Path;
use std::time::Duration;

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Successfully loaded and validated settings
    /// * `Err(CronError::Settings)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            CronError::Settings(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| CronError::Settings(format!("failed to parse settings YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values.
    ///
    /// Validation rules:
    /// - `lock_path` and `puppet` must be non-empty
    /// - `fallback_environment` must be non-empty
    /// - `timeout_seconds` must be positive
    pub fn validate(&self) -> Result<()> {
        if self.lock_path.as_os_str().is_empty() {
            return Err(invalid("lock_path must not be empty"));
        }

        if self.puppet.as_os_str().is_empty() {
            return Err(invalid("puppet must not be empty"));
        }

        if self.fallback_environment.trim().is_empty() {
            return Err(invalid("fallback_environment must not be empty"));
        }

        if self.timeout_seconds == 0 {
            return Err(invalid("timeout_seconds must be greater than 0"));
        }

        Ok(())
    }

    /// Wait before writing the fallback environment.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs(self.env_reset_delay_minutes.saturating_mul(60))
    }

    /// Timeout for the environment check.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Options for the orchestrator.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            lock_path: self.lock_path.clone(),
            fallback_environment: self.fallback_environment.clone(),
            reset_delay: self.reset_delay(),
            command: AgentCommand::new(&self.puppet, self.agent_args.clone()),
        }
    }
}

fn invalid(reason: &str) -> CronError {
    CronError::Settings(format!("settings validation failed: {}", reason))
}
