//! `puppet config` command runner.

use super::ConfigPort;
use crate::error::{CronError, Result};
use crate::process;
use std::path::PathBuf;
use std::process::{Command, Output};

/// [`ConfigPort`] backed by the `puppet config` subcommand.
#[derive(Debug, Clone)]
pub struct PuppetConfig {
    puppet: PathBuf,
}

impl PuppetConfig {
    /// Use the puppet executable at `puppet`.
    pub fn new<P: Into<PathBuf>>(puppet: P) -> Self {
        Self {
            puppet: puppet.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.puppet);
        command.args(args);
        if let Some(path) = process::search_path_with(&self.puppet) {
            command.env("PATH", path);
        }

        let output = command.output().map_err(|e| {
            CronError::ConfigAccess(format!(
                "failed to execute {} {}: {}",
                self.puppet.display(),
                args.join(" "),
                e
            ))
        })?;

        if output.status.success() {
            Ok(stdout_value(&output))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CronError::ConfigAccess(format!(
                "{} {} failed (exit code {}): {}",
                self.puppet.display(),
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )))
        }
    }
}

impl ConfigPort for PuppetConfig {
    fn get(&self, section: &str, key: &str) -> Result<String> {
        self.run(&["config", "print", "--section", section, key])
    }

    fn set(&self, section: &str, key: &str, value: &str) -> Result<()> {
        self.run(&["config", "set", "--section", section, key, value])
            .map(|_| ())
    }
}

/// `puppet config print` ends its output with a line break (CRLF on Windows).
fn stdout_value(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}
