//! Hand-off to the agent process.
//!
//! On Unix the launcher `exec`s the agent, replacing its own process image.
//! Cron then sees the agent's exit status directly, and the run lock is
//! released exactly when the agent exits.
//!
//! Targets without `exec` fall back to running the agent as a child and
//! exiting with the child's status. Signals sent to the launcher are not
//! forwarded to the child in that mode.

use crate::error::{CronError, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Default puppet executable.
pub const DEFAULT_PUPPET: &str = "/opt/puppetlabs/bin/puppet";

/// Arguments for a single foreground agent run.
pub const DEFAULT_AGENT_ARGS: [&str; 3] = ["agent", "--no-daemonize", "--onetime"];

/// The agent invocation the launcher hands off to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    /// Executable to run.
    pub program: PathBuf,

    /// Arguments, not including argv[0].
    pub args: Vec<String>,
}

impl AgentCommand {
    /// Build a command, using [`DEFAULT_AGENT_ARGS`] when `args` is empty.
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>) -> Self {
        let args = if args.is_empty() {
            DEFAULT_AGENT_ARGS.iter().map(|s| s.to_string()).collect()
        } else {
            args
        };

        Self {
            program: program.into(),
            args,
        }
    }

    /// Name passed as argv[0].
    pub fn arg0(&self) -> &OsStr {
        self.program
            .file_name()
            .unwrap_or_else(|| self.program.as_os_str())
    }

    /// `$PATH` as the agent will see it.
    pub fn search_path(&self) -> OsString {
        self.search_path_from(std::env::var_os("PATH").as_deref())
    }

    fn search_path_from(&self, current: Option<&OsStr>) -> OsString {
        extend_search_path(current, &self.program)
            .or_else(|| current.map(OsStr::to_os_string))
            .unwrap_or_default()
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(path) = search_path_with(&self.program) {
            command.env("PATH", path);
        }
        command
    }
}

impl fmt::Display for AgentCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arg0().to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Hand control to the agent.
///
/// Only returns if the agent could not be started.
pub fn hand_off(command: &AgentCommand) -> CronError {
    #[cfg(unix)]
    {
        replace(command)
    }

    #[cfg(not(unix))]
    {
        match spawn_and_wait(command) {
            Ok(code) => std::process::exit(code),
            Err(err) => err,
        }
    }
}

/// Replace the current process image with `command`.
///
/// The environment is inherited. `exec` has no success return, so whatever
/// comes back is the reason it failed.
#[cfg(unix)]
pub fn replace(command: &AgentCommand) -> CronError {
    use std::os::unix::process::CommandExt;

    let source = command.to_command().arg0(command.arg0()).exec();
    CronError::Exec {
        program: command.program.clone(),
        source,
    }
}

/// Run `command` as a child, wait for it and return the exit code to pass on.
#[cfg_attr(unix, allow(dead_code))]
pub fn spawn_and_wait(command: &AgentCommand) -> Result<i32> {
    let status = command
        .to_command()
        .status()
        .map_err(|source| CronError::Exec {
            program: command.program.clone(),
            source,
        })?;

    Ok(exit_code_of(status))
}

/// Exit code for a finished child, using the shell's 128+N for signals.
#[cfg_attr(unix, allow(dead_code))]
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// `$PATH` with the directory of `program` appended, if it isn't there yet.
///
/// Cron runs jobs with a minimal `$PATH`; the agent expects its own bin
/// directory to be searchable.
pub fn search_path_with(program: &Path) -> Option<OsString> {
    extend_search_path(std::env::var_os("PATH").as_deref(), program)
}

fn extend_search_path(current: Option<&OsStr>, program: &Path) -> Option<OsString> {
    let dir = program.parent().filter(|d| !d.as_os_str().is_empty())?;

    let mut paths: Vec<PathBuf> = current
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    paths.retain(|p| !p.as_os_str().is_empty());

    if paths.iter().any(|p| p == dir) {
        return None;
    }

    paths.push(dir.to_path_buf());
    std::env::join_paths(paths).ok()
}
