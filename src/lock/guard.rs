//! Handle for the held run lock.

use crate::error::Result;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The held run lock.
///
/// Keeps the locked file open. There is deliberately no release method and no
/// `Drop` logic: the lock goes away when the file is closed, which happens when
/// this process (or the agent that replaces it) exits.
#[derive(Debug)]
pub struct RunLock {
    /// The open, locked lock file.
    file: File,

    /// Path to the lock file.
    path: PathBuf,

    /// PID written into the lock file.
    pid: u32,
}

impl RunLock {
    pub(super) fn new(file: File, path: PathBuf, pid: u32) -> Self {
        Self { file, path, pid }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID recorded in the lock file.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Let the lock descriptor survive `exec`.
    ///
    /// Files are opened close-on-exec, which would drop the lock at the moment
    /// the agent takes over. Clearing the flag hands the lock to the agent.
    #[cfg(unix)]
    pub fn keep_across_exec(&self) -> Result<()> {
        use crate::error::CronError;
        use nix::fcntl::{FcntlArg, FdFlag, fcntl};
        use std::os::fd::AsRawFd;

        let fd = self.file.as_raw_fd();
        let to_lock_err = |e: nix::Error| {
            CronError::LockIo(format!(
                "failed to clear close-on-exec on '{}': {}",
                self.path.display(),
                e
            ))
        };

        let bits = fcntl(fd, FcntlArg::F_GETFD).map_err(to_lock_err)?;
        let mut flags = FdFlag::from_bits_truncate(bits);
        flags.remove(FdFlag::FD_CLOEXEC);
        fcntl(fd, FcntlArg::F_SETFD(flags)).map_err(to_lock_err)?;
        Ok(())
    }

    /// On platforms without `exec` the agent runs as a child and this process
    /// keeps the lock until the child exits.
    #[cfg(not(unix))]
    pub fn keep_across_exec(&self) -> Result<()> {
        Ok(())
    }

    #[cfg(all(test, unix))]
    pub(super) fn file(&self) -> &File {
        &self.file
    }
}
