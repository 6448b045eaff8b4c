//! Lock acquisition.

use super::guard::RunLock;
use super::note::{HolderNote, parse_holder};
use crate::error::{CronError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;

/// Acquire the run lock at `lock_path` without blocking.
///
/// The parent directory and the file are created if missing. The file is
/// opened with mode 0600 so an unprivileged user can't pre-create it and lock
/// root out.
///
/// # Returns
///
/// * `Ok(RunLock)` - The lock is held for the rest of the process lifetime
/// * `Err(CronError::LockHeld)` - Another process holds it (exit code 4)
/// * `Err(CronError::LockIo)` - Any other failure (exit code 5)
pub fn acquire(lock_path: &Path) -> Result<RunLock> {
    if let Some(parent) = lock_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        create_lock_dir(parent)?;
    }

    let mut file = open_lock_file(lock_path)?;

    match file.try_lock_exclusive() {
        Ok(()) => {}
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
            return Err(CronError::LockHeld {
                path: lock_path.to_path_buf(),
                holder: first_line_pid(&file),
            });
        }
        Err(e) => {
            return Err(CronError::LockIo(format!(
                "failed to lock '{}': {}",
                lock_path.display(),
                e
            )));
        }
    }

    let note = HolderNote::current();
    write_note(&mut file, &note).map_err(|e| {
        CronError::LockIo(format!(
            "failed to write lock file '{}': {}",
            lock_path.display(),
            e
        ))
    })?;

    tracing::debug!(path = %lock_path.display(), pid = note.pid, "acquired run lock");

    Ok(RunLock::new(file, lock_path.to_path_buf(), note.pid))
}

fn create_lock_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(dir).map_err(|e| {
        CronError::LockIo(format!(
            "failed to create lock directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    // Don't truncate: the current holder's PID must stay readable until we own the lock.
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(lock_path).map_err(|e| {
        CronError::LockIo(format!(
            "failed to open lock file '{}': {}",
            lock_path.display(),
            e
        ))
    })
}

fn first_line_pid(file: &File) -> Option<u32> {
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).ok()?;
    parse_holder(&line)
}

fn write_note(file: &mut File, note: &HolderNote) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(note.to_string().as_bytes())?;
    file.sync_all()
}
