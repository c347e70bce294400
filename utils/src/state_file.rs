//! Crash-safe state file IO.
//!
//! Writes go to a temp file in the destination directory and are renamed
//! into place. When rename-over-existing fails (Windows), the old file is
//! moved to `<name>.bak` first and restored if the second rename fails too.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// fsync the temp file before rename and the parent directory after.
    Durable,
    SkipSync,
}

#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub sync: SyncPolicy,
    /// Create missing parent directories.
    pub create_parents: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: SyncPolicy::Durable,
            create_parents: true,
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Restore `<path>.bak` left behind by an interrupted write.
///
/// Returns `true` when a backup was moved back into place.
pub fn recover_backup(path: &Path) -> bool {
    let backup = path.with_extension("bak");
    if path.exists() || !backup.exists() {
        return false;
    }
    match fs::rename(&backup, path) {
        Ok(()) => {
            warn!(path = %path.display(), "Recovered state file from interrupted write");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), "Failed to recover .bak file: {e}");
            false
        }
    }
}

/// Read a state file, `Ok(None)` if it does not exist.
pub fn read_state_file(path: &Path) -> io::Result<Option<String>> {
    recover_backup(path);
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn write_state_file(path: &Path, bytes: &[u8], options: WriteOptions) -> io::Result<()> {
    let parent = parent_dir(path);
    if options.create_parents {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if options.sync == SyncPolicy::Durable {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup = path.with_extension("bak");
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;

        if let Err(retry) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(retry.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), "Failed to remove .bak after write: {e}");
        }
    }

    if options.sync == SyncPolicy::Durable {
        sync_dir(parent);
    }
    debug!(path = %path.display(), bytes = bytes.len(), "State file written");
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(path = %dir.display(), "Directory sync failed (best-effort): {e}");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
