//! Advisory cross-process lock for the bulk resync
//!
//! The lock is a JSON file `{pid, startedAt}` created with an atomic
//! create-if-absent open. A lock older than the staleness window is
//! presumed to belong to a crashed process: it is deleted and re-created.
//! The guard removes the file on drop.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, fs as fs_err};

/// A lock file untouched for this long is treated as crashed and reaped.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockInfo {
    pid: u32,
    started_at: DateTime<Utc>,
}

/// Held for the duration of a bulk resync; released on drop.
pub struct SyncLock {
    path: PathBuf,
}

impl SyncLock {
    /// Try to take the lock. `Ok(None)` means another sync holds a live
    /// lock; a stale lock is reaped and re-acquired.
    pub fn acquire(path: &Path) -> Result<Option<SyncLock>> {
        match Self::create(path) {
            Ok(lock) => Ok(Some(lock)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !is_stale(path) {
                    return Ok(None);
                }
                warn!(lock = %path.display(), "reaping stale sync lock");
                let _ = fs::remove_file(path);
                match Self::create(path) {
                    Ok(lock) => Ok(Some(lock)),
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
                    Err(e) => Err(fs_err::write_failed(path, &e)),
                }
            }
            Err(e) => Err(fs_err::write_failed(path, &e)),
        }
    }

    fn create(path: &Path) -> std::io::Result<SyncLock> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let info = LockInfo {
            pid: std::process::id(),
            started_at: Utc::now(),
        };
        let payload = serde_json::to_string_pretty(&info).unwrap_or_default();
        file.write_all(payload.as_bytes())?;
        Ok(SyncLock {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to release sync lock");
        }
    }
}

/// Whether a live (non-stale) lock file currently exists.
pub fn is_held(path: &Path) -> bool {
    path.exists() && !is_stale(path)
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > STALE_AFTER)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_writes_pid_and_releases_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".agentstudio-marketplace-sync.lock");

        let lock = SyncLock::acquire(&path).unwrap().unwrap();
        let info: LockInfo = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(info.pid, std::process::id());

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_second_acquire_is_contended() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sync.lock");

        let _held = SyncLock::acquire(&path).unwrap().unwrap();
        assert!(SyncLock::acquire(&path).unwrap().is_none());
    }

    #[test]
    fn test_stale_lock_is_reaped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sync.lock");
        fs::write(&path, r#"{"pid": 1, "startedAt": "2020-01-01T00:00:00Z"}"#).unwrap();

        let stale_mtime = SystemTime::now() - (STALE_AFTER + Duration::from_secs(60));
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_times(fs::FileTimes::new().set_modified(stale_mtime))
            .unwrap();

        let lock = SyncLock::acquire(&path).unwrap();
        assert!(lock.is_some());
    }

    #[test]
    fn test_fresh_foreign_lock_is_respected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sync.lock");
        fs::write(&path, r#"{"pid": 1, "startedAt": "2020-01-01T00:00:00Z"}"#).unwrap();

        assert!(SyncLock::acquire(&path).unwrap().is_none());
        // The foreign lock file is left in place.
        assert!(path.exists());
    }
}
