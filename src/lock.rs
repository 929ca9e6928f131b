//! Exclusive run lock for a sweep base directory.
//!
//! Two concurrent `run` invocations against one base directory would race on
//! case directories and the summary, so the second one is refused. A lock left
//! behind by a process that no longer exists (killed before `Drop` ran) is
//! reclaimed.
use crate::paths::SweepPaths;
use crate::util::now_epoch_ms;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct LockRecord {
    pid: u32,
    started_at_epoch_ms: u128,
}

/// Held for the duration of a run; the lock file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(paths: &SweepPaths) -> Result<Self> {
        let path = paths.lock_path();
        let mut file = match create_lock_file(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let holder = read_holder(&path);
                match &holder {
                    Some(record) if !process_alive(record.pid) => {
                        tracing::warn!(
                            "reclaiming {} left by exited pid {}",
                            path.display(),
                            record.pid
                        );
                        fs::remove_file(&path)
                            .with_context(|| format!("remove stale lock {}", path.display()))?;
                        create_lock_file(&path)
                            .with_context(|| format!("create lock {}", path.display()))?
                    }
                    _ => {
                        return Err(anyhow!(
                            "another run holds {} ({}); remove it if no run is active",
                            path.display(),
                            describe_holder(holder.as_ref())
                        ));
                    }
                }
            }
            Err(err) => {
                return Err(err).with_context(|| format!("create lock {}", path.display()));
            }
        };
        let lock = Self { path };
        let record = LockRecord {
            pid: std::process::id(),
            started_at_epoch_ms: now_epoch_ms()?,
        };
        let text = serde_json::to_string(&record).context("serialize run lock")?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("write lock {}", lock.path.display()))?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!("failed to remove lock {}: {err}", self.path.display());
        }
    }
}

fn create_lock_file(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn read_holder(path: &Path) -> Option<LockRecord> {
    fs::read(path)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<LockRecord>(&bytes).ok())
}

fn describe_holder(record: Option<&LockRecord>) -> String {
    match record {
        Some(record) => format!("pid {}", record.pid),
        None => "holder unknown".to_string(),
    }
}

/// Whether `pid` names a live process. Unknown answers count as alive.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return true;
    };
    if pid <= 0 {
        return true;
    }
    // SAFETY: signal 0 performs the existence and permission checks only.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_first_is_dropped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let paths = SweepPaths::new(temp.path().to_path_buf());

        let first = RunLock::acquire(&paths).expect("first lock");
        assert!(first.path().is_file());

        let err = RunLock::acquire(&paths).expect_err("second lock");
        let message = err.to_string();
        assert!(message.starts_with("another run holds"));
        assert!(message.contains(&format!("pid {}", std::process::id())));

        drop(first);
        assert!(!paths.lock_path().exists());
        RunLock::acquire(&paths).expect("lock after release");
    }

    #[test]
    fn unreadable_lock_still_blocks() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let paths = SweepPaths::new(temp.path().to_path_buf());
        fs::write(paths.lock_path(), "garbage").expect("write lock");
        let err = RunLock::acquire(&paths).expect_err("stale lock");
        assert!(err.to_string().contains("holder unknown"));
        assert!(paths.lock_path().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn lock_of_exited_process_is_reclaimed() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let paths = SweepPaths::new(temp.path().to_path_buf());
        let mut child = std::process::Command::new("true").spawn().expect("spawn true");
        let dead_pid = child.id();
        child.wait().expect("wait for true");
        assert!(!process_alive(dead_pid));

        let record = LockRecord {
            pid: dead_pid,
            started_at_epoch_ms: 0,
        };
        fs::write(
            paths.lock_path(),
            serde_json::to_string(&record).expect("serialize record"),
        )
        .expect("write lock");

        let lock = RunLock::acquire(&paths).expect("reclaim lock");
        let held: LockRecord =
            serde_json::from_slice(&fs::read(lock.path()).expect("read lock")).expect("parse");
        assert_eq!(held.pid, std::process::id());
    }

    #[cfg(unix)]
    #[test]
    fn lock_of_live_process_is_kept() {
        assert!(process_alive(std::process::id()));
    }
}
