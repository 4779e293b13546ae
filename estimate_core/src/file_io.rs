//! # Estimate Files
//!
//! Estimates are saved as `.est` files containing an [`EstimateRecord`] as
//! pretty-printed JSON.
//!
//! - **Atomic saves**: write to `.est.tmp`, sync, rename over the target
//! - **File locking**: `.est.lock` sidecar plus an OS lock, so two people on a
//!   shared drive do not edit the same estimate
//! - **Version validation**: files from a newer schema are refused
//!
//! A record is validated before it is written; an estimate without a
//! customer address never reaches disk.
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimate_core::estimate::Estimate;
//! use estimate_core::file_io::{load_estimate, save_estimate, FileLock};
//! use std::path::Path;
//!
//! let estimate = Estimate::new("Pat Doe", "12 Elm St");
//! let path = Path::new("elm-street.est");
//!
//! let lock = FileLock::acquire(path, "estimator@company.com").unwrap();
//! save_estimate(&estimate, path).unwrap();
//! drop(lock);
//!
//! let loaded = load_estimate(path).unwrap();
//! assert_eq!(loaded.meta.customer_address, "12 Elm St");
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::{Estimate, SCHEMA_VERSION};
use crate::persistence::EstimateRecord;

/// Hours after which a lock is treated as abandoned
pub const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.est.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was taken
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder is gone or the lock is too old to honor
    pub fn is_stale(&self) -> bool {
        if hostname().is_some_and(|ours| ours == self.machine) && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
        .map(|out| {
            let stdout = String::from_utf8_lossy(&out.stdout);
            !stdout.contains("No tasks") && stdout.contains(&pid.to_string())
        })
        .unwrap_or(true)
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive edit lock on an estimate file, released on drop.
///
/// Holds an OS-level lock (fs2) on the sidecar file and writes [`LockInfo`]
/// into it so other users can see who has the estimate open.
pub struct FileLock {
    estimate_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for an estimate file.
    ///
    /// Fails with [`EstimateError::FileLocked`] while someone else holds a
    /// live lock. Stale locks are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> EstimateResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Ok(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(EstimateError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(
                path = %path.display(),
                holder = %existing.user_id,
                "taking over stale estimate lock"
            );
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            EstimateError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(io_error("write lock", &lock_path))?;
        lock_file.sync_all().map_err(io_error("sync lock", &lock_path))?;

        debug!(path = %path.display(), user = %info.user_id, "estimate lock acquired");
        Ok(FileLock {
            estimate_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock holder, if any, without taking the lock.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path))
            .ok()
            .filter(|info| !info.is_stale())
    }

    pub fn estimate_path(&self) -> &Path {
        &self.estimate_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `estimate.est` -> `estimate.est.lock`
fn lock_path_for(estimate_path: &Path) -> PathBuf {
    let mut lock_path = estimate_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// `map_err` adapter turning an I/O error into [`EstimateError::FileError`]
fn io_error(operation: &str, path: &Path) -> impl FnOnce(std::io::Error) -> EstimateError {
    let operation = operation.to_string();
    let path = path.display().to_string();
    move |e| EstimateError::file_error(operation, path, e.to_string())
}

fn read_lock_info(lock_path: &Path) -> EstimateResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

fn read_to_string(path: &Path, operation: &str) -> EstimateResult<String> {
    let mut file = File::open(path).map_err(io_error(operation, path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(io_error(operation, path))?;
    Ok(contents)
}

/// Save an estimate with atomic write semantics.
///
/// The estimate is resolved, turned into an [`EstimateRecord`] and validated
/// before anything touches disk.
pub fn save_estimate(estimate: &Estimate, path: &Path) -> EstimateResult<()> {
    save_record(&EstimateRecord::from_estimate(estimate), path)
}

/// Validate and atomically write a record.
pub fn save_record(record: &EstimateRecord, path: &Path) -> EstimateResult<()> {
    record.validate()?;
    let json = serde_json::to_string_pretty(record)?;

    let tmp_path = path.with_extension("est.tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(io_error("write temp file", &tmp_path))?;
    tmp_file.sync_all().map_err(io_error("sync temp file", &tmp_path))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EstimateError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), total = record.total_price, "estimate saved");
    Ok(())
}

/// Load the raw record from an estimate file.
pub fn load_record(path: &Path) -> EstimateResult<EstimateRecord> {
    let contents = read_to_string(path, "read")?;
    let record: EstimateRecord =
        serde_json::from_str(&contents).map_err(|e| EstimateError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;
    validate_version(&record.version)?;

    if !record.totals_match() {
        warn!(path = %path.display(), "stored totals differ from a fresh resolution");
    }
    Ok(record)
}

/// Load an editable estimate from a file.
pub fn load_estimate(path: &Path) -> EstimateResult<Estimate> {
    load_record(path).map(EstimateRecord::into_estimate)
}

/// Load an estimate along with the current lock holder, if any.
///
/// A locked estimate should be opened read-only.
pub fn load_estimate_with_lock_check(path: &Path) -> EstimateResult<(Estimate, Option<LockInfo>)> {
    let estimate = load_estimate(path)?;
    Ok((estimate, FileLock::check(path)))
}

/// Major must match; on 0.x the file's minor may not be newer than ours.
fn validate_version(file_version: &str) -> EstimateResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || EstimateError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}
