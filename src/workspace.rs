//! Per-job capture workspace: one shared temp directory for raw artifacts.
//!
//! `ensure_workspace()` is idempotent within a job: the first outcome (path or
//! failure) is cached and every later call observes the identical result
//! without touching the filesystem again. All run handlers for a job therefore
//! see one directory, created at most once.

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::core::errors::{CaptureError, Result};

/// Probe file used to verify the workspace is writable before reporting ready.
const WRITE_PROBE: &str = ".vco-write-probe";

/// Observable lifecycle of the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceState {
    /// `ensure_workspace()` has not been called yet.
    Uninitialized,
    /// Directory exists and is writable.
    Ready(PathBuf),
    /// Creation or the writability probe failed; recording is off for the job.
    Failed,
}

/// Creates and validates the shared capture directory for one browser job.
#[derive(Debug)]
pub struct WorkspaceManager {
    target: PathBuf,
    // First outcome, cached for the job's lifetime. Errors are kept as their
    // detail string since io::Error is not Clone.
    cached: Option<std::result::Result<PathBuf, String>>,
}

impl WorkspaceManager {
    /// Workspace for one job, rooted under `base_path`.
    #[must_use]
    pub fn new(base_path: &Path, job_id: &str) -> Self {
        Self {
            target: base_path.join(format!("video-{job_id}")),
            cached: None,
        }
    }

    /// The directory this manager owns (whether or not it exists yet).
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkspaceState {
        match &self.cached {
            None => WorkspaceState::Uninitialized,
            Some(Ok(path)) => WorkspaceState::Ready(path.clone()),
            Some(Err(_)) => WorkspaceState::Failed,
        }
    }

    /// Create the workspace directory and verify it is writable.
    ///
    /// Idempotent: repeated calls return the cached first outcome. A cached
    /// failure is returned again as [`CaptureError::WorkspaceInit`] without
    /// retrying — recording stays disabled for the rest of the job.
    pub fn ensure_workspace(&mut self) -> Result<&Path> {
        if self.cached.is_none() {
            let outcome = self.initialize().map_err(|details| {
                eprintln!(
                    "[VCO-WORKSPACE] init failed for {}: {details}",
                    self.target.display()
                );
                details
            });
            self.cached = Some(outcome.map(|()| self.target.clone()));
        }

        let Some(outcome) = self.cached.as_ref() else {
            return Err(CaptureError::WorkspaceInit {
                path: self.target.clone(),
                details: "workspace state unavailable".to_string(),
            });
        };
        match outcome {
            Ok(path) => Ok(path),
            Err(details) => Err(CaptureError::WorkspaceInit {
                path: self.target.clone(),
                details: details.clone(),
            }),
        }
    }

    fn initialize(&self) -> std::result::Result<(), String> {
        fs::create_dir_all(&self.target).map_err(|e| format!("create_dir_all: {e}"))?;

        // A directory that exists but rejects writes is as useless as a
        // missing one, so probe before reporting ready.
        let probe = self.target.join(WRITE_PROBE);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&probe)
            .map_err(|e| format!("write probe: {e}"))?;
        file.write_all(b"ok").map_err(|e| format!("write probe: {e}"))?;
        drop(file);
        let _ = fs::remove_file(&probe);
        Ok(())
    }
}
