//! Unique temp artifact names for one test run: video file + frame-data sidecar.
//!
//! Names derive from the workspace path and the run id (`{run_id}.mp4`,
//! `{run_id}.json`). Both files are reserved on disk at generation time so a
//! collision with a leftover artifact is detected immediately; colliding stems
//! get a random suffix. Repeat generation for the same run id returns the
//! cached first result.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;

use rand::Rng as _;

use crate::core::errors::{CaptureError, Result};

/// Attempts before giving up on finding a collision-free stem.
const MAX_STEM_ATTEMPTS: u32 = 8;

/// Temp artifact paths reserved for one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempCaptureNames {
    /// Raw video capture target consumed by the external encoder.
    pub temp_video_path: PathBuf,
    /// Frame-data sidecar for connections that support frame capture.
    pub temp_frame_data_path: PathBuf,
}

/// Produces unique temp artifact paths inside a ready workspace.
///
/// Constructed by the orchestrator only after the workspace resolved ready;
/// the workspace-ready precondition is enforced there, not here.
#[derive(Debug)]
pub struct NameGenerator {
    workspace: PathBuf,
    generated: HashMap<String, TempCaptureNames>,
}

impl NameGenerator {
    /// Generator rooted at a ready workspace directory.
    #[must_use]
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            generated: HashMap::new(),
        }
    }

    /// Reserve unique artifact names for `run_id`.
    ///
    /// Exactly one reservation happens per run id; later calls for the same id
    /// are deduplicated to the cached result.
    pub fn generate(&mut self, run_id: &str) -> Result<TempCaptureNames> {
        if let Some(names) = self.generated.get(run_id) {
            return Ok(names.clone());
        }

        let mut stem = run_id.to_string();
        let mut rng = rand::rng();

        for _ in 0..MAX_STEM_ATTEMPTS {
            match self.try_reserve(&stem) {
                Ok(Some(names)) => {
                    self.generated.insert(run_id.to_string(), names.clone());
                    return Ok(names);
                }
                Ok(None) => {
                    // Stale artifact with this stem; pick a suffixed one.
                    stem = format!("{run_id}-{:08x}", rng.random::<u32>());
                }
                Err(source) => {
                    return Err(CaptureError::NameGeneration {
                        run_id: run_id.to_string(),
                        details: source.to_string(),
                    });
                }
            }
        }

        Err(CaptureError::NameGeneration {
            run_id: run_id.to_string(),
            details: format!("no collision-free name after {MAX_STEM_ATTEMPTS} attempts"),
        })
    }

    /// Names already generated, keyed by run id.
    #[must_use]
    pub fn generated(&self) -> &HashMap<String, TempCaptureNames> {
        &self.generated
    }

    /// Try to reserve both artifact files for `stem`.
    ///
    /// `Ok(None)` means a collision (caller retries with another stem);
    /// `Err` is a real IO failure.
    fn try_reserve(&self, stem: &str) -> std::io::Result<Option<TempCaptureNames>> {
        let video = self.workspace.join(format!("{stem}.mp4"));
        let frames = self.workspace.join(format!("{stem}.json"));

        match OpenOptions::new().write(true).create_new(true).open(&video) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(e),
        }

        match OpenOptions::new().write(true).create_new(true).open(&frames) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let _ = std::fs::remove_file(&video);
                return Ok(None);
            }
            Err(e) => {
                let _ = std::fs::remove_file(&video);
                return Err(e);
            }
        }

        Ok(Some(TempCaptureNames {
            temp_video_path: video,
            temp_frame_data_path: frames,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_video_and_frame_data_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = NameGenerator::new(dir.path().to_path_buf());

        let names = generator.generate("run-1").unwrap();
        assert_eq!(names.temp_video_path, dir.path().join("run-1.mp4"));
        assert_eq!(names.temp_frame_data_path, dir.path().join("run-1.json"));
        assert!(names.temp_video_path.exists(), "names are reserved on disk");
        assert!(names.temp_frame_data_path.exists());
    }

    #[test]
    fn repeat_generation_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = NameGenerator::new(dir.path().to_path_buf());

        let first = generator.generate("run-1").unwrap();
        let second = generator.generate("run-1").unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.generated().len(), 1);
    }

    #[test]
    fn distinct_runs_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = NameGenerator::new(dir.path().to_path_buf());

        let a = generator.generate("run-a").unwrap();
        let b = generator.generate("run-b").unwrap();
        assert_ne!(a.temp_video_path, b.temp_video_path);
        assert_ne!(a.temp_frame_data_path, b.temp_frame_data_path);
    }

    #[test]
    fn stale_artifact_forces_suffixed_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run-1.mp4"), b"leftover").unwrap();

        let mut generator = NameGenerator::new(dir.path().to_path_buf());
        let names = generator.generate("run-1").unwrap();

        assert_ne!(names.temp_video_path, dir.path().join("run-1.mp4"));
        let file_name = names
            .temp_video_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(file_name.starts_with("run-1-"), "suffixed stem: {file_name}");
    }

    #[test]
    fn missing_workspace_yields_name_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never-created");
        let mut generator = NameGenerator::new(gone);

        let err = generator.generate("run-1").unwrap_err();
        assert_eq!(err.code(), "VCO-2002");
        assert!(!err.is_fatal_to_recording());
    }
}
