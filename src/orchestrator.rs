//! Lifecycle orchestrator: sequences workspace setup and per-run name
//! generation over the browser job's event stream.
//!
//! The coordinator consumes [`JobEvent`]s from a crossbeam channel (or via
//! [`CaptureOrchestrator::handle_event`] when embedded) and drives the per-run
//! state machine in the registry. The decisive ordering contract: name
//! generation for a run happens strictly after the job workspace resolved
//! ready, for every interleaving of `Start` and `TestRunCreated`. Runs that
//! arrive before the workspace is ready are parked and drained when `Start`
//! handling completes.
//!
//! Observability is constructor-injected: test harnesses and the runner pass
//! [`CaptureHooks`] closures instead of subclassing anything.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;

use crate::core::config::CaptureConfig;
use crate::core::errors::{CaptureError, Result};
use crate::naming::{NameGenerator, TempCaptureNames};
use crate::registry::{RunInfoRegistry, RunState, TestRunRecord};
use crate::warnings::{SharedWarningLog, report_unresolved_placeholders};
use crate::workspace::WorkspaceManager;

// ──────────────────── events ────────────────────

/// Browser connection a run executes on.
#[derive(Debug, Clone)]
pub struct BrowserConnectionInfo {
    pub id: String,
    /// Provider capability: direct frame-data capture instead of screen grabs.
    pub supports_frame_data: bool,
}

/// Payload of a run-create event from the automation engine.
#[derive(Debug, Clone)]
pub struct TestRunEvent {
    pub run_id: String,
    /// Legacy execution mode predating per-run isolation; never recorded.
    pub legacy: bool,
    pub index: Option<u32>,
    pub browser_connection: BrowserConnectionInfo,
    /// Placeholder tokens the runner could not resolve for this run,
    /// already extracted from the path pattern (parsing is external).
    pub unresolved_placeholders: Vec<String>,
}

/// Lifecycle events consumed from the browser job.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Job started; triggers workspace creation.
    Start,
    /// A test run was created inside the job.
    TestRunCreated(TestRunEvent),
    /// Job finished; finalizes every non-terminal run.
    Done,
}

impl JobEvent {
    /// Map an engine wire event name onto the run-create semantics.
    ///
    /// The engine emits both spellings depending on its version.
    #[must_use]
    pub fn is_run_create_name(name: &str) -> bool {
        matches!(name, "test-run-created" | "test-run-create")
    }
}

// ──────────────────── observer hooks ────────────────────

/// Constructor-injected observer callbacks, invoked at defined points.
///
/// All hooks default to no-ops. They must be `Send` so an orchestrator can be
/// moved onto a worker thread together with its receiver.
#[derive(Default)]
pub struct CaptureHooks {
    /// `Start` handling began; workspace initialization is about to run.
    pub on_workspace_init_start: Option<Box<dyn FnMut() + Send>>,
    /// Workspace resolved ready; `Start` handling is complete.
    pub on_workspace_ready: Option<Box<dyn FnMut(&Path) + Send>>,
    /// A non-legacy run was registered (names possibly still pending).
    pub on_run_registered: Option<Box<dyn FnMut(&str) + Send>>,
    /// Names were generated for a run; the record is `NamesReady`.
    pub on_names_generated: Option<Box<dyn FnMut(&str, &TempCaptureNames) + Send>>,
}

impl std::fmt::Debug for CaptureHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHooks")
            .field("on_workspace_init_start", &self.on_workspace_init_start.is_some())
            .field("on_workspace_ready", &self.on_workspace_ready.is_some())
            .field("on_run_registered", &self.on_run_registered.is_some())
            .field("on_names_generated", &self.on_names_generated.is_some())
            .finish()
    }
}

// ──────────────────── capture plan ────────────────────

/// Everything the external encoder needs for one run, available from
/// `NamesReady` onward.
#[derive(Debug, Clone)]
pub struct CapturePlan {
    pub run_id: String,
    pub browser_connection_id: String,
    pub supports_frame_data: bool,
    pub index: Option<u32>,
    pub temp_video_path: PathBuf,
    pub temp_frame_data_path: PathBuf,
}

// ──────────────────── orchestrator ────────────────────

/// Coordinates workspace setup, run registration, and name generation for one
/// browser job.
pub struct CaptureOrchestrator {
    workspace: WorkspaceManager,
    names: Option<NameGenerator>,
    registry: RunInfoRegistry,
    warning_log: SharedWarningLog,
    hooks: CaptureHooks,
    /// Runs that arrived before the workspace resolved, in arrival order.
    parked_runs: Vec<String>,
    recording_disabled: bool,
    job_done: bool,
}

impl CaptureOrchestrator {
    /// Orchestrator for one browser job.
    #[must_use]
    pub fn new(
        config: &CaptureConfig,
        job_id: &str,
        warning_log: SharedWarningLog,
        hooks: CaptureHooks,
    ) -> Self {
        Self {
            workspace: WorkspaceManager::new(&config.videos_base_path, job_id),
            names: None,
            registry: RunInfoRegistry::new(),
            warning_log,
            hooks,
            parked_runs: Vec::new(),
            recording_disabled: false,
            job_done: false,
        }
    }

    /// Consume events until `Done` or until the sender side hangs up.
    ///
    /// A hang-up without `Done` is treated as job end: non-terminal runs are
    /// finalized, same as an explicit `Done`.
    pub fn run(&mut self, events: &Receiver<JobEvent>) -> Result<()> {
        loop {
            match events.recv() {
                Ok(event) => {
                    let done = matches!(event, JobEvent::Done);
                    self.handle_event(event)?;
                    if done {
                        return Ok(());
                    }
                }
                Err(_) => {
                    self.handle_event(JobEvent::Done)?;
                    return Ok(());
                }
            }
        }
    }

    /// Process one lifecycle event.
    pub fn handle_event(&mut self, event: JobEvent) -> Result<()> {
        match event {
            JobEvent::Start => self.handle_start(),
            JobEvent::TestRunCreated(run) => self.handle_run_created(run),
            JobEvent::Done => {
                self.job_done = true;
                self.registry.finalize_all();
                Ok(())
            }
        }
    }

    fn handle_start(&mut self) -> Result<()> {
        if let Some(hook) = self.hooks.on_workspace_init_start.as_mut() {
            hook();
        }

        match self.workspace.ensure_workspace() {
            Ok(path) => {
                let path = path.to_path_buf();
                if self.names.is_none() {
                    self.names = Some(NameGenerator::new(path.clone()));
                }
                if let Some(hook) = self.hooks.on_workspace_ready.as_mut() {
                    hook(&path);
                }
                self.drain_parked_runs()
            }
            Err(err) => {
                self.disable_recording(&err);
                Ok(())
            }
        }
    }

    fn handle_run_created(&mut self, run: TestRunEvent) -> Result<()> {
        // Legacy runs are never recorded: no record, no warning, no hook.
        if run.legacy {
            return Ok(());
        }

        report_unresolved_placeholders(&self.warning_log, &run.unresolved_placeholders);

        self.registry.register(TestRunRecord::pending(
            run.run_id.clone(),
            run.browser_connection.id,
            run.browser_connection.supports_frame_data,
            run.index,
        ))?;
        if let Some(hook) = self.hooks.on_run_registered.as_mut() {
            hook(&run.run_id);
        }

        if self.recording_disabled || self.job_done {
            return self.registry.finalize(&run.run_id);
        }

        // Workspace readiness is a hard precondition for name generation,
        // independent of whether Start was observed before this event.
        if self.names.is_some() {
            self.generate_names_for(&run.run_id)
        } else {
            self.parked_runs.push(run.run_id);
            Ok(())
        }
    }

    /// Generate names for every run that arrived before the workspace
    /// resolved, in arrival order.
    fn drain_parked_runs(&mut self) -> Result<()> {
        let parked = std::mem::take(&mut self.parked_runs);
        for run_id in parked {
            self.generate_names_for(&run_id)?;
        }
        Ok(())
    }

    fn generate_names_for(&mut self, run_id: &str) -> Result<()> {
        let Some(generator) = self.names.as_mut() else {
            // Callers gate on workspace readiness; reaching here without a
            // generator is a sequencing bug, not a run failure.
            return Err(CaptureError::NameGeneration {
                run_id: run_id.to_string(),
                details: "name generation attempted before workspace readiness".to_string(),
            });
        };

        match generator.generate(run_id) {
            Ok(names) => {
                self.registry.set_names_ready(run_id, names.clone())?;
                if let Some(hook) = self.hooks.on_names_generated.as_mut() {
                    hook(run_id, &names);
                }
                Ok(())
            }
            Err(err) => {
                // Recoverable per run: the run proceeds without a video.
                self.warning_log.lock().append(format!(
                    "Failed to prepare video artifacts for test run \"{run_id}\". \
                     The run will proceed without a recorded video.\n\n{err}"
                ));
                self.registry.finalize(run_id)
            }
        }
    }

    /// Workspace failure: one warning, recording off for the rest of the job,
    /// parked runs finalized without names. Test execution continues.
    fn disable_recording(&mut self, err: &CaptureError) {
        if !self.recording_disabled {
            self.warning_log.lock().append(format!(
                "Cannot initialize the video capture directory. \
                 Videos will not be recorded for this browser job.\n\n{err}"
            ));
        }
        self.recording_disabled = true;

        let parked = std::mem::take(&mut self.parked_runs);
        for run_id in parked {
            let _ = self.registry.finalize(&run_id);
        }
    }

    // ──── observers ────

    /// Registry of all non-legacy runs seen so far.
    #[must_use]
    pub fn registry(&self) -> &RunInfoRegistry {
        &self.registry
    }

    /// Whether a workspace failure disabled recording for this job.
    #[must_use]
    pub const fn recording_disabled(&self) -> bool {
        self.recording_disabled
    }

    /// Capture plan for the external encoder, once the run reached
    /// `NamesReady`. Earlier (or finalized-without-names) runs yield `None`.
    #[must_use]
    pub fn capture_plan(&self, run_id: &str) -> Option<CapturePlan> {
        let record = self.registry.get(run_id)?;
        if record.state == RunState::NamesPending {
            return None;
        }
        Some(CapturePlan {
            run_id: record.run_id.clone(),
            browser_connection_id: record.browser_connection_id.clone(),
            supports_frame_data: record.supports_frame_data,
            index: record.index,
            temp_video_path: record.temp_video_path.clone()?,
            temp_frame_data_path: record.temp_frame_data_path.clone()?,
        })
    }
}

impl std::fmt::Debug for CaptureOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureOrchestrator")
            .field("workspace", &self.workspace)
            .field("runs", &self.registry.len())
            .field("parked_runs", &self.parked_runs.len())
            .field("recording_disabled", &self.recording_disabled)
            .field("job_done", &self.job_done)
            .finish_non_exhaustive()
    }
}

// ──────────────────── tests ────────────────────
