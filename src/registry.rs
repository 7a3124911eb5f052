//! Run info registry: recording metadata per test run, with a strict per-run
//! state machine.
//!
//! Legacy runs never reach the registry at all — the orchestrator drops them
//! before registration, so "legacy" is not a state here.
//!
//! Per-run lifecycle: `NamesPending → NamesReady → Finalized`, with
//! `NamesPending → Finalized` allowed when a job ends (or a run fails) before
//! names were generated. The external `Recording` phase happens between
//! `NamesReady` and `Finalized` and is not tracked by this component.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::errors::{CaptureError, Result};
use crate::naming::TempCaptureNames;

// ──────────────────── run state ────────────────────

/// Recording state of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Registered, waiting on workspace readiness and name generation.
    NamesPending,
    /// Names generated; the external encoder may start recording.
    NamesReady,
    /// Terminal: job done or run failed. Names may be absent.
    Finalized,
}

impl RunState {
    #[must_use]
    const fn as_str(self) -> &'static str {
        match self {
            Self::NamesPending => "NamesPending",
            Self::NamesReady => "NamesReady",
            Self::Finalized => "Finalized",
        }
    }

    const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::NamesPending, Self::NamesReady | Self::Finalized)
                | (Self::NamesReady, Self::Finalized)
        )
    }
}

// ──────────────────── record ────────────────────

/// Recording metadata for one non-legacy test run.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunRecord {
    pub run_id: String,
    /// Browser connection the run executes on, for encoder correlation.
    pub browser_connection_id: String,
    /// Whether the connection's provider supports direct frame-data capture.
    pub supports_frame_data: bool,
    /// Position of the run within the job, when known.
    pub index: Option<u32>,
    pub temp_video_path: Option<PathBuf>,
    pub temp_frame_data_path: Option<PathBuf>,
    pub state: RunState,
}

impl TestRunRecord {
    /// Fresh record for a just-created run, names still pending.
    #[must_use]
    pub fn pending(
        run_id: impl Into<String>,
        browser_connection_id: impl Into<String>,
        supports_frame_data: bool,
        index: Option<u32>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            browser_connection_id: browser_connection_id.into(),
            supports_frame_data,
            index,
            temp_video_path: None,
            temp_frame_data_path: None,
            state: RunState::NamesPending,
        }
    }
}

// ──────────────────── registry ────────────────────

/// Mapping from run id to recording metadata, in registration order.
#[derive(Debug, Default)]
pub struct RunInfoRegistry {
    records: HashMap<String, TestRunRecord>,
    order: Vec<String>,
}

impl RunInfoRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending record. A duplicate run id is rejected.
    pub fn register(&mut self, record: TestRunRecord) -> Result<()> {
        if self.records.contains_key(&record.run_id) {
            return Err(CaptureError::InvalidTransition {
                run_id: record.run_id,
                from: "registered",
                to: RunState::NamesPending.as_str(),
            });
        }
        self.order.push(record.run_id.clone());
        self.records.insert(record.run_id.clone(), record);
        Ok(())
    }

    /// Attach generated names and move the run to `NamesReady`.
    pub fn set_names_ready(&mut self, run_id: &str, names: TempCaptureNames) -> Result<()> {
        let record = self.get_mut(run_id)?;
        if !record.state.can_transition_to(RunState::NamesReady) {
            return Err(CaptureError::InvalidTransition {
                run_id: run_id.to_string(),
                from: record.state.as_str(),
                to: RunState::NamesReady.as_str(),
            });
        }
        record.temp_video_path = Some(names.temp_video_path);
        record.temp_frame_data_path = Some(names.temp_frame_data_path);
        record.state = RunState::NamesReady;
        Ok(())
    }

    /// Move one run to `Finalized`, with or without names.
    pub fn finalize(&mut self, run_id: &str) -> Result<()> {
        let record = self.get_mut(run_id)?;
        if !record.state.can_transition_to(RunState::Finalized) {
            return Err(CaptureError::InvalidTransition {
                run_id: run_id.to_string(),
                from: record.state.as_str(),
                to: RunState::Finalized.as_str(),
            });
        }
        record.state = RunState::Finalized;
        Ok(())
    }

    /// Move every non-terminal run to `Finalized`. Returns how many moved.
    pub fn finalize_all(&mut self) -> usize {
        let mut moved = 0;
        for record in self.records.values_mut() {
            if record.state != RunState::Finalized {
                record.state = RunState::Finalized;
                moved += 1;
            }
        }
        moved
    }

    #[must_use]
    pub fn get(&self, run_id: &str) -> Option<&TestRunRecord> {
        self.records.get(run_id)
    }

    fn get_mut(&mut self, run_id: &str) -> Result<&mut TestRunRecord> {
        self.records
            .get_mut(run_id)
            .ok_or_else(|| CaptureError::InvalidTransition {
                run_id: run_id.to_string(),
                from: "unregistered",
                to: "any",
            })
    }

    /// Records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &TestRunRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
