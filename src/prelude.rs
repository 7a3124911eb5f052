//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use video_capture_orchestrator::prelude::*;
//! ```

// Core
pub use crate::core::config::CaptureConfig;
pub use crate::core::errors::{CaptureError, Result};

// Orchestration
pub use crate::orchestrator::{
    BrowserConnectionInfo, CaptureHooks, CaptureOrchestrator, CapturePlan, JobEvent, TestRunEvent,
};

// Workspace + naming
pub use crate::naming::{NameGenerator, TempCaptureNames};
pub use crate::workspace::{WorkspaceManager, WorkspaceState};

// Registry + warnings
pub use crate::registry::{RunInfoRegistry, RunState, TestRunRecord};
pub use crate::warnings::{
    SharedWarningLog, WarningLog, report_unresolved_placeholders, shared_warning_log,
};
