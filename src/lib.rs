#![forbid(unsafe_code)]

//! Video capture orchestrator for an end-to-end browser test runner.
//!
//! For each test run inside a browser job this component:
//! 1. **Decides eligibility** — legacy runs are never recorded
//! 2. **Prepares one shared workspace** per job for raw capture artifacts
//! 3. **Generates unique temp artifact names** per run, strictly after the
//!    workspace resolved ready
//! 4. **Warns** when the user's output-naming pattern contains placeholders
//!    that cannot be resolved for a run
//!
//! The actual video encoder, the browser automation engine, and path-pattern
//! parsing live outside this crate.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use video_capture_orchestrator::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use video_capture_orchestrator::core::config::CaptureConfig;
//! use video_capture_orchestrator::orchestrator::{CaptureHooks, CaptureOrchestrator};
//! ```

pub mod prelude;

pub mod core;
pub mod naming;
pub mod orchestrator;
pub mod registry;
pub mod warnings;
pub mod workspace;
