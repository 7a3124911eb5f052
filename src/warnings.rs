//! User-facing warning log and the path-pattern placeholder validator.
//!
//! The log is an ordered, append-only list of warning strings. It is always
//! constructor-injected into the orchestrator as a [`SharedWarningLog`] so the
//! runner (and tests) keep an observing handle; there is no global instance.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::errors::{CaptureError, Result};

// ──────────────────── warning log ────────────────────

/// Ordered, append-only collection of user-facing warning strings.
#[derive(Debug, Default)]
pub struct WarningLog {
    messages: Vec<String>,
}

impl WarningLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message. Order of appends is preserved; nothing is
    /// deduplicated.
    pub fn append(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Read-only view of appended messages, in append order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append every message to a JSONL file, one timestamped record per line.
    ///
    /// Export failures never affect the in-memory log.
    pub fn export_jsonl(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CaptureError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CaptureError::io(path, e))?;
        for message in &self.messages {
            let record = WarningRecord {
                ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                message,
            };
            let json = serde_json::to_string(&record)?;
            writeln!(file, "{json}").map_err(|e| CaptureError::io(path, e))?;
        }
        Ok(())
    }
}

/// A single warning record written to the JSONL export.
#[derive(Debug, Serialize)]
struct WarningRecord<'a> {
    ts: String,
    message: &'a str,
}

/// Shared handle to a warning log, injected into the orchestrator.
pub type SharedWarningLog = Arc<Mutex<WarningLog>>;

/// Convenience constructor for a fresh shared log.
#[must_use]
pub fn shared_warning_log() -> SharedWarningLog {
    Arc::new(Mutex::new(WarningLog::new()))
}

// ──────────────────── placeholder validator ────────────────────

/// Report path-pattern placeholder tokens that could not be resolved for a run.
///
/// Appends exactly one warning per call (none for an empty token list).
/// Wording is pluralization-sensitive and tokens keep their given order,
/// double-quoted and comma-separated with no trailing conjunction.
pub fn report_unresolved_placeholders(log: &SharedWarningLog, tokens: &[String]) {
    if tokens.is_empty() {
        return;
    }

    let mut quoted = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            quoted.push_str(", ");
        }
        let _ = write!(quoted, "\"{token}\"");
    }

    let message = if tokens.len() == 1 {
        format!(
            "The {quoted} path pattern placeholder cannot be applied to the recorded video.\n\n\
             The placeholder was replaced with an empty string."
        )
    } else {
        format!(
            "The {quoted} path pattern placeholders cannot be applied to the recorded video.\n\n\
             The placeholders were replaced with an empty string."
        )
    };

    log.lock().append(message);
}

// ──────────────────── tests ────────────────────
