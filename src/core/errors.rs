//! VCO-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Top-level error type for the video capture orchestrator.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("[VCO-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[VCO-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[VCO-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[VCO-2001] capture workspace init failure at {path}: {details}")]
    WorkspaceInit { path: PathBuf, details: String },

    #[error("[VCO-2002] artifact name generation failure for run {run_id}: {details}")]
    NameGeneration { run_id: String, details: String },

    #[error("[VCO-2003] invalid run state transition for run {run_id}: {from} -> {to}")]
    InvalidTransition {
        run_id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("[VCO-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[VCO-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[VCO-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },
}

impl CaptureError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "VCO-1001",
            Self::MissingConfig { .. } => "VCO-1002",
            Self::ConfigParse { .. } => "VCO-1003",
            Self::WorkspaceInit { .. } => "VCO-2001",
            Self::NameGeneration { .. } => "VCO-2002",
            Self::InvalidTransition { .. } => "VCO-2003",
            Self::Serialization { .. } => "VCO-2101",
            Self::Io { .. } => "VCO-3002",
            Self::ChannelClosed { .. } => "VCO-3003",
        }
    }

    /// Whether this failure disables recording for the remainder of the job.
    ///
    /// Only workspace initialization is job-fatal; name generation and IO
    /// failures cost at most the affected run.
    #[must_use]
    pub const fn is_fatal_to_recording(&self) -> bool {
        matches!(self, Self::WorkspaceInit { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for CaptureError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
