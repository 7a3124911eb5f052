//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! The path pattern is carried as an opaque string: template parsing (and the
//! extraction of unresolved placeholder tokens per run) happens in the test
//! runner, not here.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CaptureError, Result};

/// Environment variable overriding the videos base path.
const ENV_BASE_PATH: &str = "VCO_VIDEOS_BASE_PATH";
/// Environment variable overriding the ffmpeg binary path.
const ENV_FFMPEG_PATH: &str = "VCO_FFMPEG_PATH";

/// Full capture configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// Base directory under which per-job capture workspaces are created.
    pub videos_base_path: PathBuf,
    /// User-supplied output naming pattern. Opaque here; the runner parses it
    /// and hands this component the per-run unresolved tokens.
    pub path_pattern: String,
    /// Path to the ffmpeg binary, forwarded to the external encoder untouched.
    pub ffmpeg_path: PathBuf,
    /// Per-run encoder options, forwarded to the external encoder untouched.
    pub encoding_options: HashMap<String, toml::Value>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            videos_base_path: PathBuf::from("videos"),
            path_pattern: "${DATE}_${TIME}/${TEST_ID}/${FILE_INDEX}.mp4".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            encoding_options: HashMap::new(),
        }
    }
}

impl CaptureConfig {
    /// Load config from an explicit TOML path, then apply env overrides.
    ///
    /// `None` yields the defaults (still subject to env overrides); an
    /// explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) if p.exists() => {
                let raw = fs::read_to_string(p).map_err(|source| CaptureError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Self>(&raw)?
            }
            Some(p) => {
                return Err(CaptureError::MissingConfig {
                    path: p.to_path_buf(),
                });
            }
            None => Self::default(),
        };

        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(base) = env::var_os(ENV_BASE_PATH) {
            self.videos_base_path = PathBuf::from(base);
        }
        if let Some(ffmpeg) = env::var_os(ENV_FFMPEG_PATH) {
            self.ffmpeg_path = PathBuf::from(ffmpeg);
        }
    }

    /// Validate invariants that TOML parsing cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.videos_base_path.as_os_str().is_empty() {
            return Err(CaptureError::InvalidConfig {
                details: "videos_base_path must not be empty".to_string(),
            });
        }
        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(CaptureError::InvalidConfig {
                details: "ffmpeg_path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = CaptureConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.videos_base_path, PathBuf::from("videos"));
    }

    #[test]
    fn load_none_uses_defaults() {
        let cfg = CaptureConfig::load(None).unwrap();
        assert!(!cfg.path_pattern.is_empty());
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let err = CaptureConfig::load(Some(Path::new("/nonexistent/vco.toml"))).unwrap_err();
        assert_eq!(err.code(), "VCO-1002");
    }

    #[test]
    fn load_parses_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "videos_base_path = \"/data/videos\"\npath_pattern = \"${{TEST_INDEX}}.mp4\"\n\n[encoding_options]\nr = 30"
        )
        .unwrap();

        let cfg = CaptureConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.videos_base_path, PathBuf::from("/data/videos"));
        assert_eq!(cfg.path_pattern, "${TEST_INDEX}.mp4");
        assert_eq!(
            cfg.encoding_options.get("r"),
            Some(&toml::Value::Integer(30))
        );
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.toml");
        fs::write(&path, "= broken").unwrap();

        let err = CaptureConfig::load(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "VCO-1003");
    }

    #[test]
    fn empty_base_path_is_invalid() {
        let cfg = CaptureConfig {
            videos_base_path: PathBuf::new(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code(), "VCO-1001");
    }

    #[test]
    fn config_roundtrip_toml() {
        let cfg = CaptureConfig::default();
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CaptureConfig = toml::from_str(&raw).unwrap();
        assert_eq!(cfg, parsed);
    }
}
