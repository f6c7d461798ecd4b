//! Generation configuration.
//!
//! Load order: `stubgen.toml` in the source root → environment variables →
//! CLI flags (applied by the caller). The config value is threaded through
//! the driver and renderer constructors; there is no process-wide state.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the pipeline does when generating one service fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first render/import/IO failure.
    #[default]
    Halt,
    /// Keep processing sibling services, report every failure at the end.
    Collect,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "halt" => Ok(Self::Halt),
            "collect" => Ok(Self::Collect),
            other => anyhow::bail!("unknown error policy {other:?} (expected halt or collect)"),
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Halt => write!(f, "halt"),
            Self::Collect => write!(f, "collect"),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Directory generated files are written to.
    pub output_dir: PathBuf,
    /// Failure handling while generating.
    pub error_policy: ErrorPolicy,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl GenConfig {
    /// Load config from `stubgen.toml` in the source root, with env var
    /// overrides. Falls back to defaults if no config file exists.
    pub fn load(source_root: &Path) -> Result<Self> {
        let config_path = source_root.join("stubgen.toml");

        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(dir) = std::env::var("STUBGEN_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(policy) = std::env::var("STUBGEN_ERROR_POLICY") {
            config.error_policy = policy.parse()?;
        }

        Ok(config)
    }
}
