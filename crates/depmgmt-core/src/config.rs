use std::path::Path;

use depmgmt_util::errors::DepMgmtError;
use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up next to a project.
pub const CONFIG_FILE_NAME: &str = "depmgmt.toml";

/// Depth from which the transitive policy applies scalar overrides.
pub const DEFAULT_MIN_DEPTH: usize = 2;

/// Dependency-management configuration, loaded from `depmgmt.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default)]
    pub manager: ManagerSection,
}

/// Settings from the `[manager]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSection {
    #[serde(default)]
    pub policy: PolicyKind,
    #[serde(default = "default_min_depth", rename = "min-depth")]
    pub min_depth: usize,
}

impl Default for ManagerSection {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            min_depth: default_min_depth(),
        }
    }
}

fn default_min_depth() -> usize {
    DEFAULT_MIN_DEPTH
}

/// Which precedence policy the root manager uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Management applies on every level, including the root's direct dependencies.
    #[default]
    Default,
    /// Scalar management applies only from `min-depth` on; exclusions always apply.
    Transitive,
}

impl ManagerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            DepMgmtError::Config {
                message: format!("Failed to parse configuration: {e}"),
            }
            .into()
        })
    }

    /// Load the configuration at `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(DepMgmtError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load `depmgmt.toml` from a project directory.
    pub fn load_from_dir(dir: &Path) -> miette::Result<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }
}
