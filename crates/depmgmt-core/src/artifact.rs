use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use depmgmt_util::errors::DepMgmtError;
use serde::{Deserialize, Serialize};

/// Well-known artifact property keys.
pub mod properties {
    /// Filesystem path of a `system`-scoped artifact.
    pub const LOCAL_PATH: &str = "localPath";
}

/// Extension assumed when a coordinate does not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// A Maven-style artifact: coordinates plus free-form properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    /// May be empty, e.g. for management entries that only override scope.
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Artifact {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            extension: default_extension(),
            classifier: String::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = classifier.to_string();
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The `localPath` property, set on `system`-scoped artifacts.
    pub fn local_path(&self) -> Option<&str> {
        self.property(properties::LOCAL_PATH)
    }

    /// `group:artifact` identifier (without version).
    pub fn ga(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.extension != DEFAULT_EXTENSION || !self.classifier.is_empty() {
            write!(f, ":{}", self.extension)?;
        }
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Parses `group:artifact:version`, `group:artifact:extension:version`
/// or `group:artifact:extension:classifier:version`.
impl FromStr for Artifact {
    type Err = DepMgmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().take(2).any(|p| p.is_empty()) {
            return Err(DepMgmtError::Coordinate {
                coordinate: s.to_string(),
            });
        }
        match parts.as_slice() {
            [g, a, v] => Ok(Self::new(g, a, v)),
            [g, a, e, v] => Ok(Self::new(g, a, v).with_extension(e)),
            [g, a, e, c, v] => Ok(Self::new(g, a, v).with_extension(e).with_classifier(c)),
            _ => Err(DepMgmtError::Coordinate {
                coordinate: s.to_string(),
            }),
        }
    }
}
