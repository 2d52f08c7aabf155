use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;

/// Maven-compatible scope names.
pub mod scope {
    pub const COMPILE: &str = "compile";
    pub const RUNTIME: &str = "runtime";
    pub const PROVIDED: &str = "provided";
    pub const TEST: &str = "test";
    pub const SYSTEM: &str = "system";
    pub const IMPORT: &str = "import";
}

/// A transitive dependency to exclude, matched by `group:artifact`.
///
/// An `artifact_id` of `*` matches every artifact of the group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
        }
    }

    /// Whether this exclusion removes `artifact` from a dependency tree.
    pub fn matches(&self, artifact: &Artifact) -> bool {
        (self.group_id == "*" || self.group_id == artifact.group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact.artifact_id)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A dependency edge: the target artifact and how it is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub artifact: Artifact,
    /// Empty means "not declared"; graph builders treat it as `compile`.
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(artifact: Artifact, scope: &str) -> Self {
        Self {
            artifact,
            scope: scope.to_string(),
            optional: None,
            exclusions: Vec::new(),
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact)?;
        if !self.scope.is_empty() {
            write!(f, " ({})", self.scope)?;
        }
        if self.is_optional() {
            write!(f, " [optional]")?;
        }
        Ok(())
    }
}

/// A management entry declared by one node of the dependency tree
/// (a `<dependencyManagement>` item), to be applied to matching
/// dependencies further down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedDependency {
    /// Coordinates to match; an empty version leaves versions unmanaged.
    /// The `localPath` property, when present, is managed too.
    pub artifact: Artifact,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
    /// Where the entry was declared, for diagnostics.
    #[serde(default)]
    pub source_hint: String,
}

impl ManagedDependency {
    pub fn new(artifact: Artifact, source_hint: &str) -> Self {
        Self {
            artifact,
            scope: String::new(),
            optional: None,
            exclusions: Vec::new(),
            source_hint: source_hint.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_string();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }
}
