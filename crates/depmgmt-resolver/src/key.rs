//! Version-less artifact identity used to match dependencies against management.

use std::fmt;

use depmgmt_core::artifact::Artifact;

/// `(group, artifact, extension, classifier)`; two artifacts that differ only
/// by version map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: String,
}

impl ArtifactKey {
    pub fn of(artifact: &Artifact) -> Self {
        Self {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            extension: artifact.extension.clone(),
            classifier: artifact.classifier.clone(),
        }
    }
}

impl From<&Artifact> for ArtifactKey {
    fn from(artifact: &Artifact) -> Self {
        Self::of(artifact)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.group_id, self.artifact_id, self.extension
        )?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        Ok(())
    }
}
