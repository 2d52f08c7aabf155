//! The override patch a manager computes for one dependency.

use std::collections::BTreeMap;

use depmgmt_core::dependency::{Dependency, Exclusion};
use serde::Serialize;

/// Field overrides for a single dependency. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyManagement {
    pub version: Option<String>,
    pub version_source_hint: Option<String>,
    pub scope: Option<String>,
    pub scope_source_hint: Option<String>,
    pub optional: Option<bool>,
    pub optional_source_hint: Option<String>,
    /// Replacement artifact properties (adds or removes `localPath`).
    pub properties: Option<BTreeMap<String, String>>,
    pub properties_source_hint: Option<String>,
    pub exclusions: Option<Vec<Exclusion>>,
    /// Every declaration that contributed managed exclusions, in declaration order.
    pub exclusions_source_hints: Vec<String>,
}

impl DependencyManagement {
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.scope.is_none()
            && self.optional.is_none()
            && self.properties.is_none()
            && self.exclusions.is_none()
    }

    /// The exclusion hints rendered as one string, e.g. `[parent-a, parent-b]`.
    pub fn exclusions_source_hint(&self) -> Option<String> {
        if self.exclusions.is_none() {
            return None;
        }
        Some(format!("[{}]", self.exclusions_source_hints.join(", ")))
    }

    /// Merge the patch into `dependency`.
    pub fn apply_to(&self, dependency: &Dependency) -> Dependency {
        let mut managed = dependency.clone();
        if let Some(ref version) = self.version {
            managed.artifact.version = version.clone();
        }
        if let Some(ref properties) = self.properties {
            managed.artifact.properties = properties.clone();
        }
        if let Some(ref scope) = self.scope {
            managed.scope = scope.clone();
        }
        if let Some(optional) = self.optional {
            managed.optional = Some(optional);
        }
        if let Some(ref exclusions) = self.exclusions {
            managed.exclusions = exclusions.clone();
        }
        managed
    }
}

/// The values a dependency had before management changed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Premanaged {
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<Option<bool>>,
}

impl Premanaged {
    /// Capture the fields of `dependency` that `management` actually changes.
    pub fn capture(dependency: &Dependency, management: &DependencyManagement) -> Self {
        let mut premanaged = Self::default();
        if let Some(ref version) = management.version {
            if *version != dependency.artifact.version {
                premanaged.version = Some(dependency.artifact.version.clone());
            }
        }
        if let Some(ref scope) = management.scope {
            if *scope != dependency.scope {
                premanaged.scope = Some(dependency.scope.clone());
            }
        }
        if let Some(optional) = management.optional {
            if Some(optional) != dependency.optional {
                premanaged.optional = Some(dependency.optional);
            }
        }
        premanaged
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.scope.is_none() && self.optional.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmgmt_core::artifact::{properties, Artifact};

    fn dep() -> Dependency {
        Dependency::new(Artifact::new("org.example", "lib", "0.9"), "test")
    }

    #[test]
    fn default_is_empty() {
        assert!(DependencyManagement::default().is_empty());
        assert_eq!(DependencyManagement::default().exclusions_source_hint(), None);
    }

    #[test]
    fn apply_overrides_only_set_fields() {
        let management = DependencyManagement {
            version: Some("1.0".into()),
            scope: Some("compile".into()),
            ..Default::default()
        };
        let managed = management.apply_to(&dep());
        assert_eq!(managed.artifact.version, "1.0");
        assert_eq!(managed.scope, "compile");
        assert_eq!(managed.optional, None);
        assert!(managed.exclusions.is_empty());
    }

    #[test]
    fn apply_replaces_properties() {
        let original = Dependency::new(
            Artifact::new("g", "a", "1").with_property(properties::LOCAL_PATH, "/old"),
            "system",
        );
        let management = DependencyManagement {
            properties: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert_eq!(management.apply_to(&original).artifact.local_path(), None);
    }

    #[test]
    fn exclusion_hint_rendering() {
        let management = DependencyManagement {
            exclusions: Some(vec![Exclusion::new("x", "y")]),
            exclusions_source_hints: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        assert_eq!(management.exclusions_source_hint().as_deref(), Some("[a, b]"));
    }

    #[test]
    fn premanaged_records_changed_fields_only() {
        let management = DependencyManagement {
            version: Some("0.9".into()),
            scope: Some("compile".into()),
            optional: Some(true),
            ..Default::default()
        };
        let premanaged = Premanaged::capture(&dep(), &management);
        assert_eq!(premanaged.version, None);
        assert_eq!(premanaged.scope.as_deref(), Some("test"));
        assert_eq!(premanaged.optional, Some(None));
    }
}
