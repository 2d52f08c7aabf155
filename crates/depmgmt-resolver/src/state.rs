//! Accumulated management declarations, forked copy-on-write at every tree node.
//!
//! A [`ManagementState`] holds five independent fields (version, scope,
//! optional, local path, exclusions). Each field sits behind its own `Arc`,
//! so a fork that never writes a field shares it with the parent. The first
//! write to a field during a fork goes through [`Arc::make_mut`]; the parent
//! always holds another reference at that point, so the field is copied
//! exactly once and every later write in the same fork hits the private copy.
//!
//! Scalar fields are first-writer-wins: a key recorded by an ancestor (or by an
//! earlier entry of the same node) is never overwritten. Exclusions are unioned
//! instead, keeping the order in which they were first declared.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use depmgmt_core::dependency::{Exclusion, ManagedDependency};

use crate::key::ArtifactKey;

/// One managed field: values plus the declaration each value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedField<V, H> {
    values: BTreeMap<ArtifactKey, V>,
    hints: BTreeMap<ArtifactKey, H>,
}

impl<V, H> Default for ManagedField<V, H> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            hints: BTreeMap::new(),
        }
    }
}

impl<V, H> ManagedField<V, H> {
    pub fn get(&self, key: &ArtifactKey) -> Option<&V> {
        self.values.get(key)
    }

    pub fn hint(&self, key: &ArtifactKey) -> Option<&H> {
        self.hints.get(key)
    }

    pub fn contains_key(&self, key: &ArtifactKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn values(&self) -> &BTreeMap<ArtifactKey, V> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A scalar field: one value and one source hint per key.
pub type ScalarField<V> = ManagedField<V, String>;

/// The exclusion field: deduplicated exclusions in declaration order, and every
/// hint that contributed to them.
pub type ExclusionField = ManagedField<Vec<Exclusion>, Vec<String>>;

/// Immutable snapshot of all management declared along a path from the root.
#[derive(Debug, Clone, Default)]
pub struct ManagementState {
    versions: Arc<ScalarField<String>>,
    scopes: Arc<ScalarField<String>>,
    optionals: Arc<ScalarField<bool>>,
    local_paths: Arc<ScalarField<String>>,
    exclusions: Arc<ExclusionField>,
}

impl ManagementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn versions(&self) -> &Arc<ScalarField<String>> {
        &self.versions
    }

    pub fn scopes(&self) -> &Arc<ScalarField<String>> {
        &self.scopes
    }

    pub fn optionals(&self) -> &Arc<ScalarField<bool>> {
        &self.optionals
    }

    pub fn local_paths(&self) -> &Arc<ScalarField<String>> {
        &self.local_paths
    }

    pub fn exclusions(&self) -> &Arc<ExclusionField> {
        &self.exclusions
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
            && self.scopes.is_empty()
            && self.optionals.is_empty()
            && self.local_paths.is_empty()
            && self.exclusions.is_empty()
    }

    /// Fold `managed` into a new state, leaving `self` untouched.
    ///
    /// Returns `self` (the same `Arc`) when no entry contributes anything.
    pub fn fork(self: &Arc<Self>, managed: &[ManagedDependency]) -> Arc<Self> {
        let mut next = ManagementState::clone(self);
        let mut touched = false;

        for entry in managed {
            let key = ArtifactKey::of(&entry.artifact);
            let hint = entry.source_hint.as_str();

            let version = &entry.artifact.version;
            if !version.is_empty() {
                touched |= record_first(&mut next.versions, "version", &key, version.clone(), hint);
            }

            if !entry.scope.is_empty() {
                touched |= record_first(&mut next.scopes, "scope", &key, entry.scope.clone(), hint);
            }

            if let Some(optional) = entry.optional {
                touched |= record_first(&mut next.optionals, "optional", &key, optional, hint);
            }

            if let Some(local_path) = entry.artifact.local_path() {
                touched |= record_first(
                    &mut next.local_paths,
                    "local path",
                    &key,
                    local_path.to_string(),
                    hint,
                );
            }

            if !entry.exclusions.is_empty() {
                if Arc::strong_count(&next.exclusions) > 1 {
                    tracing::trace!("copying managed exclusions ({} keys)", next.exclusions.len());
                }
                let field = Arc::make_mut(&mut next.exclusions);
                let managed = field.values.entry(key.clone()).or_default();
                for exclusion in &entry.exclusions {
                    if !managed.contains(exclusion) {
                        managed.push(exclusion.clone());
                    }
                }
                let hints = field.hints.entry(key.clone()).or_default();
                if !hints.iter().any(|h| h == hint) {
                    hints.push(hint.to_string());
                }
                tracing::trace!(
                    "managed exclusions for {key} += {} from {hint}",
                    entry.exclusions.len()
                );
                touched = true;
            }
        }

        if touched {
            Arc::new(next)
        } else {
            tracing::trace!("{} management entries added nothing, reusing state", managed.len());
            Arc::clone(self)
        }
    }

    /// Compares managed values only; source hints are diagnostics.
    fn same_values(&self, other: &Self) -> bool {
        fn same<V: PartialEq, H>(a: &Arc<ManagedField<V, H>>, b: &Arc<ManagedField<V, H>>) -> bool {
            Arc::ptr_eq(a, b) || a.values == b.values
        }
        same(&self.versions, &other.versions)
            && same(&self.scopes, &other.scopes)
            && same(&self.optionals, &other.optionals)
            && same(&self.local_paths, &other.local_paths)
            && (Arc::ptr_eq(&self.exclusions, &other.exclusions)
                || same_exclusions(&self.exclusions, &other.exclusions))
    }
}

/// Exclusions compare as sets: declaration order does not matter.
fn same_exclusions(a: &ExclusionField, b: &ExclusionField) -> bool {
    a.values.len() == b.values.len()
        && a.values.iter().all(|(key, ours)| {
            b.values.get(key).is_some_and(|theirs| {
                ours.len() == theirs.len() && ours.iter().all(|e| theirs.contains(e))
            })
        })
}

/// Record `value` for `key` unless the field already manages the key.
fn record_first<V: Clone>(
    field: &mut Arc<ScalarField<V>>,
    name: &str,
    key: &ArtifactKey,
    value: V,
    hint: &str,
) -> bool {
    if field.contains_key(key) {
        return false;
    }
    if Arc::strong_count(field) > 1 {
        tracing::trace!("copying managed {name} map ({} keys)", field.len());
    }
    let field = Arc::make_mut(field);
    field.values.insert(key.clone(), value);
    field.hints.insert(key.clone(), hint.to_string());
    tracing::trace!("managed {name} for {key} from {hint}");
    true
}

impl PartialEq for ManagementState {
    fn eq(&self, other: &Self) -> bool {
        self.same_values(other)
    }
}

impl Eq for ManagementState {}

impl Hash for ManagementState {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.versions.values.hash(state);
        self.scopes.values.hash(state);
        self.optionals.values.hash(state);
        self.local_paths.values.hash(state);
        self.exclusions.values.len().hash(state);
        for (key, exclusions) in &self.exclusions.values {
            key.hash(state);
            let mut sorted: Vec<&Exclusion> = exclusions.iter().collect();
            sorted.sort();
            sorted.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmgmt_core::artifact::{properties, Artifact};

    fn key(g: &str, a: &str) -> ArtifactKey {
        ArtifactKey::of(&Artifact::new(g, a, ""))
    }

    #[test]
    fn fork_records_each_field() {
        let root = Arc::new(ManagementState::new());
        let entry = ManagedDependency::new(
            Artifact::new("org", "lib", "1.0").with_property(properties::LOCAL_PATH, "/lib.jar"),
            "parent",
        )
        .with_scope("runtime")
        .with_optional(true)
        .with_exclusion(Exclusion::new("org", "unwanted"));

        let state = root.fork(&[entry]);
        let k = key("org", "lib");
        assert_eq!(state.versions().get(&k).map(String::as_str), Some("1.0"));
        assert_eq!(state.scopes().get(&k).map(String::as_str), Some("runtime"));
        assert_eq!(state.optionals().get(&k), Some(&true));
        assert_eq!(state.local_paths().get(&k).map(String::as_str), Some("/lib.jar"));
        assert!(state.exclusions().get(&k).unwrap().contains(&Exclusion::new("org", "unwanted")));
        assert_eq!(state.versions().hint(&k).map(String::as_str), Some("parent"));
        assert!(root.is_empty());
    }

    #[test]
    fn empty_version_and_scope_are_not_recorded() {
        let root = Arc::new(ManagementState::new());
        let state = root.fork(&[ManagedDependency::new(Artifact::new("org", "lib", ""), "p")]);
        assert!(Arc::ptr_eq(&root, &state));
    }

    #[test]
    fn first_entry_of_a_node_wins() {
        let root = Arc::new(ManagementState::new());
        let state = root.fork(&[
            ManagedDependency::new(Artifact::new("org", "lib", "1.0"), "first"),
            ManagedDependency::new(Artifact::new("org", "lib", "2.0"), "second"),
        ]);
        let k = key("org", "lib");
        assert_eq!(state.versions().get(&k).map(String::as_str), Some("1.0"));
        assert_eq!(state.versions().hint(&k).map(String::as_str), Some("first"));
    }

    #[test]
    fn untouched_fields_are_shared() {
        let root = Arc::new(ManagementState::new());
        let state = root.fork(&[ManagedDependency::new(Artifact::new("org", "lib", "1.0"), "p")]);
        assert!(!Arc::ptr_eq(root.versions(), state.versions()));
        assert!(Arc::ptr_eq(root.scopes(), state.scopes()));
        assert!(Arc::ptr_eq(root.optionals(), state.optionals()));
        assert!(Arc::ptr_eq(root.local_paths(), state.local_paths()));
        assert!(Arc::ptr_eq(root.exclusions(), state.exclusions()));
    }

    #[test]
    fn exclusion_hints_are_deduplicated_in_order() {
        let root = Arc::new(ManagementState::new());
        let state = root.fork(&[
            ManagedDependency::new(Artifact::new("org", "lib", ""), "b")
                .with_exclusion(Exclusion::new("x", "one")),
            ManagedDependency::new(Artifact::new("org", "lib", ""), "a")
                .with_exclusion(Exclusion::new("x", "two")),
            ManagedDependency::new(Artifact::new("org", "lib", ""), "b")
                .with_exclusion(Exclusion::new("x", "three")),
        ]);
        let k = key("org", "lib");
        assert_eq!(state.exclusions().get(&k).unwrap().len(), 3);
        assert_eq!(state.exclusions().hint(&k).unwrap(), &["b", "a"]);
    }

    #[test]
    fn exclusions_keep_declaration_order() {
        let root = Arc::new(ManagementState::new());
        let state = root.fork(&[
            ManagedDependency::new(Artifact::new("org", "lib", ""), "p")
                .with_exclusion(Exclusion::new("z", "z"))
                .with_exclusion(Exclusion::new("a", "a"))
                .with_exclusion(Exclusion::new("z", "z")),
        ]);
        assert_eq!(
            state.exclusions().get(&key("org", "lib")).unwrap(),
            &vec![Exclusion::new("z", "z"), Exclusion::new("a", "a")]
        );
    }

    #[test]
    fn exclusion_order_does_not_affect_equality() {
        use std::collections::hash_map::DefaultHasher;

        let root = Arc::new(ManagementState::new());
        let entry = |first: &str, second: &str| {
            ManagedDependency::new(Artifact::new("org", "lib", ""), "p")
                .with_exclusion(Exclusion::new(first, first))
                .with_exclusion(Exclusion::new(second, second))
        };
        let a = root.fork(&[entry("x", "y")]);
        let b = root.fork(&[entry("y", "x")]);
        assert_eq!(*a, *b);

        let hash_of = |state: &ManagementState| {
            let mut hasher = DefaultHasher::new();
            state.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn equality_ignores_hints() {
        let root = Arc::new(ManagementState::new());
        let a = root.fork(&[ManagedDependency::new(Artifact::new("org", "lib", "1.0"), "a")]);
        let b = root.fork(&[ManagedDependency::new(Artifact::new("org", "lib", "1.0"), "b")]);
        assert_eq!(*a, *b);
        assert_ne!(*a, *root);
    }

    #[test]
    fn equality_includes_local_paths() {
        let root = Arc::new(ManagementState::new());
        let a = root.fork(&[ManagedDependency::new(
            Artifact::new("org", "lib", "").with_property(properties::LOCAL_PATH, "/a"),
            "p",
        )]);
        let b = root.fork(&[ManagedDependency::new(
            Artifact::new("org", "lib", "").with_property(properties::LOCAL_PATH, "/b"),
            "p",
        )]);
        assert_ne!(*a, *b);
    }
}
