//! Dependency managers: fork management state per tree node and apply it.
//!
//! One [`DependencyManager`] type serves both precedence policies:
//!
//! - [`ManagementPolicy::Always`] applies management on every level, including
//!   the root's direct dependencies.
//! - [`ManagementPolicy::FromDepth`] applies version, scope, optional and local
//!   path management only once the manager's depth reaches the threshold; the
//!   first levels are left to the model builder. Managed exclusions still apply
//!   at every depth.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use depmgmt_core::artifact::properties;
use depmgmt_core::config::{ManagerConfig, PolicyKind, DEFAULT_MIN_DEPTH};
use depmgmt_core::context::CollectionContext;
use depmgmt_core::dependency::{scope, Dependency};

use crate::key::ArtifactKey;
use crate::management::DependencyManagement;
use crate::state::ManagementState;

/// When version, scope, optional and local path management applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementPolicy {
    Always,
    FromDepth(usize),
}

impl ManagementPolicy {
    /// The transitive policy: the root and its direct dependencies are not managed.
    pub const fn transitive() -> Self {
        Self::FromDepth(DEFAULT_MIN_DEPTH)
    }

    pub fn applies_at(self, depth: usize) -> bool {
        match self {
            Self::Always => true,
            Self::FromDepth(min) => depth >= min,
        }
    }
}

impl From<&ManagerConfig> for ManagementPolicy {
    fn from(config: &ManagerConfig) -> Self {
        match config.manager.policy {
            PolicyKind::Default => Self::Always,
            PolicyKind::Transitive => Self::FromDepth(config.manager.min_depth),
        }
    }
}

/// An immutable dependency manager owned by one node of the dependency tree.
///
/// Cloning is cheap: the accumulated state is shared.
#[derive(Debug, Clone)]
pub struct DependencyManager {
    policy: ManagementPolicy,
    depth: usize,
    state: Arc<ManagementState>,
    hash: OnceLock<u64>,
}

impl DependencyManager {
    /// A root manager without any management information.
    pub fn new(policy: ManagementPolicy) -> Self {
        Self {
            policy,
            depth: 0,
            state: Arc::new(ManagementState::new()),
            hash: OnceLock::new(),
        }
    }

    /// Root manager applying management on all levels.
    pub fn always() -> Self {
        Self::new(ManagementPolicy::Always)
    }

    /// Root manager applying scalar management from depth 2 on.
    pub fn transitive() -> Self {
        Self::new(ManagementPolicy::transitive())
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(ManagementPolicy::from(config))
    }

    pub fn policy(&self) -> ManagementPolicy {
        self.policy
    }

    /// Number of forks since the root manager.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn state(&self) -> &Arc<ManagementState> {
        &self.state
    }

    /// The manager for a child node, with the node's declared management added.
    pub fn derive_child_manager(&self, context: &dyn CollectionContext) -> Self {
        let managed = context.managed_dependencies();
        let state = self.state.fork(managed);
        tracing::trace!(
            "derived manager at depth {} ({} declared entries, state {})",
            self.depth + 1,
            managed.len(),
            if Arc::ptr_eq(&state, &self.state) {
                "shared"
            } else {
                "forked"
            }
        );
        Self {
            policy: self.policy,
            depth: self.depth.saturating_add(1),
            state,
            hash: OnceLock::new(),
        }
    }

    /// Compute the overrides to apply to `dependency`, or `None` if nothing is managed.
    pub fn manage_dependency(&self, dependency: &Dependency) -> Option<DependencyManagement> {
        let key = ArtifactKey::of(&dependency.artifact);
        let state = &self.state;
        let mut management = DependencyManagement::default();

        if self.policy.applies_at(self.depth) {
            if let Some(version) = state.versions().get(&key) {
                management.version = Some(version.clone());
                management.version_source_hint = state.versions().hint(&key).cloned();
            }

            let managed_scope = state.scopes().get(&key);
            if let Some(managed_scope) = managed_scope {
                management.scope = Some(managed_scope.clone());
                management.scope_source_hint = state.scopes().hint(&key).cloned();

                if managed_scope != scope::SYSTEM && dependency.artifact.local_path().is_some() {
                    let mut props = dependency.artifact.properties.clone();
                    props.remove(properties::LOCAL_PATH);
                    management.properties = Some(props);
                    management.properties_source_hint = state.scopes().hint(&key).cloned();
                }
            }

            let effective_scope = managed_scope.unwrap_or(&dependency.scope);
            if effective_scope == scope::SYSTEM {
                if let Some(local_path) = state.local_paths().get(&key) {
                    let mut props = dependency.artifact.properties.clone();
                    props.insert(properties::LOCAL_PATH.to_string(), local_path.clone());
                    management.properties = Some(props);
                    management.properties_source_hint = state.local_paths().hint(&key).cloned();
                }
            }

            if let Some(&optional) = state.optionals().get(&key) {
                management.optional = Some(optional);
                management.optional_source_hint = state.optionals().hint(&key).cloned();
            }
        }

        if let Some(managed) = state.exclusions().get(&key) {
            let mut exclusions = dependency.exclusions.clone();
            for exclusion in managed {
                if !exclusions.contains(exclusion) {
                    exclusions.push(exclusion.clone());
                }
            }
            management.exclusions = Some(exclusions);
            management.exclusions_source_hints =
                state.exclusions().hint(&key).cloned().unwrap_or_default();
        }

        if management.is_empty() {
            return None;
        }
        tracing::debug!("managed {} at depth {}: {:?}", dependency.artifact, self.depth, management);
        Some(management)
    }

    /// Re-read the source hints of a patch computed by an equal manager.
    ///
    /// Equal managers agree on every managed value but may have collected them
    /// from different declarations; the values in `management` are kept.
    pub fn refresh_source_hints(
        &self,
        dependency: &Dependency,
        management: &mut DependencyManagement,
    ) {
        let key = ArtifactKey::of(&dependency.artifact);
        let state = &self.state;

        if management.version.is_some() {
            management.version_source_hint = state.versions().hint(&key).cloned();
        }
        if management.scope.is_some() {
            management.scope_source_hint = state.scopes().hint(&key).cloned();
        }
        if management.optional.is_some() {
            management.optional_source_hint = state.optionals().hint(&key).cloned();
        }
        if management.properties.is_some() {
            let effective_scope = management.scope.as_deref().unwrap_or(dependency.scope.as_str());
            management.properties_source_hint = if effective_scope == scope::SYSTEM {
                state.local_paths().hint(&key).cloned()
            } else {
                state.scopes().hint(&key).cloned()
            };
        }
        if management.exclusions.is_some() {
            management.exclusions_source_hints =
                state.exclusions().hint(&key).cloned().unwrap_or_default();
        }
    }

    /// Depth only distinguishes managers whose policy looks at it.
    fn gate_depth(&self) -> Option<usize> {
        match self.policy {
            ManagementPolicy::Always => None,
            ManagementPolicy::FromDepth(_) => Some(self.depth),
        }
    }

    fn cached_hash(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            self.policy.hash(&mut hasher);
            self.gate_depth().hash(&mut hasher);
            self.state.hash(&mut hasher);
            hasher.finish()
        })
    }
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::always()
    }
}

impl PartialEq for DependencyManager {
    fn eq(&self, other: &Self) -> bool {
        self.policy == other.policy
            && self.gate_depth() == other.gate_depth()
            && (Arc::ptr_eq(&self.state, &other.state) || self.state == other.state)
    }
}

impl Eq for DependencyManager {}

impl Hash for DependencyManager {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}
