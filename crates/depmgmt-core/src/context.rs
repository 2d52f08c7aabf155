//! The per-node view a dependency manager is forked with.

use crate::artifact::Artifact;
use crate::dependency::{Dependency, ManagedDependency};

/// What a traversal engine knows about the node it is descending into.
pub trait CollectionContext {
    /// Management entries declared by the node, in declaration order.
    fn managed_dependencies(&self) -> &[ManagedDependency];

    /// The dependency that led to the node; `None` at the root.
    fn dependency(&self) -> Option<&Dependency> {
        None
    }
}

/// A plain owned [`CollectionContext`].
#[derive(Debug, Clone, Default)]
pub struct NodeContext {
    pub artifact: Option<Artifact>,
    pub dependency: Option<Dependency>,
    pub managed_dependencies: Vec<ManagedDependency>,
}

impl NodeContext {
    /// Context for the root of a traversal.
    pub fn root(artifact: Artifact, managed_dependencies: Vec<ManagedDependency>) -> Self {
        Self {
            artifact: Some(artifact),
            dependency: None,
            managed_dependencies,
        }
    }

    /// Context for a node reached through `dependency`.
    pub fn for_dependency(
        dependency: Dependency,
        managed_dependencies: Vec<ManagedDependency>,
    ) -> Self {
        Self {
            artifact: Some(dependency.artifact.clone()),
            dependency: Some(dependency),
            managed_dependencies,
        }
    }
}

impl CollectionContext for NodeContext {
    fn managed_dependencies(&self) -> &[ManagedDependency] {
        &self.managed_dependencies
    }

    fn dependency(&self) -> Option<&Dependency> {
        self.dependency.as_ref()
    }
}

impl CollectionContext for Vec<ManagedDependency> {
    fn managed_dependencies(&self) -> &[ManagedDependency] {
        self
    }
}
