//! Depth-first collection of a dependency tree with management applied.
//!
//! The collector forks the configured root manager with the root's own
//! management, manages the root's direct dependencies with that fork, and then
//! for every collected node forks the parent's manager with the node's
//! descriptor management to manage the node's children. No version mediation
//! takes place: every occurrence becomes its own tree node.

use std::collections::HashMap;

use depmgmt_core::artifact::Artifact;
use depmgmt_core::context::NodeContext;
use depmgmt_core::dependency::{Dependency, Exclusion, ManagedDependency};

use crate::cache::{ManagedChildren, PathGuard};
use crate::graph::{DependencyTree, TreeNode};
use crate::management::Premanaged;
use crate::manager::DependencyManager;

/// What an artifact's model declares: its dependencies and its dependency management.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<ManagedDependency>,
}

impl ArtifactDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_managed(mut self, managed: ManagedDependency) -> Self {
        self.managed_dependencies.push(managed);
        self
    }
}

/// Source of artifact descriptors; `None` means the artifact has no known model.
pub trait DescriptorSource {
    fn descriptor(&self, artifact: &Artifact) -> Option<ArtifactDescriptor>;
}

/// Descriptors held in memory, keyed by full coordinate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDescriptors {
    descriptors: HashMap<String, ArtifactDescriptor>,
}

impl InMemoryDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: &Artifact, descriptor: ArtifactDescriptor) {
        self.descriptors.insert(artifact.to_string(), descriptor);
    }

    pub fn with(mut self, coordinate: &str, descriptor: ArtifactDescriptor) -> miette::Result<Self> {
        let artifact: Artifact = coordinate.parse()?;
        self.insert(&artifact, descriptor);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorSource for InMemoryDescriptors {
    fn descriptor(&self, artifact: &Artifact) -> Option<ArtifactDescriptor> {
        self.descriptors.get(&artifact.to_string()).cloned()
    }
}

/// The output of a collection run.
pub struct CollectResult {
    pub tree: DependencyTree,
    /// Child lists answered from the `(coordinate, manager)` cache.
    pub cache_hits: usize,
}

/// Walks descriptors from a root artifact, managing every dependency on the way.
pub struct Collector<'a, S: DescriptorSource> {
    source: &'a S,
    root_manager: DependencyManager,
}

impl<'a, S: DescriptorSource> Collector<'a, S> {
    pub fn new(source: &'a S, root_manager: DependencyManager) -> Self {
        Self {
            source,
            root_manager,
        }
    }

    pub fn collect(&self, root: &Artifact) -> CollectResult {
        let descriptor = self.source.descriptor(root).unwrap_or_default();
        let mut session = Session {
            source: self.source,
            tree: DependencyTree::new(),
            path: PathGuard::new(),
            children: ManagedChildren::new(),
        };

        let root_idx = session.tree.set_root(TreeNode::root(root.clone()));
        let context = NodeContext::root(root.clone(), descriptor.managed_dependencies);
        let manager = self.root_manager.derive_child_manager(&context);

        let coordinate = root.to_string();
        session.path.enter(&coordinate);
        session.expand(root_idx, &coordinate, &descriptor.dependencies, &manager, &[]);
        session.path.leave();

        tracing::debug!(
            "collected {} nodes below {root} ({} cached child lists, {} reused)",
            session.tree.len(),
            session.children.len(),
            session.children.hits()
        );
        CollectResult {
            cache_hits: session.children.hits(),
            tree: session.tree,
        }
    }
}

struct Session<'a, S: DescriptorSource> {
    source: &'a S,
    tree: DependencyTree,
    path: PathGuard,
    children: ManagedChildren,
}

impl<S: DescriptorSource> Session<'_, S> {
    fn expand(
        &mut self,
        parent: petgraph::graph::NodeIndex,
        coordinate: &str,
        dependencies: &[Dependency],
        manager: &DependencyManager,
        inherited_exclusions: &[Exclusion],
    ) {
        let managed = self.children.get_or_manage(coordinate, manager, dependencies);

        for (original, management) in managed.iter() {
            if let Some(exclusion) = inherited_exclusions
                .iter()
                .find(|e| e.matches(&original.artifact))
            {
                tracing::trace!("{} excluded by {exclusion}", original.artifact);
                continue;
            }

            let (dependency, premanaged) = match management {
                Some(m) => (m.apply_to(original), Premanaged::capture(original, m)),
                None => (original.clone(), Premanaged::default()),
            };
            let child_coordinate = dependency.artifact.to_string();
            let cycle = self.path.contains(&child_coordinate);

            let idx = self.tree.add_child(
                parent,
                TreeNode {
                    artifact: dependency.artifact.clone(),
                    dependency: Some(dependency.clone()),
                    management: management.clone(),
                    premanaged,
                    cycle,
                },
            );

            if cycle {
                tracing::debug!("cycle at {child_coordinate}, not expanding");
                continue;
            }
            let Some(descriptor) = self.source.descriptor(&dependency.artifact) else {
                continue;
            };

            let mut exclusions = inherited_exclusions.to_vec();
            for exclusion in &dependency.exclusions {
                if !exclusions.contains(exclusion) {
                    exclusions.push(exclusion.clone());
                }
            }

            let context = NodeContext::for_dependency(
                dependency,
                descriptor.managed_dependencies,
            );
            let child_manager = manager.derive_child_manager(&context);

            self.path.enter(&child_coordinate);
            self.expand(
                idx,
                &child_coordinate,
                &descriptor.dependencies,
                &child_manager,
                &exclusions,
            );
            self.path.leave();
        }
    }
}
