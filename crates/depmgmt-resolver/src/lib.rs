//! Dependency management propagation: decides which declared management
//! (version, scope, optional, local path, exclusions) applies to each
//! dependency discovered while walking a dependency tree.
//!
//! A [`manager::DependencyManager`] is forked once per tree node with the
//! node's declared management and asked to manage the node's dependencies.
//! The [`collect`] module drives managers over an in-memory descriptor source.

pub mod cache;
pub mod collect;
pub mod graph;
pub mod key;
pub mod management;
pub mod manager;
pub mod state;

pub use key::ArtifactKey;
pub use management::DependencyManagement;
pub use manager::{DependencyManager, ManagementPolicy};
