//! Collected dependency tree: one node per occurrence, with management diagnostics.

use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use depmgmt_core::artifact::Artifact;
use depmgmt_core::dependency::Dependency;

use crate::management::{DependencyManagement, Premanaged};

/// A node of the collected tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub artifact: Artifact,
    /// The managed dependency that led here; `None` for the root.
    pub dependency: Option<Dependency>,
    pub management: Option<DependencyManagement>,
    pub premanaged: Premanaged,
    /// Set when expanding the node would have revisited an ancestor.
    pub cycle: bool,
}

impl TreeNode {
    pub fn root(artifact: Artifact) -> Self {
        Self {
            artifact,
            dependency: None,
            management: None,
            premanaged: Premanaged::default(),
            cycle: false,
        }
    }

    pub fn scope(&self) -> &str {
        self.dependency.as_ref().map_or("", |d| d.scope.as_str())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dependency {
            Some(ref dep) => write!(f, "{dep}")?,
            None => write!(f, "{}", self.artifact)?,
        }
        let mut notes = Vec::new();
        if let Some(ref version) = self.premanaged.version {
            notes.push(format!("version managed from {version}"));
        }
        if let Some(ref scope) = self.premanaged.scope {
            let from = if scope.is_empty() { "<none>" } else { scope.as_str() };
            notes.push(format!("scope managed from {from}"));
        }
        if let Some(optional) = self.premanaged.optional {
            notes.push(format!("optional managed from {}", optional.unwrap_or(false)));
        }
        if !notes.is_empty() {
            write!(f, " ({})", notes.join("; "))?;
        }
        if self.cycle {
            write!(f, " (cycle)")?;
        }
        Ok(())
    }
}

/// A collected dependency tree backed by petgraph.
pub struct DependencyTree {
    graph: DiGraph<TreeNode, ()>,
    pub root: Option<NodeIndex>,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            root: None,
        }
    }

    /// Set the root node of the tree (the project itself).
    pub fn set_root(&mut self, node: TreeNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.root = Some(idx);
        idx
    }

    /// Attach `node` below `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: TreeNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.graph[idx]
    }

    /// Children of a node, in insertion order.
    pub fn children_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        children.sort();
        children
    }

    pub fn parent_of(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .next()
    }

    /// Every occurrence of `group:artifact` in the tree.
    pub fn find_all(&self, ga: &str) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| Some(idx) != self.root && self.graph[idx].artifact.ga() == ga)
            .collect()
    }

    /// Follow `group:artifact` identifiers from the root down, one level per segment.
    pub fn find_path(&self, path: &[&str]) -> Option<NodeIndex> {
        let mut current = self.root?;
        for ga in path {
            current = self
                .children_of(current)
                .into_iter()
                .find(|&child| self.graph[child].artifact.ga() == *ga)?;
        }
        Some(current)
    }

    /// Number of edges between the root and `idx`.
    pub fn depth_of(&self, idx: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = idx;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Print the dependency tree to a string.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let Some(root) = self.root else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[root]));

        let children = self.children_of(root);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.print_subtree(&mut output, child, "", i == count - 1, 1, max_depth);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let children = self.children_of(idx);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.print_subtree(output, child, &child_prefix, i == count - 1, depth + 1, max_depth);
        }
    }

    /// Number of nodes (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DependencyTree {
    fn default() -> Self {
        Self::new()
    }
}
