//! Collection session bookkeeping: cycle detection along the current path and
//! memoized management of child dependency lists.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use depmgmt_core::dependency::Dependency;

use crate::management::DependencyManagement;
use crate::manager::DependencyManager;

/// The coordinates on the path from the root to the node being expanded.
#[derive(Debug, Default)]
pub struct PathGuard {
    stack: Vec<String>,
    on_path: HashSet<String>,
}

impl PathGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a coordinate. Returns `false` (and pushes nothing) if it is already
    /// on the path, i.e. expanding it would cycle.
    pub fn enter(&mut self, coordinate: &str) -> bool {
        if !self.on_path.insert(coordinate.to_string()) {
            return false;
        }
        self.stack.push(coordinate.to_string());
        true
    }

    /// Pop the most recently entered coordinate.
    pub fn leave(&mut self) {
        if let Some(coordinate) = self.stack.pop() {
            self.on_path.remove(&coordinate);
        }
    }

    pub fn contains(&self, coordinate: &str) -> bool {
        self.on_path.contains(coordinate)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// A dependency paired with the management computed for it.
pub type ManagedChild = (Dependency, Option<DependencyManagement>);

/// Managed child lists keyed by parent coordinate and the manager that managed them.
///
/// Two managers that compare equal produce identical patch values, so the result
/// for an already seen `(coordinate, manager)` pair is reused. Source hints are
/// not part of manager equality and are re-read from the asking manager unless
/// it shares its state with the one that filled the entry.
#[derive(Debug, Default)]
pub struct ManagedChildren {
    entries: HashMap<(String, DependencyManager), Rc<Vec<ManagedChild>>>,
    hits: usize,
}

impl ManagedChildren {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_manage(
        &mut self,
        coordinate: &str,
        manager: &DependencyManager,
        dependencies: &[Dependency],
    ) -> Rc<Vec<ManagedChild>> {
        let key = (coordinate.to_string(), manager.clone());
        if let Some(((_, cached_by), children)) = self.entries.get_key_value(&key) {
            self.hits += 1;
            tracing::trace!("reusing managed children of {coordinate}");
            if Arc::ptr_eq(cached_by.state(), manager.state()) {
                return Rc::clone(children);
            }
            return Rc::new(
                children
                    .iter()
                    .map(|(dep, management)| {
                        let mut management = management.clone();
                        if let Some(ref mut m) = management {
                            manager.refresh_source_hints(dep, m);
                        }
                        (dep.clone(), management)
                    })
                    .collect(),
            );
        }
        let children: Rc<Vec<ManagedChild>> = Rc::new(
            dependencies
                .iter()
                .map(|dep| (dep.clone(), manager.manage_dependency(dep)))
                .collect(),
        );
        self.entries.insert(key, Rc::clone(&children));
        children
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
