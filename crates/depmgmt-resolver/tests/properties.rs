use std::sync::Arc;

use depmgmt_core::artifact::Artifact;
use depmgmt_core::dependency::{Dependency, Exclusion, ManagedDependency};
use depmgmt_resolver::state::ManagementState;
use depmgmt_resolver::{ArtifactKey, DependencyManager};
use proptest::prelude::*;

fn arb_entry() -> impl Strategy<Value = ManagedDependency> {
    (
        prop::sample::select(vec!["a", "b", "c"]),
        prop::option::of(prop::sample::select(vec!["1.0", "2.0", "3.0"])),
        prop::option::of(prop::sample::select(vec!["compile", "runtime", "test"])),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::sample::select(vec!["x", "y", "z"])),
        prop::sample::select(vec!["h1", "h2", "h3"]),
    )
        .prop_map(|(artifact, version, scope, optional, exclusion, hint)| {
            let mut entry =
                ManagedDependency::new(Artifact::new("org", artifact, version.unwrap_or("")), hint);
            if let Some(scope) = scope {
                entry = entry.with_scope(scope);
            }
            if let Some(optional) = optional {
                entry = entry.with_optional(optional);
            }
            if let Some(exclusion) = exclusion {
                entry = entry.with_exclusion(Exclusion::new("excluded", exclusion));
            }
            entry
        })
}

fn arb_levels() -> impl Strategy<Value = Vec<Vec<ManagedDependency>>> {
    prop::collection::vec(prop::collection::vec(arb_entry(), 0..4), 1..5)
}

proptest! {
    /// Forking never changes the state it was forked from.
    #[test]
    fn fork_leaves_parent_untouched(levels in arb_levels()) {
        let mut state = Arc::new(ManagementState::new());
        for level in &levels {
            let before = ManagementState::clone(&state);
            let next = state.fork(level);
            prop_assert_eq!(&*state, &before);
            prop_assert!(Arc::ptr_eq(state.versions(), before.versions()));
            state = next;
        }
    }

    /// The managed scope of a key is the first non-empty scope declared for it.
    #[test]
    fn scope_is_first_declared(levels in arb_levels()) {
        let mut manager = DependencyManager::always();
        for level in &levels {
            manager = manager.derive_child_manager(level);
        }

        for artifact in ["a", "b", "c"] {
            let expected = levels
                .iter()
                .flatten()
                .find(|e| e.artifact.artifact_id == artifact && !e.scope.is_empty())
                .map(|e| e.scope.clone());
            let dependency = Dependency::new(Artifact::new("org", artifact, "0.1"), "");
            let managed = manager.manage_dependency(&dependency).and_then(|m| m.scope);
            prop_assert_eq!(managed, expected);
        }
    }

    /// Managed exclusions are the union of everything declared for the key,
    /// in first-declared order.
    #[test]
    fn exclusions_are_unioned(levels in arb_levels()) {
        let mut manager = DependencyManager::transitive();
        for level in &levels {
            manager = manager.derive_child_manager(level);
        }

        for artifact in ["a", "b", "c"] {
            let mut expected: Vec<Exclusion> = Vec::new();
            for exclusion in levels
                .iter()
                .flatten()
                .filter(|e| e.artifact.artifact_id == artifact)
                .flat_map(|e| e.exclusions.iter())
            {
                if !expected.contains(exclusion) {
                    expected.push(exclusion.clone());
                }
            }

            let key = ArtifactKey::of(&Artifact::new("org", artifact, ""));
            let actual: Vec<Exclusion> = manager
                .state()
                .exclusions()
                .get(&key)
                .cloned()
                .unwrap_or_default();
            prop_assert_eq!(actual, expected);
        }
    }

    /// Building from the same declarations twice yields equal managers.
    #[test]
    fn same_declarations_equal_managers(levels in arb_levels()) {
        let build = || {
            levels
                .iter()
                .fold(DependencyManager::transitive(), |m, level| m.derive_child_manager(level))
        };
        prop_assert_eq!(build(), build());
    }
}
