use depmgmt_core::artifact::Artifact;
use depmgmt_core::context::{CollectionContext, NodeContext};
use depmgmt_core::dependency::{scope, Dependency, Exclusion, ManagedDependency};

#[test]
fn exclusion_matches_group_and_artifact() {
    let excl = Exclusion::new("org.slf4j", "slf4j-api");
    assert!(excl.matches(&Artifact::new("org.slf4j", "slf4j-api", "2.0")));
    assert!(!excl.matches(&Artifact::new("org.slf4j", "slf4j-simple", "2.0")));
}

#[test]
fn exclusion_wildcard_artifact() {
    let excl = Exclusion::new("org.slf4j", "*");
    assert!(excl.matches(&Artifact::new("org.slf4j", "slf4j-simple", "2.0")));
    assert!(!excl.matches(&Artifact::new("ch.qos", "logback", "1.4")));
}

#[test]
fn dependency_with_exclusion_deduplicates() {
    let dep = Dependency::new(Artifact::new("g", "a", "1"), scope::COMPILE)
        .with_exclusion(Exclusion::new("x", "y"))
        .with_exclusion(Exclusion::new("x", "y"));
    assert_eq!(dep.exclusions.len(), 1);
}

#[test]
fn dependency_optional_defaults_to_false() {
    let dep = Dependency::new(Artifact::new("g", "a", "1"), "");
    assert!(!dep.is_optional());
    assert!(dep.with_optional(true).is_optional());
}

#[test]
fn dependency_display() {
    let dep = Dependency::new(Artifact::new("org.example", "lib", "1.0"), scope::TEST)
        .with_optional(true);
    assert_eq!(dep.to_string(), "org.example:lib:1.0 (test) [optional]");
}

#[test]
fn node_context_exposes_managed_dependencies_in_order() {
    let managed = vec![
        ManagedDependency::new(Artifact::new("g", "a", "1"), "first"),
        ManagedDependency::new(Artifact::new("g", "b", "2"), "second"),
    ];
    let ctx = NodeContext::root(Artifact::new("com.example", "app", "1.0"), managed);
    let hints: Vec<&str> = ctx
        .managed_dependencies()
        .iter()
        .map(|m| m.source_hint.as_str())
        .collect();
    assert_eq!(hints, ["first", "second"]);
    assert!(ctx.dependency().is_none());
}

#[test]
fn node_context_for_dependency() {
    let dep = Dependency::new(Artifact::new("g", "a", "1"), scope::RUNTIME);
    let ctx = NodeContext::for_dependency(dep.clone(), Vec::new());
    assert_eq!(ctx.dependency(), Some(&dep));
    assert!(ctx.managed_dependencies().is_empty());
}

#[test]
fn vec_is_a_collection_context() {
    let managed = vec![ManagedDependency::new(Artifact::new("g", "a", ""), "pom").with_scope("test")];
    let ctx: &dyn CollectionContext = &managed;
    assert_eq!(ctx.managed_dependencies().len(), 1);
}
