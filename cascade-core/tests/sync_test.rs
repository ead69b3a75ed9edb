use cascade_core::catalog::Catalog;
use cascade_core::package::{Package, RawManifest};
use cascade_core::sync::{detect_outdated, plan_sync, sync_entries};
use cascade_core::version::{BumpLevel, Version, VersionTarget};

fn package(name: &str, version: &str, deps: &[(&str, &str)]) -> Package {
    let dependencies = deps
        .iter()
        .map(|(dep, required)| (dep.to_string(), Version::parse(required).unwrap()))
        .collect();
    Package::new(
        name,
        Version::parse(version).unwrap(),
        dependencies,
        RawManifest {
            value: serde_json::json!({}),
            text: "{}".to_string(),
        },
        format!("/workspace/{}", name),
    )
}

fn catalog(packages: Vec<Package>) -> Catalog {
    Catalog::from_packages("/workspace", packages)
}

#[test]
fn test_detect_outdated_requirement() {
    let catalog = catalog(vec![
        package("pkg-a", "1.2.0", &[]),
        package("pkg-b", "1.0.0", &[("pkg-a", "^1.0.0"), ("react", "^18.0.0")]),
    ]);
    let outdated = detect_outdated(&catalog);

    assert_eq!(outdated.len(), 1);
    let deps = &outdated["pkg-b"];
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].name, "pkg-a");
    assert_eq!(deps[0].required.to_string(), "^1.0.0");
    assert_eq!(deps[0].current.to_string(), "1.2.0");
    assert_eq!(deps[0].level, BumpLevel::Minor);
}

#[test]
fn test_requirement_ahead_is_not_outdated() {
    let catalog = catalog(vec![
        package("pkg-a", "1.0.0", &[]),
        package("pkg-b", "1.0.0", &[("pkg-a", "^2.0.0")]),
        package("pkg-c", "1.0.0", &[("pkg-a", "1.0.0")]),
    ]);

    assert!(detect_outdated(&catalog).is_empty());
}

#[test]
fn test_sync_entries_use_most_severe_lag() {
    let catalog = catalog(vec![
        package("patched", "1.0.3", &[]),
        package("broken", "3.0.0", &[]),
        package("app", "0.1.0", &[("patched", "~1.0.0"), ("broken", "^2.1.0")]),
    ]);
    let entries = sync_entries(&detect_outdated(&catalog));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries["app"], VersionTarget::Level(BumpLevel::Major));
}

#[test]
fn test_up_to_date_workspace_plans_nothing() {
    let catalog = catalog(vec![
        package("pkg-a", "1.0.0", &[]),
        package("pkg-b", "1.0.0", &[("pkg-a", "^1.0.0")]),
    ]);

    assert!(plan_sync(&catalog).unwrap().is_empty());
}

#[test]
fn test_sync_rewrites_lagging_requirement() {
    let catalog = catalog(vec![
        package("pkg-a", "1.2.0", &[]),
        package("pkg-b", "1.0.0", &[("pkg-a", "^1.0.0")]),
    ]);
    let queue = plan_sync(&catalog).unwrap();

    assert_eq!(queue.names().collect::<Vec<_>>(), vec!["pkg-b"]);
    let b = queue.get("pkg-b").unwrap();
    assert_eq!(b.new_version.to_string(), "1.1.0");
    assert_eq!(b.dependencies.len(), 1);
    assert_eq!(b.dependencies[0].name, "pkg-a");
    assert_eq!(b.dependencies[0].previous_version.to_string(), "^1.0.0");
    assert_eq!(b.dependencies[0].new_version.to_string(), "^1.2.0");
}

#[test]
fn test_sync_propagates_to_dependents() {
    let catalog = catalog(vec![
        package("pkg-a", "2.0.0", &[]),
        package("pkg-b", "1.0.0", &[("pkg-a", "1.0.0")]),
        package("pkg-c", "1.0.0", &[("pkg-b", "^1.0.0")]),
    ]);
    let queue = plan_sync(&catalog).unwrap();

    assert_eq!(queue.names().collect::<Vec<_>>(), vec!["pkg-b", "pkg-c"]);

    let b = queue.get("pkg-b").unwrap();
    assert_eq!(b.new_version.to_string(), "2.0.0");
    assert_eq!(b.dependencies[0].new_version.to_string(), "2.0.0");

    let c = queue.get("pkg-c").unwrap();
    assert_eq!(c.new_version.to_string(), "2.0.0");
    assert_eq!(c.dependencies.len(), 1);
    assert_eq!(c.dependencies[0].new_version.to_string(), "^2.0.0");
}
