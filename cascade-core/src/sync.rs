//! Detection of packages whose workspace dependency requirements lag behind.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::planner::{DependencyUpdate, Entries, PublishPlanner, PublishQueue};
use crate::version::{BumpLevel, Version, VersionDiff, VersionTarget};

/// A dependency requirement older than the dependency's current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedDependency {
    pub name: String,
    pub required: Version,
    pub current: Version,
    pub level: BumpLevel,
}

/// Packages with outdated requirements, keyed by package name.
pub type OutdatedPackages = IndexMap<String, Vec<OutdatedDependency>>;

/// Finds every workspace requirement that is lower than the version the
/// dependency currently has.
pub fn detect_outdated(catalog: &Catalog) -> OutdatedPackages {
    let mut outdated = OutdatedPackages::new();

    for package in catalog.packages() {
        for (dep_name, required) in &package.dependencies {
            let Some(dependency) = catalog.get(dep_name) else {
                continue;
            };
            if let VersionDiff::Less(level) = required.compare(&dependency.version) {
                debug!(
                    package = %package.name,
                    dependency = %dep_name,
                    %required,
                    current = %dependency.version,
                    "outdated requirement"
                );
                outdated
                    .entry(package.name.clone())
                    .or_default()
                    .push(OutdatedDependency {
                        name: dep_name.clone(),
                        required: *required,
                        current: dependency.version,
                        level,
                    });
            }
        }
    }

    outdated
}

/// Turns outdated packages into planner entries, each bumped by the most
/// significant lag among its dependencies.
pub fn sync_entries(outdated: &OutdatedPackages) -> Entries {
    outdated
        .iter()
        .filter_map(|(name, deps)| {
            let level = deps.iter().map(|d| d.level).max()?;
            Some((name.clone(), VersionTarget::Level(level)))
        })
        .collect()
}

/// Plans the publishes that bring every outdated requirement up to date.
///
/// Besides the planner's own dependency updates, each outdated package's
/// record rewrites its lagging requirements to the dependency's current
/// version, keeping the requirement's prefix.
///
/// # Errors
///
/// Returns an error if the catalog's dependency graph has a cycle.
pub fn plan_sync(catalog: &Catalog) -> Result<PublishQueue> {
    let outdated = detect_outdated(catalog);
    if outdated.is_empty() {
        return Ok(PublishQueue::default());
    }

    let entries = sync_entries(&outdated);
    let mut queue = PublishPlanner::new(catalog)?.plan(&entries)?;

    for record in queue.records_mut() {
        let Some(lagging) = outdated.get(&record.name) else {
            continue;
        };
        for dep in lagging {
            if record.dependencies.iter().any(|u| u.name == dep.name) {
                continue;
            }
            record.dependencies.push(DependencyUpdate {
                name: dep.name.clone(),
                previous_version: dep.required,
                new_version: dep.current.with_prefix(dep.required.prefix),
            });
        }
    }

    Ok(queue)
}
