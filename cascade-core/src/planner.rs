//! Publish planning: which packages to republish, at which versions, in which order.
//!
//! Planning happens in three passes over an immutable [`Catalog`]:
//!
//! 1. The entries are expanded through "used-by" edges into the affected set.
//! 2. Every affected package gets a weight and a new version. Dependencies are
//!    computed before their dependents with an explicit post-order stack.
//! 3. Packages are ordered by ascending weight and turned into
//!    [`PublishRecord`]s.

use std::collections::VecDeque;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::version::{BumpLevel, Version, VersionDiff, VersionTarget};

/// Why a package joined the affected set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// The caller asked for this package.
    Entry,
    /// A dependency with this name is republished.
    Package(String),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Entry => f.write_str("entry"),
            Provenance::Package(name) => f.write_str(name),
        }
    }
}

/// Affected package name to the reasons it was included.
pub type AffectedSet = IndexMap<String, IndexSet<Provenance>>;

/// Requested version changes keyed by entry package name.
pub type Entries = IndexMap<String, VersionTarget>;

/// A dependency requirement rewritten by a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub name: String,
    pub previous_version: Version,
    pub new_version: Version,
}

/// One package of a publish queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub name: String,
    pub previous_version: Version,
    pub new_version: Version,
    /// Sort key: 1 plus the weights of the republished dependencies.
    pub weight: u64,
    /// Requirements on other republished packages, in manifest order.
    pub dependencies: Vec<DependencyUpdate>,
    pub provenance: IndexSet<Provenance>,
}

impl PublishRecord {
    /// Level of the change between the previous and the new version.
    pub fn level(&self) -> Option<BumpLevel> {
        match self.new_version.compare(&self.previous_version) {
            VersionDiff::Equal => None,
            VersionDiff::Greater(level) | VersionDiff::Less(level) => Some(level),
        }
    }

    #[inline]
    pub fn is_entry(&self) -> bool {
        self.provenance.contains(&Provenance::Entry)
    }
}

/// Records in publish order: every package comes after the republished
/// packages it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishQueue {
    records: Vec<PublishRecord>,
}

impl PublishQueue {
    #[inline]
    pub fn records(&self) -> &[PublishRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [PublishRecord] {
        &mut self.records
    }

    pub fn get(&self, name: &str) -> Option<&PublishRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PublishRecord> {
        self.records.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a PublishQueue {
    type Item = &'a PublishRecord;
    type IntoIter = std::slice::Iter<'a, PublishRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Copy)]
struct Computed {
    weight: u64,
    version: Version,
}

/// Plans publishes over a catalog and its dependency graph.
pub struct PublishPlanner<'a> {
    catalog: &'a Catalog,
    graph: &'a DependencyGraph,
}

impl<'a> PublishPlanner<'a> {
    /// # Errors
    ///
    /// Returns an error if the catalog's dependency graph has a cycle.
    pub fn new(catalog: &'a Catalog) -> Result<Self> {
        let graph = catalog.graph()?;
        Ok(Self { catalog, graph })
    }

    /// Collects the entries and every package that transitively depends on
    /// them, together with the packages that caused each inclusion.
    ///
    /// Names that are not in the catalog are ignored.
    pub fn expand<'n>(&self, entries: impl IntoIterator<Item = &'n str>) -> AffectedSet {
        let mut affected = AffectedSet::new();
        let mut queue: VecDeque<(String, Provenance)> = entries
            .into_iter()
            .map(|name| (name.to_string(), Provenance::Entry))
            .collect();

        while let Some((name, from)) = queue.pop_front() {
            if !self.catalog.contains(&name) {
                continue;
            }
            if let Some(provenance) = affected.get_mut(&name) {
                provenance.insert(from);
                continue;
            }

            for user in self.graph.used_by(&name) {
                queue.push_back((user, Provenance::Package(name.clone())));
            }
            affected.insert(name, IndexSet::from([from]));
        }

        affected
    }

    /// Builds the publish queue for `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if an entry is not in the catalog.
    pub fn plan(&self, entries: &Entries) -> Result<PublishQueue> {
        if let Some(missing) = entries.keys().find(|name| !self.catalog.contains(name)) {
            return Err(self.catalog.not_found(missing));
        }

        let affected = self.expand(entries.keys().map(String::as_str));
        debug!(entries = entries.len(), affected = affected.len(), "expanded entries");

        let computed = self.compute(&affected, entries)?;

        let mut ordered: Vec<(&String, &Computed)> = computed.iter().collect();
        ordered.sort_by_key(|(_, c)| c.weight);

        let mut records = Vec::with_capacity(ordered.len());
        for (name, result) in ordered {
            let package = self
                .catalog
                .get(name)
                .ok_or_else(|| self.catalog.not_found(name))?;

            let dependencies = package
                .dependencies
                .iter()
                .filter_map(|(dep_name, required)| {
                    computed.get(dep_name).map(|dep| DependencyUpdate {
                        name: dep_name.clone(),
                        previous_version: *required,
                        new_version: dep.version.with_prefix(required.prefix),
                    })
                })
                .collect();

            records.push(PublishRecord {
                name: name.clone(),
                previous_version: package.version,
                new_version: result.version,
                weight: result.weight,
                dependencies,
                provenance: affected.get(name).cloned().unwrap_or_default(),
            });
        }

        Ok(PublishQueue { records })
    }

    /// Affected dependencies of `name`.
    fn affected_dependencies(&self, name: &str, affected: &AffectedSet) -> Vec<String> {
        self.graph
            .dependencies(name)
            .into_iter()
            .filter(|dep| affected.contains_key(dep))
            .collect()
    }

    fn compute(&self, affected: &AffectedSet, entries: &Entries) -> Result<IndexMap<String, Computed>> {
        let mut computed: IndexMap<String, Computed> = IndexMap::with_capacity(affected.len());

        for root in affected.keys() {
            let mut stack: Vec<(String, bool)> = vec![(root.clone(), false)];

            while let Some((name, expanded)) = stack.pop() {
                if computed.contains_key(&name) {
                    continue;
                }
                let deps = self.affected_dependencies(&name, affected);

                if !expanded {
                    stack.push((name, true));
                    for dep in deps.into_iter().rev() {
                        if !computed.contains_key(&dep) {
                            stack.push((dep, false));
                        }
                    }
                    continue;
                }

                let package = self
                    .catalog
                    .get(&name)
                    .ok_or_else(|| self.catalog.not_found(&name))?;

                let mut weight: u64 = 1;
                let mut level = BumpLevel::Patch;
                for dep in &deps {
                    let dep_result = computed.get(dep).ok_or_else(|| {
                        Error::Graph(format!("{} was planned before its dependency {}", name, dep))
                    })?;
                    weight = weight.saturating_add(dep_result.weight);

                    if let Some(required) = package.requires(dep) {
                        if let VersionDiff::Greater(diff) = dep_result.version.compare(required) {
                            level = level.max(diff);
                        }
                    }
                }

                // Entries take the requested target as is.
                let target = entries
                    .get(&name)
                    .cloned()
                    .unwrap_or(VersionTarget::Level(level));
                let version = package.version.bump(&target)?;

                trace!(package = %name, weight, %version, "computed publish version");
                computed.insert(name, Computed { weight, version });
            }
        }

        Ok(computed)
    }
}

/// Plans a publish of `entries` over `catalog`.
///
/// # Errors
///
/// Returns an error if the catalog has a dependency cycle or an entry is not
/// a catalog package.
pub fn arrange_publish_queue(catalog: &Catalog, entries: &Entries) -> Result<PublishQueue> {
    PublishPlanner::new(catalog)?.plan(entries)
}
