//! Package data model.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

use crate::planner::PublishRecord;
use crate::version::Version;

/// Manifest categories whose entries are merged into [`Package::dependencies`].
pub const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// The manifest exactly as it was read from disk.
///
/// Never changes over the package's lifetime so that a failed publish can
/// write the original text back.
#[derive(Debug, Clone)]
pub struct RawManifest {
    pub value: Value,
    pub text: String,
}

/// A package of the workspace.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub version: Version,
    /// Required version per dependency, merged across all dependency sections.
    pub dependencies: IndexMap<String, Version>,
    pub manifest: RawManifest,
    pub path: PathBuf,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        dependencies: IndexMap<String, Version>,
        manifest: RawManifest,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies,
            manifest,
            path: path.into(),
        }
    }

    /// Records `required` for `name`, keeping the higher of two requirements
    /// when the dependency appears in more than one section.
    pub fn merge_dependency(
        dependencies: &mut IndexMap<String, Version>,
        name: &str,
        required: Version,
    ) {
        match dependencies.get_mut(name) {
            Some(existing) => {
                if matches!(
                    required.compare(existing),
                    crate::version::VersionDiff::Greater(_)
                ) {
                    *existing = required;
                }
            }
            None => {
                dependencies.insert(name.to_string(), required);
            }
        }
    }

    /// Applies a planned publish to this package.
    ///
    /// Only the manifest-level fields change; [`Package::manifest`] keeps the
    /// original content.
    pub fn apply(&mut self, record: &PublishRecord) {
        self.version = record.new_version;
        for update in &record.dependencies {
            self.dependencies
                .insert(update.name.clone(), update.new_version);
        }
    }

    #[inline]
    pub fn requires(&self, dependency: &str) -> Option<&Version> {
        self.dependencies.get(dependency)
    }
}
