//! Traits for the manifest and package-manager collaborators.

use std::path::Path;

use crate::error::Result;
use crate::package::Package;

/// Reads and writes a package's manifest file.
///
/// Adapters only deal with the manifest; installing and publishing is
/// delegated to a [`PublishRunner`].
pub trait ManifestAdapter: Send + Sync {
    /// File name of the manifest inside a package directory.
    fn manifest_name(&self) -> &'static str;

    /// Loads the package in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing, malformed, or its version
    /// cannot be parsed.
    fn read_package(&self, dir: &Path) -> Result<Package>;

    /// Persists the package's current version and dependency requirements,
    /// keeping every other field of the original manifest.
    fn write_updated(&self, package: &Package) -> Result<()>;

    /// Writes the originally read manifest text back to disk.
    fn restore_raw(&self, package: &Package) -> Result<()>;
}

/// Runs the package manager for a package directory.
pub trait PublishRunner: Send + Sync {
    fn install(&self, dir: &Path) -> Result<()>;
    fn publish(&self, dir: &Path) -> Result<()>;
}
