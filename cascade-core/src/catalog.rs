//! Package discovery and the in-memory package catalog.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::adapter::ManifestAdapter;
use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::package::Package;

/// The packages found under a workspace root, keyed by name.
///
/// The dependency graph is derived on first use and cached; package names and
/// dependency names never change while a catalog is alive.
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    packages: IndexMap<String, Package>,
    graph: OnceCell<DependencyGraph>,
}

impl Catalog {
    /// Creates a catalog from already loaded packages.
    pub fn from_packages(root: impl Into<PathBuf>, packages: Vec<Package>) -> Self {
        let mut map = IndexMap::with_capacity(packages.len());
        for package in packages {
            if let Some(previous) = map.insert(package.name.clone(), package) {
                warn!(
                    package = %previous.name,
                    path = %previous.path.display(),
                    "duplicate package name, keeping the later one"
                );
            }
        }
        Self {
            root: root.into(),
            packages: map,
            graph: OnceCell::new(),
        }
    }

    /// Loads every package directly below `root`.
    ///
    /// Directories that are not valid packages are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if `root` itself cannot be read.
    pub fn load(root: impl AsRef<Path>, adapter: &dyn ManifestAdapter) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::metadata(&root)?;

        let dirs: Vec<PathBuf> = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        let loaded: Vec<(PathBuf, Result<Package>)> = dirs
            .into_par_iter()
            .map(|dir| {
                let package = adapter.read_package(&dir);
                (dir, package)
            })
            .collect();

        let mut packages = Vec::with_capacity(loaded.len());
        for (dir, package) in loaded {
            match package {
                Ok(package) => packages.push(package),
                Err(e) => debug!(dir = %dir.display(), error = %e, "skipping directory"),
            }
        }

        debug!(root = %root.display(), count = packages.len(), "loaded packages");
        Ok(Self::from_packages(root, packages))
    }

    /// Loads the single package in `dir`.
    ///
    /// Unlike [`Catalog::load`], a directory that is not a valid package is an
    /// error.
    pub fn load_package(dir: impl AsRef<Path>, adapter: &dyn ManifestAdapter) -> Result<Package> {
        adapter.read_package(dir.as_ref())
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Returns the dependency graph, building it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CircularDependency`] if the packages form a cycle.
    pub fn graph(&self) -> Result<&DependencyGraph> {
        self.graph
            .get_or_try_init(|| DependencyGraph::new(&self.packages))
    }

    pub(crate) fn not_found(&self, name: &str) -> Error {
        let available: Vec<&str> = self.names().collect();
        Error::PackageNotFound {
            name: name.to_string(),
            available: available.join(", "),
        }
    }

    /// Finds a package by name, falling back to its directory name under the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PackageNotFound`] if neither matches, or the load
    /// error of the named directory if it holds a manifest that does not load.
    pub fn resolve(&self, keyword: &str, adapter: &dyn ManifestAdapter) -> Result<&Package> {
        if let Some(package) = self.get(keyword) {
            return Ok(package);
        }
        self.package_in(&self.root.join(keyword), adapter)?
            .ok_or_else(|| self.not_found(keyword))
    }

    /// Returns the package whose directory contains `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInPackage`] if `cwd` is outside every package
    /// directory, or the load error of the enclosing directory if its
    /// manifest does not load.
    pub fn detect_package(&self, cwd: &Path, adapter: &dyn ManifestAdapter) -> Result<&Package> {
        let root = canonical(&self.root);
        let cwd = canonical(cwd);
        let dir = cwd
            .strip_prefix(&root)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|first| root.join(first))
            .ok_or(Error::NotInPackage)?;
        self.package_in(&dir, adapter)?.ok_or(Error::NotInPackage)
    }

    /// The catalog package located in `dir`.
    ///
    /// A directory with a manifest that was skipped while scanning is loaded
    /// again so that its error reaches the caller.
    fn package_in(&self, dir: &Path, adapter: &dyn ManifestAdapter) -> Result<Option<&Package>> {
        if let Some(package) = self.packages().find(|p| same_path(&p.path, dir)) {
            return Ok(Some(package));
        }
        if !dir.join(adapter.manifest_name()).is_file() {
            return Ok(None);
        }
        let package = Self::load_package(dir, adapter)?;
        debug!(
            package = %package.name,
            dir = %dir.display(),
            "package loads but is shadowed by a duplicate name"
        );
        Ok(None)
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn same_path(a: &Path, b: &Path) -> bool {
    canonical(a) == canonical(b)
}

/// Locates the workspace root for `start`.
///
/// Walking upwards, the first directory that either holds `cascade.toml` or has
/// a subdirectory containing a valid package is the root. When no such
/// directory exists, `start` itself is used.
pub fn find_root(start: impl AsRef<Path>, adapter: &dyn ManifestAdapter) -> PathBuf {
    let start = canonical(start.as_ref());
    let mut current = start.as_path();

    loop {
        if is_root(current, adapter) {
            debug!(root = %current.display(), "found workspace root");
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => break,
        }
    }

    debug!(root = %start.display(), "no workspace root found, using start directory");
    start
}

fn is_root(dir: &Path, adapter: &dyn ManifestAdapter) -> bool {
    if dir.join(CONFIG_FILE).is_file() {
        return true;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .any(|e| adapter.read_package(&e.path()).is_ok())
}
