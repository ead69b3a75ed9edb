//! Core library for planning and publishing interdependent workspace packages.

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod graph;
pub mod package;
pub mod planner;
pub mod reporter;
pub mod sync;
pub mod version;

pub use adapter::{ManifestAdapter, PublishRunner};
pub use catalog::{find_root, Catalog};
pub use config::{Client, Config, WorkspaceConfig};
pub use error::{Error, Result};
pub use executor::PublishExecutor;
pub use graph::DependencyGraph;
pub use package::{Package, RawManifest};
pub use planner::{
    arrange_publish_queue, AffectedSet, DependencyUpdate, Entries, Provenance, PublishPlanner,
    PublishQueue, PublishRecord,
};
pub use reporter::{PublishReporter, SilentReporter};
pub use sync::{detect_outdated, plan_sync, OutdatedDependency};
pub use version::{BumpLevel, Prefix, Version, VersionDiff, VersionTarget};
