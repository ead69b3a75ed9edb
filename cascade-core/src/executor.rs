//! Sequential execution of a publish queue.

use tracing::{info, warn};

use crate::adapter::{ManifestAdapter, PublishRunner};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::planner::{PublishQueue, PublishRecord};
use crate::reporter::PublishReporter;

/// Applies planned publishes to the catalog and runs the package manager.
///
/// Records are processed strictly in queue order. The first failure stops the
/// queue: the failing package's manifest is restored, packages published
/// before it keep their changes.
pub struct PublishExecutor {
    manifests: Box<dyn ManifestAdapter>,
    runner: Box<dyn PublishRunner>,
    reporter: Box<dyn PublishReporter>,
    install: bool,
}

impl PublishExecutor {
    pub fn new<M, P, R>(manifests: M, runner: P, reporter: R) -> Self
    where
        M: ManifestAdapter + 'static,
        P: PublishRunner + 'static,
        R: PublishReporter + 'static,
    {
        Self {
            manifests: Box::new(manifests),
            runner: Box::new(runner),
            reporter: Box::new(reporter),
            install: true,
        }
    }

    /// Whether dependencies are installed before each publish.
    pub fn with_install(mut self, install: bool) -> Self {
        self.install = install;
        self
    }

    /// Publishes every record of `queue`.
    ///
    /// # Errors
    ///
    /// Returns the first manifest or command error; remaining records are not
    /// attempted. A failure to restore the manifest afterwards is logged and
    /// does not replace the command error.
    pub fn execute(&self, catalog: &mut Catalog, queue: &PublishQueue) -> Result<()> {
        let total = queue.len();
        for (idx, record) in queue.iter().enumerate() {
            self.reporter.report_start(record, idx + 1, total);
            self.publish_one(catalog, record)?;
            self.reporter.report_published(record);
        }
        Ok(())
    }

    fn publish_one(&self, catalog: &mut Catalog, record: &PublishRecord) -> Result<()> {
        let not_found = catalog.not_found(&record.name);
        let package = catalog.get_mut(&record.name).ok_or(not_found)?;

        package.apply(record);
        self.manifests.write_updated(package)?;
        info!(package = %package.name, version = %package.version, "updated manifest");

        let outcome = if self.install {
            self.runner
                .install(&package.path)
                .and_then(|()| self.runner.publish(&package.path))
        } else {
            self.runner.publish(&package.path)
        };

        if let Err(e) = outcome {
            warn!(package = %package.name, error = %e, "publish failed, restoring manifest");
            if let Err(restore) = self.manifests.restore_raw(package) {
                warn!(package = %package.name, error = %restore, "failed to restore manifest");
            }
            return Err(e);
        }

        Ok(())
    }
}
