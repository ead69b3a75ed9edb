//! Command implementations for the CLI.

mod init;
mod publish;
mod reporter;
mod sync;

use std::path::PathBuf;

use anyhow::Result;
use cascade_adapters::{NpmManifest, NpmRunner};
use cascade_core::{find_root, Catalog, Config, PublishExecutor, PublishQueue};
use tracing::debug;

use crate::formatting::{
    print_key_value, print_publish_table, print_section_header, print_success,
};

use self::reporter::CliPublishReporter;

pub use init::cmd_init;
pub use publish::cmd_publish;
pub use sync::cmd_sync;

pub fn cmd_version() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

/// The workspace the current directory belongs to.
struct Workspace {
    cwd: PathBuf,
    config: Config,
    catalog: Catalog,
}

impl Workspace {
    fn open() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = find_root(&cwd, &NpmManifest);
        let config = Config::load(&root)?;
        let catalog = Catalog::load(&root, &NpmManifest)?;
        debug!(root = %root.display(), packages = catalog.len(), "opened workspace");
        Ok(Self {
            cwd,
            config,
            catalog,
        })
    }

    /// Prints the queue, then publishes it.
    fn publish(mut self, title: &str, queue: &PublishQueue) -> Result<()> {
        print_section_header(title);
        print_key_value("Workspace", &self.catalog.root().display().to_string());
        print_publish_table(queue);
        println!();

        let executor = PublishExecutor::new(
            NpmManifest,
            NpmRunner::with_client(self.config.workspace.client),
            CliPublishReporter,
        )
        .with_install(self.config.workspace.install);
        executor.execute(&mut self.catalog, queue)?;

        print_success(&format!("Published {} packages", queue.len()));
        println!();
        Ok(())
    }
}
