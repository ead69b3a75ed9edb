use anyhow::Result;
use cascade_core::plan_sync;

use crate::formatting::print_success;

use super::Workspace;

pub fn cmd_sync() -> Result<()> {
    let workspace = Workspace::open()?;
    let queue = plan_sync(&workspace.catalog)?;

    if queue.is_empty() {
        print_success("All workspace dependencies are up to date");
        println!();
        return Ok(());
    }

    workspace.publish("Sync Plan", &queue)
}
