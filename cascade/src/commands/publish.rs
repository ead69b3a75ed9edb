use anyhow::Result;
use cascade_adapters::NpmManifest;
use cascade_core::{arrange_publish_queue, Entries, VersionTarget};

use super::Workspace;

pub fn cmd_publish(packages: Vec<String>, target: Option<String>) -> Result<()> {
    let target = target.as_deref().map(VersionTarget::parse).transpose()?;
    let workspace = Workspace::open()?;
    let catalog = &workspace.catalog;

    let selected = if packages.is_empty() {
        vec![catalog.detect_package(&workspace.cwd, &NpmManifest)?]
    } else {
        packages
            .iter()
            .map(|keyword| catalog.resolve(keyword, &NpmManifest))
            .collect::<cascade_core::Result<Vec<_>>>()?
    };

    // Without a target each package is republished at its current version.
    let entries: Entries = selected
        .into_iter()
        .map(|package| {
            let target = target
                .clone()
                .unwrap_or(VersionTarget::Explicit(package.version));
            (package.name.clone(), target)
        })
        .collect();

    let queue = arrange_publish_queue(catalog, &entries)?;
    workspace.publish("Publish Plan", &queue)
}
