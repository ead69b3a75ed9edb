//! npm adapters for Cascade: the `package.json` manifest and the npm/yarn
//! command runner.

pub mod npm;
pub mod runner;

pub use npm::NpmManifest;
pub use runner::NpmRunner;
