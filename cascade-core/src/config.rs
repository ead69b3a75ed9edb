//! Workspace configuration stored in `cascade.toml` at the workspace root.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the file marking a directory as the workspace root.
pub const CONFIG_FILE: &str = "cascade.toml";

/// Package manager used for the install step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Client {
    Npm,
    Yarn,
}

/// Contents of `cascade.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Workspace-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Forces a package manager instead of detecting one per package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    /// Whether dependencies are installed before each publish.
    #[serde(default = "default_install")]
    pub install: bool,
}

fn default_install() -> bool {
    true
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            client: None,
            install: default_install(),
        }
    }
}

impl Config {
    /// Loads `cascade.toml` from `root`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|error| crate::Error::Toml {
            error,
            context: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Writes a fresh `cascade.toml` into `dir` unless one already exists.
    ///
    /// Returns `true` when a file was created.
    pub fn init(dir: &Path) -> Result<bool> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        let content = format!(
            "# Marks this directory as the root of a cascade workspace.\n{}",
            toml::to_string(&Config::default())?
        );
        std::fs::write(&path, content)?;
        Ok(true)
    }
}
