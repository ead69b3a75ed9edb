use std::path::Path;
use std::process::{Command, Stdio};

use cascade_core::adapter::PublishRunner;
use cascade_core::config::Client;
use cascade_core::error::{Error, Result};
use tracing::{debug, info};

/// Installs and publishes packages with npm, or yarn where the package uses it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NpmRunner {
    client: Option<Client>,
}

impl NpmRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always installs with `client` instead of detecting it per package.
    pub fn with_client(client: Option<Client>) -> Self {
        Self { client }
    }

    /// Picks the install client for a package directory.
    ///
    /// Yarn is used when its binary is available and the package either has a
    /// `yarn.lock` or no `package-lock.json`.
    pub fn detect_client(&self, dir: &Path) -> Client {
        if let Some(client) = self.client {
            return client;
        }
        let has_yarn = shell(dir, "yarn --version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        debug!(dir = %dir.display(), has_yarn, "probed for yarn");

        if has_yarn
            && (dir.join("yarn.lock").is_file() || !dir.join("package-lock.json").is_file())
        {
            Client::Yarn
        } else {
            Client::Npm
        }
    }
}

fn shell(dir: &Path, command: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C");
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c");
        cmd
    };
    cmd.arg(command).current_dir(dir);
    cmd
}

/// Runs `command` in `dir` with inherited stdio.
fn execute(dir: &Path, command: &str) -> Result<()> {
    info!("Execute: `{}` at {}", command, dir.display());
    let status = shell(dir, command).status()?;
    if !status.success() {
        return Err(Error::CommandFailed {
            command: command.to_string(),
            dir: dir.to_path_buf(),
            code: status.code(),
        });
    }
    Ok(())
}

impl PublishRunner for NpmRunner {
    fn install(&self, dir: &Path) -> Result<()> {
        let command = match self.detect_client(dir) {
            Client::Yarn => "yarn",
            Client::Npm => "npm install",
        };
        execute(dir, command)
    }

    fn publish(&self, dir: &Path) -> Result<()> {
        execute(dir, "npm publish")
    }
}
