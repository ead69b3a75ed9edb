//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

use crate::version::BumpLevel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Package not found: {name}. Available packages: {available}")]
    PackageNotFound { name: String, available: String },

    #[error("Invalid version description: {0}. Expected major, minor, patch or a version like 1.2.3")]
    InvalidVersion(String),

    #[error("Cannot bump {version}: {level} component overflows")]
    VersionOverflow { version: String, level: BumpLevel },

    #[error("Invalid package at {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    #[error("Command `{command}` failed in {dir} with {}", exit_status(.code))]
    CommandFailed {
        command: String,
        dir: PathBuf,
        code: Option<i32>,
    },

    #[error("Not in a package directory, specify the packages to publish")]
    NotInPackage,

    #[error("Graph error: {0}")]
    Graph(String),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "cascade.toml".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
