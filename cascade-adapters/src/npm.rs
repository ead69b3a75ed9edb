use std::fs;
use std::path::Path;

use cascade_core::adapter::ManifestAdapter;
use cascade_core::error::{Error, Result};
use cascade_core::package::{Package, RawManifest, DEPENDENCY_SECTIONS};
use cascade_core::version::Version;
use indexmap::IndexMap;
use serde_json::Value;

const MANIFEST: &str = "package.json";

/// Reads and writes `package.json` manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NpmManifest;

fn invalid(path: &Path, message: impl Into<String>) -> Error {
    Error::InvalidManifest {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

impl NpmManifest {
    /// Renders the package's updated fields on top of its original manifest.
    ///
    /// Key order and unknown fields are kept, and whatever text followed the
    /// top-level object in the original file (usually a trailing newline) is
    /// appended unchanged.
    pub fn render(&self, package: &Package) -> Result<String> {
        let mut updated = package.manifest.value.clone();
        let object = updated
            .as_object_mut()
            .ok_or_else(|| invalid(&package.path, "manifest is not a JSON object"))?;

        object.insert("name".to_string(), Value::String(package.name.clone()));
        object.insert(
            "version".to_string(),
            Value::String(package.version.to_string()),
        );

        for section in DEPENDENCY_SECTIONS {
            let Some(Value::Object(deps)) = object.get_mut(section) else {
                continue;
            };
            for (dep_name, requirement) in deps.iter_mut() {
                let Some(version) = package.dependencies.get(dep_name) else {
                    continue;
                };
                // Requirements such as `file:` or `workspace:` links are left alone.
                let parses = requirement
                    .as_str()
                    .and_then(Version::parse)
                    .is_some();
                if parses {
                    *requirement = Value::String(version.to_string());
                }
            }
        }

        let text = &package.manifest.text;
        let trailing = text.rfind('}').map(|idx| &text[idx + 1..]).unwrap_or("");
        Ok(serde_json::to_string_pretty(&updated)? + trailing)
    }

    fn write(&self, package: &Package, content: &str) -> Result<()> {
        let path = package.path.join(MANIFEST);
        fs::write(&path, content)
            .map_err(|e| invalid(&path, format!("failed to write {}: {}", MANIFEST, e)))
    }
}

impl ManifestAdapter for NpmManifest {
    fn manifest_name(&self) -> &'static str {
        MANIFEST
    }

    fn read_package(&self, dir: &Path) -> Result<Package> {
        let path = dir.join(MANIFEST);
        let text = fs::read_to_string(&path)
            .map_err(|e| invalid(dir, format!("failed to read {}: {}", MANIFEST, e)))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| invalid(dir, format!("failed to parse {}: {}", MANIFEST, e)))?;
        if !value.is_object() {
            return Err(invalid(dir, "manifest is not a JSON object"));
        }

        let raw_version = value.get("version").and_then(Value::as_str).unwrap_or("");
        let version = Version::parse(raw_version)
            .ok_or_else(|| invalid(dir, format!("invalid version '{}'", raw_version)))?;

        let mut dependencies = IndexMap::new();
        for section in DEPENDENCY_SECTIONS {
            let Some(Value::Object(deps)) = value.get(section) else {
                continue;
            };
            for (dep_name, requirement) in deps {
                if let Some(required) = requirement.as_str().and_then(Version::parse) {
                    Package::merge_dependency(&mut dependencies, dep_name, required);
                }
            }
        }

        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| {
                dir.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .ok_or_else(|| invalid(dir, "package has no name"))?;

        Ok(Package::new(
            name,
            version,
            dependencies,
            RawManifest { value, text },
            dir,
        ))
    }

    fn write_updated(&self, package: &Package) -> Result<()> {
        let content = self.render(package)?;
        self.write(package, &content)
    }

    fn restore_raw(&self, package: &Package) -> Result<()> {
        self.write(package, &package.manifest.text)
    }
}
