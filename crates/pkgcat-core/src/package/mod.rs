//! Versioned package descriptors.
//!
//! A package directory holds one subdirectory per package-release version.
//! Each version carries four descriptor files: metadata (`package.json`),
//! option schema (`config.json`), command descriptor (`command.json`) and the
//! install template (`marathon.json`).
//!
//! Versions are ordered by plain string comparison, so `"2.0"` sorts after
//! `"10.0"`. Package-release versions are not semantic versions.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{PackageError, Result};

/// Package metadata file name.
pub const METADATA_FILE: &str = "package.json";
/// Option schema file name.
pub const CONFIG_FILE: &str = "config.json";
/// Command descriptor file name.
pub const COMMAND_FILE: &str = "command.json";
/// Install template file name.
pub const TEMPLATE_FILE: &str = "marathon.json";

/// Interface to a package directory on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    path: PathBuf,
}

impl Package {
    /// Open the package rooted at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(PackageError::not_found(format!(
                "Package directory [{}]",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Package name, taken from the directory name.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All package-release versions, most recent first.
    pub fn versions(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.path).map_err(|err| PackageError::io(&self.path, err))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| PackageError::io(&self.path, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            versions.push(name);
        }
        versions.sort_unstable_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    /// The greatest version by string comparison.
    pub fn latest_version(&self) -> Result<String> {
        self.versions()?
            .into_iter()
            .max()
            .ok_or_else(|| PackageError::EmptyPackage { name: self.name() })
    }

    /// Parsed `package.json` for `version`.
    pub fn metadata(&self, version: &str) -> Result<Value> {
        self.read_json(version, METADATA_FILE)
    }

    /// Parsed `config.json` (a JSON schema) for `version`.
    pub fn config_schema(&self, version: &str) -> Result<Value> {
        self.read_json(version, CONFIG_FILE)
    }

    /// Parsed `command.json` for `version`.
    pub fn command_descriptor(&self, version: &str) -> Result<Value> {
        self.read_json(version, COMMAND_FILE)
    }

    /// Raw install template text for `version`.
    pub fn install_template(&self, version: &str) -> Result<String> {
        self.read_text(version, TEMPLATE_FILE)
    }

    /// Map each package version, newest first, to the software version it ships.
    ///
    /// Stops at the first version whose metadata cannot be read.
    pub fn software_versions(&self) -> Result<Vec<(String, String)>> {
        let mut mapping = Vec::new();
        for version in self.versions()? {
            let metadata = self.metadata(&version)?;
            let software = metadata
                .get("version")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    PackageError::parse(
                        self.descriptor_path(&version, METADATA_FILE).display().to_string(),
                        "missing string field `version`",
                    )
                })?;
            mapping.push((version, software.to_string()));
        }
        Ok(mapping)
    }

    fn descriptor_path(&self, version: &str, file: &str) -> PathBuf {
        self.path.join(version).join(file)
    }

    fn read_text(&self, version: &str, file: &str) -> Result<String> {
        if version.is_empty() || version.starts_with('.') || version.contains(['/', '\\']) {
            return Err(PackageError::InvalidArgument {
                detail: format!("Invalid package version [{}]", version),
            });
        }

        let path = self.descriptor_path(version, file);
        if !path.is_file() {
            return Err(PackageError::NotAFile { path });
        }
        std::fs::read_to_string(&path).map_err(|source| PackageError::Read { path, source })
    }

    fn read_json(&self, version: &str, file: &str) -> Result<Value> {
        let content = self.read_text(version, file)?;
        serde_json::from_str(&content).map_err(|err| {
            PackageError::parse(self.descriptor_path(version, file).display().to_string(), err)
        })
    }
}
