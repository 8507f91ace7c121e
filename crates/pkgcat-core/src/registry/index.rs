//! Package index documents (`repo/meta/index.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PackageError, Result};

/// The catalog of every package in one registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Entries in index order
    pub packages: Vec<IndexEntry>,
    /// Fields other than `packages` (index format version, etc.)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One package as listed in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    /// Package-release versions, keyed by version identifier
    #[serde(default)]
    pub versions: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Remaining fields such as `currentVersion` or `framework`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Index {
    /// Parse an index document.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse the index at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PackageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|err| PackageError::parse(path.display().to_string(), err))
    }
}

impl IndexEntry {
    /// Version identifiers declared for this entry.
    pub fn version_ids(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }
}
