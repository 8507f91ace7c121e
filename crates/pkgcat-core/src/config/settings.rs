//! Typed view of the settings package operations need.

use std::path::PathBuf;

use crate::error::{PackageError, Result};

use super::ConfigProvider;

/// Key holding the ordered list of source URIs.
pub const SOURCES_KEY: &str = "package.sources";
/// Key holding the cache root path.
pub const CACHE_KEY: &str = "package.cache";

/// Package sources and cache location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    /// Source URIs in resolution order
    pub sources: Vec<String>,
    /// Cache root directory
    pub cache_dir: PathBuf,
}

impl PackageSettings {
    pub fn new(sources: Vec<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            cache_dir: cache_dir.into(),
        }
    }

    /// Read both settings, failing with a config error if either is missing.
    pub fn from_provider(config: &dyn ConfigProvider) -> Result<Self> {
        Ok(Self {
            sources: Self::sources_from(config)?,
            cache_dir: Self::cache_dir_from(config)?,
        })
    }

    /// Read only the source list.
    pub fn sources_from(config: &dyn ConfigProvider) -> Result<Vec<String>> {
        let value = config.get(SOURCES_KEY).ok_or_else(|| missing(SOURCES_KEY))?;
        let array = value.as_array().ok_or_else(|| PackageError::Config {
            detail: format!("[{}] must be a list of URIs", SOURCES_KEY),
        })?;

        array
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| PackageError::Config {
                    detail: format!("[{}] entries must be strings, found {}", SOURCES_KEY, item),
                })
            })
            .collect()
    }

    /// Read only the cache root.
    pub fn cache_dir_from(config: &dyn ConfigProvider) -> Result<PathBuf> {
        let value = config.get(CACHE_KEY).ok_or_else(|| missing(CACHE_KEY))?;
        value
            .as_str()
            .map(PathBuf::from)
            .ok_or_else(|| PackageError::Config {
                detail: format!("[{}] must be a path", CACHE_KEY),
            })
    }
}

fn missing(key: &str) -> PackageError {
    PackageError::Config {
        detail: format!("No configured value for [{}]", key),
    }
}
