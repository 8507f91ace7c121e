//! Package operations bound to the configured sources and cache.

use crate::cache::{CacheManager, RefreshObserver, RefreshReport};
use crate::config::{ConfigProvider, PackageSettings};
use crate::error::{PackageError, Result};
use crate::package::Package;
use crate::registry::{Registry, TreeValidator};
use crate::search::{self, IndexEntries};
use crate::source::{Source, SourceResolver};

/// Entry point for catalog operations over one configuration.
///
/// Nothing is cached between calls: every operation re-reads the sources and
/// the on-disk cache.
#[derive(Debug, Clone)]
pub struct PackageCatalog {
    settings: PackageSettings,
}

impl PackageCatalog {
    pub fn new(settings: PackageSettings) -> Self {
        Self { settings }
    }

    /// Build a catalog from `package.sources` and `package.cache`.
    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        Ok(Self::new(PackageSettings::from_provider(config)?))
    }

    pub fn settings(&self) -> &PackageSettings {
        &self.settings
    }

    /// Configured sources in resolution order, plus one error per bad URI.
    pub fn list_sources(&self) -> (Vec<Source>, Vec<PackageError>) {
        SourceResolver::parse_all(&self.settings.sources)
    }

    /// Registries over the committed cache, in resolution order.
    ///
    /// Sources whose URI does not resolve are skipped.
    pub fn registries(&self) -> Vec<Registry> {
        let (sources, _) = self.list_sources();
        sources
            .into_iter()
            .map(|source| Registry::cached(source, &self.settings.cache_dir))
            .collect()
    }

    /// First package named `name`, searching registries in order.
    pub fn resolve_package(&self, name: &str) -> Result<Package> {
        for registry in self.registries() {
            match registry.package(name) {
                Ok(package) => return Ok(package),
                Err(PackageError::NotFound { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(PackageError::not_found(format!("Package [{}]", name)))
    }

    /// Search all registries for `query`.
    pub fn search(&self, query: &str) -> Result<Vec<IndexEntries>> {
        search::search(query, &self.registries())
    }

    /// Refresh the cache from every configured source.
    ///
    /// If any source URI is invalid nothing is fetched and the resolution
    /// errors are returned in the report.
    pub fn update(
        &self,
        validator: impl TreeValidator + 'static,
        observer: impl RefreshObserver + 'static,
    ) -> Result<RefreshReport> {
        let (sources, errors) = self.list_sources();
        if !errors.is_empty() {
            return Ok(RefreshReport {
                updated: Vec::new(),
                errors,
            });
        }

        CacheManager::new(&self.settings.cache_dir)
            .with_validator(validator)
            .with_observer(observer)
            .refresh(&sources)
    }
}
