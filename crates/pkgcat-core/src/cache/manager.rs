//! Locked, atomic refresh of the package cache.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PackageError, Result};
use crate::fs::replace_dir;
use crate::registry::{Registry, ScriptValidator, TreeValidator};
use crate::source::Source;

use super::lock::CacheLock;
use super::observer::{NoopObserver, RefreshObserver};

/// Prefix of per-source staging directories inside the cache root.
const STAGING_PREFIX: &str = ".staging-";

/// Outcome of a refresh that ran to completion.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Sources whose cache directory now holds fresh content, in refresh order
    pub updated: Vec<Source>,
    /// Fetch and validation failures, in source order
    pub errors: Vec<PackageError>,
}

impl RefreshReport {
    /// True when every source was updated.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writer for the cache root.
pub struct CacheManager {
    cache_root: PathBuf,
    validator: Box<dyn TreeValidator>,
    observer: Box<dyn RefreshObserver>,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("cache_root", &self.cache_root)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Manage the cache under `cache_root`, validating with the tree's own script.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            validator: Box::new(ScriptValidator::default()),
            observer: Box::new(NoopObserver),
        }
    }

    /// Replace the validation hook run on staged trees.
    pub fn with_validator(mut self, validator: impl TreeValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: impl RefreshObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Refresh the cache directory of every source, in order.
    ///
    /// Returns `Err` only when the refresh cannot start: the cache root is
    /// unusable or another process holds the lock. A source that fails to
    /// fetch or validate is recorded in the report and leaves its previous
    /// cache directory untouched; the remaining sources are still processed.
    pub fn refresh(&self, sources: &[Source]) -> Result<RefreshReport> {
        self.ensure_cache_root()?;
        let _lock = CacheLock::try_acquire(&self.cache_root)?;

        // Holding the lock means no other writer is alive, so any staging
        // directory left behind belongs to an interrupted refresh.
        self.remove_stale_staging();

        let mut report = RefreshReport::default();
        for source in sources {
            self.observer.source_started(source);
            match self.refresh_source(source) {
                Ok(cache_dir) => {
                    self.observer.source_updated(source, &cache_dir);
                    report.updated.push(source.clone());
                }
                Err(errors) => {
                    for error in &errors {
                        self.observer.source_failed(source, error);
                    }
                    report.errors.extend(errors);
                }
            }
        }
        Ok(report)
    }

    fn ensure_cache_root(&self) -> Result<()> {
        if !self.cache_root.exists() {
            fs::create_dir_all(&self.cache_root).map_err(|err| PackageError::Config {
                detail: format!(
                    "Could not create cache directory [{}]: {}",
                    self.cache_root.display(),
                    err
                ),
            })?;
        }
        if !self.cache_root.is_dir() {
            return Err(PackageError::Config {
                detail: format!(
                    "Cache directory does not exist! [{}]",
                    self.cache_root.display()
                ),
            });
        }
        Ok(())
    }

    /// Fetch, validate and promote one source.
    ///
    /// The staging area is a `TempDir`, so it is removed on every return path,
    /// together with the previous tree parked inside it.
    fn refresh_source(&self, source: &Source) -> std::result::Result<PathBuf, Vec<PackageError>> {
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.cache_root)
            .map_err(|err| vec![PackageError::io(&self.cache_root, err)])?;
        let stage_dir = staging.path().join(source.cache_key());

        source.fetch(&stage_dir).map_err(|err| vec![err])?;

        let errors = Registry::new(source.clone(), &stage_dir).validate(self.validator.as_ref());
        if !errors.is_empty() {
            return Err(errors);
        }

        let target = source.cache_dir(&self.cache_root);
        let parking = staging.path().join("previous");
        replace_dir(&stage_dir, &target, &parking).map_err(|err| {
            vec![PackageError::Io {
                path: target.clone(),
                source: err,
            }]
        })?;
        Ok(target)
    }

    fn remove_stale_staging(&self) {
        let Ok(entries) = fs::read_dir(&self.cache_root) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
                let _ = fs::remove_dir_all(entry.path());
            }
        }
    }
}
