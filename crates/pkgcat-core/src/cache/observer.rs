//! Progress reporting for cache refreshes.
//!
//! The refresh loop never logs on its own; it reports to whatever observer the
//! caller hands in.

use std::path::Path;

use crate::error::PackageError;
use crate::source::Source;

/// Receives per-source progress events during a refresh.
pub trait RefreshObserver {
    /// A source is about to be fetched.
    fn source_started(&self, _source: &Source) {}

    /// A source's cache directory was replaced.
    fn source_updated(&self, _source: &Source, _cache_dir: &Path) {}

    /// A source was skipped because of `error`.
    fn source_failed(&self, _source: &Source, _error: &PackageError) {}
}

/// Observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RefreshObserver for NoopObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RefreshObserver for TracingObserver {
    fn source_started(&self, source: &Source) {
        tracing::info!(source = %source, "Updating source");
    }

    fn source_updated(&self, source: &Source, cache_dir: &Path) {
        tracing::debug!(source = %source, cache_dir = %cache_dir.display(), "Source updated");
    }

    fn source_failed(&self, source: &Source, error: &PackageError) {
        tracing::warn!(source = %source, error = %error, "Source update failed");
    }
}
