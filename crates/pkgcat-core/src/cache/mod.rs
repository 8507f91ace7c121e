//! Local package cache.
//!
//! The cache root holds one directory per source, named by the source's cache
//! key, plus a `.lock` file serializing writers:
//!
//! ```text
//! <cache_root>/.lock
//! <cache_root>/<sha1(uri)>/repo/...
//! ```
//!
//! Only [`CacheManager::refresh`] writes here. Each source directory is swapped
//! in by rename, so readers see either the previous tree or the new one.

mod lock;
mod manager;
mod observer;

pub use lock::{CacheLock, LOCK_FILE};
pub use manager::{CacheManager, RefreshReport};
pub use observer::{NoopObserver, RefreshObserver, TracingObserver};
