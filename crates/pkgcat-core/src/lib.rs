//! pkgcat Core Library
//!
//! Package catalog for a cluster orchestrator: resolves package sources,
//! keeps a validated local mirror of them, searches it, and assembles
//! install descriptors for the workload-init client.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod install;
pub mod package;
pub mod registry;
pub mod search;
pub mod source;

pub use error::{PackageError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigProvider, PackageSettings, TomlConfig};

    // Sources
    pub use crate::source::{Source, SourceResolver};

    // Cache
    pub use crate::cache::{
        CacheManager, NoopObserver, RefreshObserver, RefreshReport, TracingObserver,
    };

    // Registry
    pub use crate::registry::{
        Index, IndexEntry, LayoutValidator, Registry, ScriptValidator, TreeValidator,
    };

    // Packages
    pub use crate::package::Package;

    // Search
    pub use crate::search::{IndexEntries, SearchHit};

    // Install
    pub use crate::install::{InitClient, InstallPlanner, InstalledPackage};

    // Catalog
    pub use crate::catalog::PackageCatalog;

    // Errors
    pub use crate::error::{PackageError, Result};
}
