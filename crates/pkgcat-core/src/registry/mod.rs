//! On-disk package registries.
//!
//! A registry is a read-only view over one source's package tree, bound either
//! to the source's committed cache directory or to a staging directory during
//! refresh. Layout of a tree:
//!
//! ```text
//! <base>/repo/meta/index.json
//! <base>/repo/packages/<Initial>/<name>/<version>/{package,config,command,marathon}.json
//! ```

pub mod index;
pub mod validate;

use std::path::{Path, PathBuf};

use crate::error::{PackageError, Result};
use crate::package::Package;
use crate::source::Source;

pub use index::{Index, IndexEntry};
pub use validate::{LayoutValidator, ScriptValidator, TreeValidator};

/// A package tree belonging to one source.
#[derive(Debug, Clone)]
pub struct Registry {
    source: Source,
    base_path: PathBuf,
}

impl Registry {
    /// Bind `source` to the tree rooted at `base_path`.
    pub fn new(source: Source, base_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            base_path: base_path.into(),
        }
    }

    /// Registry over the source's committed cache directory.
    pub fn cached(source: Source, cache_root: &Path) -> Self {
        let base_path = source.cache_dir(cache_root);
        Self::new(source, base_path)
    }

    /// The upstream source for this registry.
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Location of the package index inside the tree.
    pub fn index_path(&self) -> PathBuf {
        self.base_path.join("repo").join("meta").join("index.json")
    }

    /// Run `validator` over the tree.
    ///
    /// A failing tree yields exactly one [`PackageError::Validation`], with any
    /// diagnostics folded into its detail.
    pub fn validate(&self, validator: &dyn TreeValidator) -> Vec<PackageError> {
        match validator.validate(&self.base_path) {
            Ok(()) => Vec::new(),
            Err(diagnostics) => {
                let detail = if diagnostics.is_empty() {
                    "validation failed".to_string()
                } else {
                    diagnostics.join("; ")
                };
                vec![PackageError::Validation {
                    path: self.base_path.clone(),
                    detail,
                }]
            }
        }
    }

    /// Read and parse the package index.
    pub fn index(&self) -> Result<Index> {
        let path = self.index_path();
        if !path.is_file() {
            return Err(PackageError::not_found(format!(
                "Package index [{}]",
                path.display()
            )));
        }
        Index::load(&path)
    }

    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Result<Package> {
        let Some(initial) = package_initial(name) else {
            return Err(PackageError::InvalidArgument {
                detail: "Package name must not be empty.".to_string(),
            });
        };
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PackageError::InvalidArgument {
                detail: format!("Invalid package name [{}]", name),
            });
        }

        let package_path = self
            .base_path
            .join("repo")
            .join("packages")
            .join(initial)
            .join(name);

        if !package_path.is_dir() {
            return Err(PackageError::not_found(format!("Package [{}]", name)));
        }
        Package::open(package_path)
    }
}

/// Directory grouping packages by first letter: the titlecase mapping of the
/// name's first character, so `ß` files under `Ss` and `ǆ` under `ǅ`.
pub fn package_initial(name: &str) -> Option<String> {
    let first = name.chars().next()?;
    let mapped: String = unicode_case_mapping::to_titlecase(first)
        .iter()
        .take_while(|&&cp| cp != 0)
        .filter_map(|&cp| char::from_u32(cp))
        .collect();
    if mapped.is_empty() {
        Some(first.to_string())
    } else {
        Some(mapped)
    }
}
