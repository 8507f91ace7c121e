//! Source specification types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::error::{PackageError, Result};
use crate::fs::copy_tree;
use crate::git::{GitFetcher, GitSpec};

/// A configured package source.
///
/// The set of transports is closed: adding one means adding a variant here and
/// a scheme branch in [`SourceResolver`](super::SourceResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Local directory tree (file://)
    File(FileSpec),
    /// HTTP(S) endpoint
    Http(HttpSpec),
    /// Git repository, cloned from its master branch
    Git(GitSpec),
}

/// Specification for a local directory source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// URI as configured
    pub uri: String,
    /// Local path extracted from the URI
    pub path: PathBuf,
}

impl FileSpec {
    /// Create a new FileSpec.
    pub fn new(uri: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            path: path.into(),
        }
    }
}

/// Specification for an HTTP(S) source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSpec {
    /// URI as configured
    pub uri: String,
}

impl HttpSpec {
    /// Create a new HttpSpec from a URL.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl Source {
    /// The URI this source was configured with.
    pub fn uri(&self) -> &str {
        match self {
            Self::File(spec) => &spec.uri,
            Self::Http(spec) => &spec.uri,
            Self::Git(spec) => &spec.repo_url,
        }
    }

    /// Name of the cache directory for this source: hex-encoded SHA-1 of the URI.
    pub fn cache_key(&self) -> String {
        let digest = Sha1::digest(self.uri().as_bytes());
        format!("{:x}", digest)
    }

    /// Path of this source's committed cache directory under `cache_root`.
    pub fn cache_dir(&self, cache_root: &Path) -> PathBuf {
        cache_root.join(self.cache_key())
    }

    /// Check if this is a local file source.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Check if this is an HTTP source.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Check if this is a git source.
    pub fn is_git(&self) -> bool {
        matches!(self, Self::Git(_))
    }

    /// Get the file spec if this is a local file source.
    pub fn as_file(&self) -> Option<&FileSpec> {
        match self {
            Self::File(spec) => Some(spec),
            _ => None,
        }
    }

    /// Get the git spec if this is a git source.
    pub fn as_git(&self) -> Option<&GitSpec> {
        match self {
            Self::Git(spec) => Some(spec),
            _ => None,
        }
    }

    /// Copy this source's content into `target_dir`, which must not exist yet.
    pub fn fetch(&self, target_dir: &Path) -> Result<()> {
        match self {
            Self::File(spec) => fetch_file(spec, target_dir),
            Self::Http(_) => Err(PackageError::NotImplemented {
                operation: "Fetching from HTTP sources".to_string(),
            }),
            Self::Git(spec) => GitFetcher::new().clone_shallow(spec, target_dir),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.uri())
    }
}

fn fetch_file(spec: &FileSpec, target_dir: &Path) -> Result<()> {
    let fail = |detail: String| PackageError::Fetch {
        uri: spec.uri.clone(),
        target: target_dir.to_path_buf(),
        detail,
    };

    if !spec.path.is_dir() {
        return Err(fail(format!(
            "source directory does not exist: {}",
            spec.path.display()
        )));
    }
    if target_dir.exists() {
        return Err(fail("target directory already exists".to_string()));
    }

    copy_tree(&spec.path, target_dir).map_err(|err| {
        fail(format!(
            "Could not copy [{}] to [{}]: {}",
            spec.path.display(),
            target_dir.display(),
            err
        ))
    })
}
