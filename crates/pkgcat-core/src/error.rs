//! Error types shared by every package operation.

use std::path::PathBuf;

/// Errors that can occur while resolving, caching, searching or installing packages.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// A required setting is missing or has the wrong shape.
    #[error("configuration error: {detail}")]
    Config { detail: String },

    /// The source URI uses a scheme no transport understands.
    #[error("Source URL uses unsupported protocol [{uri}]")]
    UnsupportedScheme { uri: String },

    /// The source URI has a known scheme but cannot be turned into a source.
    #[error("invalid source [{uri}]: {detail}")]
    InvalidSource { uri: String, detail: String },

    /// Copying source content into the staging area failed.
    #[error("Unable to fetch [{uri}] to [{}]: {detail}", target.display())]
    Fetch {
        uri: String,
        target: PathBuf,
        detail: String,
    },

    /// An external program needed by a transport is missing.
    #[error("Could not locate the {tool} program. {detail}")]
    ToolUnavailable { tool: String, detail: String },

    /// The operation exists as an extension point only.
    #[error("{operation} is not implemented")]
    NotImplemented { operation: String },

    /// A registry tree failed structural validation.
    #[error("Source tree is not valid [{}]: {detail}", path.display())]
    Validation { path: PathBuf, detail: String },

    /// Another process holds the cache lock.
    #[error("Unable to acquire the package cache lock [{}]", path.display())]
    LockBusy { path: PathBuf },

    /// A looked-up file, index or package does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A caller-supplied argument is unusable.
    #[error("invalid argument: {detail}")]
    InvalidArgument { detail: String },

    /// A descriptor path does not point at a regular file.
    #[error("Path [{}] is not a file", path.display())]
    NotAFile { path: PathBuf },

    /// A file exists but could not be read.
    #[error("Unable to open file [{}]: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON or template content is malformed.
    #[error("Unable to parse [{what}]: {detail}")]
    Parse { what: String, detail: String },

    /// A package directory has no version subdirectories.
    #[error("No versions found for package [{name}]")]
    EmptyPackage { name: String },

    /// Install options do not conform to the package config schema.
    #[error("Error validating package options: {detail}")]
    SchemaValidation { detail: String },

    /// The workload-init client reported a failure.
    #[error("init client error: {detail}")]
    Client { detail: String },

    /// Filesystem failure outside the more specific variants above.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: impl Into<String>, detail: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

/// Result type alias for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;
