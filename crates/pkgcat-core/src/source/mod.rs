//! Package sources and URI resolution.
//!
//! A source is the origin a registry tree is fetched from:
//! - Local directories (file://)
//! - HTTP endpoints (http://, https://), reserved for a future transport
//! - Git repositories (git://)
//!
//! Sources are immutable values. Each one knows how to copy its content into a
//! fresh directory and derives a stable cache key from its URI.

mod resolver;
mod spec;

pub use resolver::SourceResolver;
pub use spec::{FileSpec, HttpSpec, Source};

// Re-export GitSpec from git module for convenience
pub use crate::git::GitSpec;
