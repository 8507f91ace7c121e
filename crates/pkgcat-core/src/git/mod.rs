//! Git transport for package sources.
//!
//! Clones go through the `git` executable found on the search path:
//! - Shallow, single-branch clone of the source's branch
//! - Version-control metadata removed afterwards to keep the cache small

mod fetcher;
mod spec;

pub use fetcher::GitFetcher;
pub use spec::{DEFAULT_BRANCH, GitSpec};
