//! Git source specification types.

/// Branch cloned when a source does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Specification for a git source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSpec {
    /// Repository URL exactly as configured
    pub repo_url: String,
    /// Branch to clone
    pub branch: String,
}

impl GitSpec {
    /// Create a new GitSpec tracking the default branch.
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    /// Set the branch to clone.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }
}
