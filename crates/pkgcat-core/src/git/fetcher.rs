//! Git fetcher for cloning registry trees.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PackageError, Result};

use super::GitSpec;

/// Environment variables that would redirect git away from the target directory.
const GIT_ENV_OVERRIDES: [&str; 4] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_COMMON_DIR"];

/// Clones git repositories into staging directories.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: PathBuf,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GitFetcher {
    /// Create a fetcher that runs `git` from the search path.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable instead of the one on the search path.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Ensure the git program can be started.
    pub fn ensure_git_available(&self) -> Result<()> {
        let unavailable = |reason: String| PackageError::ToolUnavailable {
            tool: "git".to_string(),
            detail: format!(
                "Make sure it is installed and on the system search path ({}).\nPATH = {}",
                reason,
                std::env::var("PATH").unwrap_or_default()
            ),
        };

        let output = self
            .command()
            .arg("--version")
            .output()
            .map_err(|err| unavailable(err.to_string()))?;
        if !output.status.success() {
            return Err(unavailable(format!(
                "`{} --version` exited with {}",
                self.program.display(),
                output.status
            )));
        }
        Ok(())
    }

    /// Shallow-clone the spec's branch into `target_dir`, then drop `.git`.
    pub fn clone_shallow(&self, spec: &GitSpec, target_dir: &Path) -> Result<()> {
        self.ensure_git_available()?;

        let fail = |detail: String| PackageError::Fetch {
            uri: spec.repo_url.clone(),
            target: target_dir.to_path_buf(),
            detail,
        };

        let output = self
            .command()
            .args(["clone", "--depth", "1", "--single-branch", "--branch"])
            .arg(&spec.branch)
            .arg(&spec.repo_url)
            .arg(target_dir)
            .output()
            .map_err(|err| fail(format!("Failed to run git clone: {}", err)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "Unable to clone [{}]: {}",
                spec.repo_url,
                stderr.trim()
            )));
        }

        let git_dir = target_dir.join(".git");
        if git_dir.exists() {
            std::fs::remove_dir_all(&git_dir).map_err(|err| {
                fail(format!(
                    "Failed to remove {}: {}",
                    git_dir.display(),
                    err
                ))
            })?;
        }
        Ok(())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        for key in GIT_ENV_OVERRIDES {
            cmd.env_remove(key);
        }
        cmd
    }
}
