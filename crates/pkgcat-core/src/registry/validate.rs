//! Validation hooks run against staged or cached registry trees.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::package::{COMMAND_FILE, CONFIG_FILE, METADATA_FILE, TEMPLATE_FILE};

use super::index::Index;
use super::package_initial;

/// Script shipped inside package trees that checks their content.
pub const DEFAULT_VALIDATION_SCRIPT: &str = "scripts/1-validate-packages.sh";

/// Checks a registry tree, returning diagnostics on failure.
///
/// Any `Fn(&Path) -> Result<(), Vec<String>>` closure is a validator.
pub trait TreeValidator {
    fn validate(&self, tree: &Path) -> Result<(), Vec<String>>;
}

impl<F> TreeValidator for F
where
    F: Fn(&Path) -> Result<(), Vec<String>>,
{
    fn validate(&self, tree: &Path) -> Result<(), Vec<String>> {
        self(tree)
    }
}

/// Runs the validation script bundled with the tree.
#[derive(Debug, Clone)]
pub struct ScriptValidator {
    script: PathBuf,
}

impl Default for ScriptValidator {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_SCRIPT)
    }
}

impl ScriptValidator {
    /// Use `script`, relative to the tree root.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl TreeValidator for ScriptValidator {
    fn validate(&self, tree: &Path) -> Result<(), Vec<String>> {
        let script = tree.join(&self.script);
        if !script.is_file() {
            return Err(vec![format!(
                "validation script not found: {}",
                script.display()
            )]);
        }

        let output = Command::new(&script)
            .current_dir(tree)
            .output()
            .map_err(|err| vec![format!("Failed to run {}: {}", script.display(), err)])?;
        if output.status.success() {
            return Ok(());
        }

        let mut diagnostics = vec![format!("{} exited with {}", self.script.display(), output.status)];
        diagnostics.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        Err(diagnostics)
    }
}

/// Structural check of the tree layout, without external programs.
///
/// The index must parse, and every version it lists must exist as a
/// directory holding the four descriptor files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutValidator;

impl TreeValidator for LayoutValidator {
    fn validate(&self, tree: &Path) -> Result<(), Vec<String>> {
        let index_path = tree.join("repo").join("meta").join("index.json");
        if !index_path.is_file() {
            return Err(vec![format!("missing index: {}", index_path.display())]);
        }
        let index = Index::load(&index_path).map_err(|err| vec![err.to_string()])?;

        let mut diagnostics = Vec::new();
        for entry in &index.packages {
            let Some(initial) = package_initial(&entry.name) else {
                diagnostics.push("index entry with empty name".to_string());
                continue;
            };
            let package_dir = tree
                .join("repo")
                .join("packages")
                .join(initial)
                .join(&entry.name);
            if !package_dir.is_dir() {
                diagnostics.push(format!("package [{}] has no directory", entry.name));
                continue;
            }
            if entry.versions.is_empty() {
                diagnostics.push(format!("package [{}] lists no versions", entry.name));
            }
            for version in entry.versions.keys() {
                let version_dir = package_dir.join(version);
                for file in [METADATA_FILE, CONFIG_FILE, COMMAND_FILE, TEMPLATE_FILE] {
                    if !version_dir.join(file).is_file() {
                        diagnostics.push(format!(
                            "package [{}] version [{}] is missing {}",
                            entry.name, version, file
                        ));
                    }
                }
            }
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(diagnostics)
        }
    }
}
