//! TOML config parsing with helpful error messages

use std::path::Path;

use crate::error::{PackageError, Result};

use super::ConfigProvider;

/// Configuration backed by a parsed TOML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TomlConfig {
    root: toml::Table,
}

impl TomlConfig {
    pub fn new(root: toml::Table) -> Self {
        Self { root }
    }

    pub fn table(&self) -> &toml::Table {
        &self.root
    }
}

impl ConfigProvider for TomlConfig {
    fn get(&self, key: &str) -> Option<toml::Value> {
        let mut parts = key.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current.clone())
    }
}

/// Parse a config file, reporting the offending line on syntax errors.
pub fn parse_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| PackageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&content).map_err(|err| match err {
        PackageError::Config { detail } => PackageError::Config {
            detail: format!("{}: {}", path.display(), detail),
        },
        other => other,
    })
}

/// Parse config content from a string.
pub fn parse_config_str(content: &str) -> Result<TomlConfig> {
    let root: toml::Table = toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;
    Ok(TomlConfig::new(root))
}

/// Enhance TOML parsing errors with the surrounding lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> PackageError {
    let error_msg = error.to_string();

    let line_hint = error.span().map(|span| {
        let upto = span.start.min(content.len());
        content[..upto].matches('\n').count() + 1
    });

    let detail = if let Some(line_num) = line_hint {
        format!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            get_line_context(content, line_num),
            error_msg
        )
    } else {
        format!("TOML parsing error: {}", error_msg)
    };
    PackageError::Config { detail }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
