#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// Writes registry trees in the on-disk cache layout.
pub struct TreeBuilder {
    root: PathBuf,
    entries: Vec<Value>,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Add a package with the given versions and default descriptors.
    pub fn package(mut self, name: &str, versions: &[&str], description: &str, tags: &[&str]) -> Self {
        let initial: String = name.chars().next().unwrap().to_uppercase().collect();
        let package_dir = self.root.join("repo/packages").join(initial).join(name);
        for version in versions {
            let dir = package_dir.join(version);
            fs::create_dir_all(&dir).unwrap();
            write_json(
                &dir.join("package.json"),
                &json!({"name": name, "version": format!("{name}-sw-{version}"), "description": description}),
            );
            write_json(
                &dir.join("config.json"),
                &json!({
                    "type": "object",
                    "properties": {
                        "cpus": {"type": "number", "default": 1},
                        "instances": {"type": "integer", "default": 1, "minimum": 1}
                    }
                }),
            );
            write_json(&dir.join("command.json"), &json!({"pip": [format!("{name}-cli")]}));
            fs::write(
                dir.join("marathon.json"),
                format!(
                    r#"{{"id": "{name}", "cpus": {{{{cpus}}}}, "instances": {{{{instances}}}}, "cmd": "run {name}"}}"#
                ),
            )
            .unwrap();
        }

        let versions: serde_json::Map<String, Value> = versions
            .iter()
            .enumerate()
            .map(|(i, v)| (v.to_string(), json!(i.to_string())))
            .collect();
        self.entries.push(json!({
            "name": name,
            "versions": versions,
            "description": description,
            "tags": tags,
            "framework": false
        }));
        self
    }

    /// Drop an arbitrary file into the tree root.
    pub fn file(self, name: &str, content: &str) -> Self {
        let path = self.root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// Write the index and return the tree root.
    pub fn build(self) -> PathBuf {
        write_json(
            &self.root.join("repo/meta/index.json"),
            &json!({"version": "0.1.0", "packages": self.entries}),
        );
        self.root
    }
}

pub fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// `file://` URI for a local directory.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Validator that rejects trees containing an `INVALID` marker file.
pub fn reject_marked(tree: &Path) -> Result<(), Vec<String>> {
    if tree.join("INVALID").exists() {
        Err(vec!["tree is marked invalid".to_string()])
    } else {
        Ok(())
    }
}
