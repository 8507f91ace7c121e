//! Option merging, schema validation and template rendering.

use serde_json::{Map, Value};

use crate::error::{PackageError, Result};
use crate::package::Package;

use super::client::InitClient;
use super::render::render_template;

/// Label carrying the package name on submitted apps.
pub const PACKAGE_NAME_LABEL: &str = "DCOS_PACKAGE_NAME";
/// Label carrying the package version on submitted apps.
pub const PACKAGE_VERSION_LABEL: &str = "DCOS_PACKAGE_VERSION";

/// Builds install descriptors from package versions.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstallPlanner;

impl InstallPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the descriptor for `version` of `pkg` without submitting it.
    pub fn plan(&self, pkg: &Package, version: &str, user_options: &Map<String, Value>) -> Result<Value> {
        let schema = pkg.config_schema(version)?;

        let options = merge_options(extract_defaults(&schema), user_options);
        let options = Value::Object(options);
        validate_options(&options, &schema)?;

        let template = pkg.install_template(version)?;
        let mut descriptor = render_template(&template, &options)?;

        let metadata = pkg.metadata(version)?;
        add_package_labels(&mut descriptor, &metadata)?;
        Ok(descriptor)
    }

    /// Assemble the descriptor and submit it through `client`.
    ///
    /// Returns whatever the client answered for the new app.
    pub fn install(
        &self,
        pkg: &Package,
        version: &str,
        user_options: &Map<String, Value>,
        client: &dyn InitClient,
    ) -> Result<Value> {
        let descriptor = self.plan(pkg, version, user_options)?;
        client.add_app(&descriptor)
    }
}

/// Collect `{property: default}` for every property declaring a default.
///
/// Only object schemas with a `properties` map have defaults; anything else
/// yields an empty map.
pub fn extract_defaults(schema: &Value) -> Map<String, Value> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Map::new();
    }
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Map::new();
    };

    properties
        .iter()
        .filter_map(|(name, property)| {
            property
                .get("default")
                .map(|default| (name.clone(), default.clone()))
        })
        .collect()
}

/// Shallow merge: user keys replace defaults, other keys pass through.
pub fn merge_options(defaults: Map<String, Value>, user_options: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults;
    for (key, value) in user_options {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Validate `options` against the JSON schema `schema`.
pub fn validate_options(options: &Value, schema: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(schema).map_err(|err| PackageError::SchemaValidation {
        detail: format!("invalid config schema: {}", err),
    })?;

    let messages: Vec<String> = validator
        .iter_errors(options)
        .map(|err| err.to_string())
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(PackageError::SchemaValidation {
            detail: messages.join("\n"),
        })
    }
}

/// Tag `descriptor` with the name and version from `metadata`.
///
/// Labels already present in the descriptor are kept.
pub fn add_package_labels(descriptor: &mut Value, metadata: &Value) -> Result<()> {
    let field = |key: &str| {
        metadata
            .get(key)
            .cloned()
            .ok_or_else(|| PackageError::parse("package metadata", format!("missing field `{}`", key)))
    };
    let name = field("name")?;
    let version = field("version")?;

    let object = descriptor
        .as_object_mut()
        .ok_or_else(|| PackageError::parse("rendered install template", "descriptor is not a JSON object"))?;
    let labels = object
        .entry("labels")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| PackageError::parse("rendered install template", "`labels` is not a JSON object"))?;

    labels.insert(PACKAGE_NAME_LABEL.to_string(), name);
    labels.insert(PACKAGE_VERSION_LABEL.to_string(), version);
    Ok(())
}
