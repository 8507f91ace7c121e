//! Mustache rendering of install templates.
//!
//! The renderer only prints strings in `{{name}}` tags, so options are turned
//! into [`Data`] with the template's tag usage in mind:
//! - numbers always become their decimal text
//! - booleans stay booleans for sections, and become `true` / `false` text when
//!   printed by a variable tag
//! - arrays and objects printed by a variable tag become JSON text

use std::collections::{HashMap, HashSet};

use mustache::Data;
use serde_json::Value;

use crate::error::{PackageError, Result};

/// Implicit-iterator tag name.
const IMPLICIT: &str = ".";

/// Render `template` with `options` and parse the output as JSON.
pub fn render_template(template: &str, options: &Value) -> Result<Value> {
    let compiled = mustache::compile_str(template).map_err(|err| PackageError::parse("install template", err))?;
    let data = template_data(template, options)?;

    let mut rendered = Vec::new();
    compiled
        .render_data(&mut rendered, &data)
        .map_err(|err| PackageError::parse("install template", err))?;
    let rendered =
        String::from_utf8(rendered).map_err(|err| PackageError::parse("rendered install template", err))?;

    serde_json::from_str(&rendered).map_err(|err| PackageError::parse("rendered install template", err))
}

/// Names a template refers to, split by how they are used.
#[derive(Debug, Default)]
struct TagUsage {
    /// Every path segment of `{{#name}}` and `{{^name}}` tags
    sections: HashSet<String>,
    /// Last path segment of variable tags, `.` for the implicit iterator
    variables: HashSet<String>,
    /// `{{.}}` appears outside every section
    implicit_at_root: bool,
}

impl TagUsage {
    fn scan(template: &str) -> Self {
        let mut usage = Self::default();
        let mut otag = "{{".to_string();
        let mut ctag = "}}".to_string();
        let mut depth = 0usize;
        let mut rest = template;

        while let Some(start) = rest.find(otag.as_str()) {
            let after = &rest[start + otag.len()..];
            let (content, consumed) = if let Some(inner) = after.strip_prefix('{') {
                let close = format!("}}{}", ctag);
                let Some(end) = inner.find(close.as_str()) else {
                    break;
                };
                (format!("&{}", &inner[..end]), 1 + end + close.len())
            } else {
                let Some(end) = after.find(ctag.as_str()) else {
                    break;
                };
                (after[..end].to_string(), end + ctag.len())
            };
            rest = &after[consumed..];

            let content = content.trim();
            let mut chars = content.chars();
            match chars.next() {
                None | Some('!') | Some('>') => {}
                Some('#') | Some('^') => {
                    usage
                        .sections
                        .extend(chars.as_str().trim().split('.').map(str::to_string));
                    depth += 1;
                }
                Some('/') => depth = depth.saturating_sub(1),
                Some('=') => {
                    let delimiters = chars.as_str().trim_end_matches('=');
                    let mut parts = delimiters.split_whitespace();
                    if let (Some(open), Some(close)) = (parts.next(), parts.next()) {
                        otag = open.to_string();
                        ctag = close.to_string();
                    }
                }
                Some('&') => usage.add_variable(chars.as_str().trim(), depth),
                Some(_) => usage.add_variable(content, depth),
            }
        }
        usage
    }

    fn add_variable(&mut self, name: &str, depth: usize) {
        if name == IMPLICIT {
            self.implicit_at_root |= depth == 0;
            self.variables.insert(IMPLICIT.to_string());
        } else if let Some(last) = name.rsplit('.').next() {
            self.variables.insert(last.to_string());
        }
    }
}

/// Convert `options` into renderer data shaped for `template`.
fn template_data(template: &str, options: &Value) -> Result<Data> {
    let usage = TagUsage::scan(template);
    if usage.implicit_at_root {
        return Err(PackageError::parse(
            "install template",
            "`{{.}}` outside a section would print the whole option object",
        ));
    }
    to_data(options, None, &usage)
}

fn to_data(value: &Value, key: Option<&str>, usage: &TagUsage) -> Result<Data> {
    let printed = key.is_some_and(|k| usage.variables.contains(k));
    let sectioned = key.is_some_and(|k| usage.sections.contains(k));

    match value {
        Value::Null => Ok(Data::Null),
        Value::String(s) => Ok(Data::String(s.clone())),
        Value::Number(n) => Ok(Data::String(n.to_string())),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) if printed && sectioned => {
            Err(PackageError::parse(
                "install template",
                format!(
                    "option [{}] is used both as a section and as a variable",
                    key.unwrap_or_default()
                ),
            ))
        }
        Value::Bool(b) if printed => Ok(Data::String(b.to_string())),
        Value::Bool(b) => Ok(Data::Bool(*b)),
        Value::Array(_) | Value::Object(_) if printed => Ok(Data::String(value.to_string())),
        Value::Array(items) => items
            .iter()
            .map(|item| to_data(item, Some(IMPLICIT), usage))
            .collect::<Result<Vec<_>>>()
            .map(Data::Vec),
        Value::Object(map) => {
            if sectioned && usage.variables.contains(IMPLICIT) {
                return Err(PackageError::parse(
                    "install template",
                    format!("object option [{}] cannot be printed with `{{{{.}}}}`", key.unwrap_or_default()),
                ));
            }
            map.iter()
                .map(|(k, v)| Ok((k.clone(), to_data(v, Some(k), usage)?)))
                .collect::<Result<HashMap<_, _>>>()
                .map(Data::Map)
        }
    }
}
