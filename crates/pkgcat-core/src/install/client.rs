//! Workload-init client seam and the operations built on it.

use serde_json::Value;

use crate::error::{PackageError, Result};

use super::planner::{PACKAGE_NAME_LABEL, PACKAGE_VERSION_LABEL};

/// The orchestrator API that runs installed packages.
///
/// Implementations own transport, authentication and response semantics.
pub trait InitClient {
    /// Submit an app descriptor, returning the orchestrator's answer.
    fn add_app(&self, descriptor: &Value) -> Result<Value>;

    /// All running app descriptors, labels included.
    fn get_apps(&self) -> Result<Vec<Value>>;

    /// Remove the app with the given id.
    fn remove_app(&self, app_id: &str) -> Result<()>;
}

/// A running app that was installed from a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    /// App id reported by the orchestrator, if any
    pub app_id: Option<String>,
}

impl InstalledPackage {
    fn from_app(app: &Value) -> Option<Self> {
        let labels = app.get("labels")?;
        Some(Self {
            name: labels.get(PACKAGE_NAME_LABEL)?.as_str()?.to_string(),
            version: labels.get(PACKAGE_VERSION_LABEL)?.as_str()?.to_string(),
            app_id: app.get("id").and_then(Value::as_str).map(str::to_string),
        })
    }
}

/// Packages currently running, recovered from app labels.
///
/// Apps without both package labels are ignored.
pub fn list_installed_packages(client: &dyn InitClient) -> Result<Vec<InstalledPackage>> {
    let apps = client.get_apps()?;
    Ok(apps.iter().filter_map(InstalledPackage::from_app).collect())
}

/// Remove every app installed from package `name`, returning the removed ids.
pub fn uninstall_package(client: &dyn InitClient, name: &str) -> Result<Vec<String>> {
    let app_ids: Vec<String> = list_installed_packages(client)?
        .into_iter()
        .filter(|pkg| pkg.name == name)
        .filter_map(|pkg| pkg.app_id)
        .collect();

    if app_ids.is_empty() {
        return Err(PackageError::not_found(format!("Installed package [{}]", name)));
    }
    for app_id in &app_ids {
        client.remove_app(app_id)?;
    }
    Ok(app_ids)
}
