//! HTTP init client for the Marathon app API.

use anyhow::Context;
use serde_json::Value;
use tokio::runtime::Runtime;

use pkgcat_core::config::ConfigProvider;
use pkgcat_core::error::{PackageError, Result};
use pkgcat_core::install::InitClient;

const HOST_KEY: &str = "marathon.host";
const PORT_KEY: &str = "marathon.port";

/// Blocking `InitClient` over Marathon's `/v2/apps` endpoints.
pub struct MarathonClient {
    base_url: String,
    http: reqwest::Client,
    runtime: Runtime,
}

impl MarathonClient {
    /// Build a client from `marathon.host` and `marathon.port`.
    pub fn from_config(config: &dyn ConfigProvider) -> anyhow::Result<Self> {
        let host = config
            .get(HOST_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| missing(HOST_KEY))?;
        let port = config
            .get(PORT_KEY)
            .and_then(|v| v.as_integer())
            .ok_or_else(|| missing(PORT_KEY))?;

        Self::new(format!("http://{}:{}", host, port))
    }

    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pkgcat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            runtime,
        })
    }

    fn apps_url(&self) -> String {
        format!("{}/v2/apps", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(client_error)?;
        let status = response.status();
        let body = response.text().await.map_err(client_error)?;
        if !status.is_success() {
            return Err(PackageError::Client {
                detail: format!("HTTP {} from Marathon: {}", status, body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(client_error)
    }
}

impl InitClient for MarathonClient {
    fn add_app(&self, descriptor: &Value) -> Result<Value> {
        tracing::debug!(url = %self.apps_url(), "submitting app");
        let request = self.http.post(self.apps_url()).json(descriptor);
        self.runtime.block_on(self.send(request))
    }

    fn get_apps(&self) -> Result<Vec<Value>> {
        let request = self.http.get(self.apps_url());
        let body = self.runtime.block_on(self.send(request))?;
        match body.get("apps") {
            Some(Value::Array(apps)) => Ok(apps.clone()),
            _ => Err(PackageError::Client {
                detail: "Marathon response has no `apps` array".to_string(),
            }),
        }
    }

    fn remove_app(&self, app_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.apps_url(), app_id.trim_start_matches('/'));
        tracing::debug!(%url, "removing app");
        let request = self.http.delete(url);
        self.runtime.block_on(self.send(request)).map(|_| ())
    }
}

fn missing(key: &str) -> anyhow::Error {
    anyhow::anyhow!(PackageError::Config {
        detail: format!("No configured value for [{}]", key),
    })
}

fn client_error(err: impl std::fmt::Display) -> PackageError {
    PackageError::Client {
        detail: err.to_string(),
    }
}
