use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::types::{LatestVersion, LatestVersionSource, RegistryError};

pub const DEFAULT_PROXY_URL: &str = "https://proxy.golang.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the Go module proxy protocol.
///
/// One `reqwest` client is built up front and reused for every lookup, so
/// connections to the proxy are kept alive across the whole run.
#[derive(Debug, Clone)]
pub struct ModuleProxyClient {
    base_url: String,
    client: Client,
}

impl ModuleProxyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("modbump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

impl LatestVersionSource for ModuleProxyClient {
    fn latest_version(&self, module_path: &str) -> Result<LatestVersion, RegistryError> {
        let url = latest_version_url(&self.base_url, module_path);
        tracing::debug!(module = module_path, %url, "querying module proxy");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| RegistryError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RegistryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| RegistryError::Request {
            url: url.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| RegistryError::Decode { url, source })
    }
}

/// Builds `<base>/<module path>/@latest`, lower-cased in full.
pub fn latest_version_url(base_url: &str, module_path: &str) -> String {
    format!("{}/{}/@latest", base_url.trim_end_matches('/'), module_path).to_lowercase()
}
