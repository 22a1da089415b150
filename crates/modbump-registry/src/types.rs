use serde::Deserialize;
use thiserror::Error;

/// What the module proxy reports for `<path>/@latest`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestVersion {
    /// Empty when the proxy omits the field; an empty string is not a valid version.
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status code: {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
}

/// Anything that can answer "what is the newest published version of this module".
pub trait LatestVersionSource {
    fn latest_version(&self, module_path: &str) -> Result<LatestVersion, RegistryError>;
}
