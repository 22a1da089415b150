mod proxy;
mod types;

pub use proxy::{latest_version_url, ModuleProxyClient, DEFAULT_PROXY_URL, DEFAULT_TIMEOUT};
pub use types::{LatestVersion, LatestVersionSource, RegistryError};
