use directories::BaseDirs;
use dlorg_fetch::{DEFAULT_ANNOUNCE_URL, DEFAULT_WORK_URL, Endpoints};
use dlorg_library::DEFAULT_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APPLICATION: &str = "dlorg";
const CACHE_FILE: &str = "works.sqlite3";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where fetched metadata is cached between runs.
    pub cache_path: PathBuf,
    /// Naming template for work folders, see [`dlorg_library::PathGenerator`].
    pub template: String,
    pub http: HttpConfig,
    pub endpoints: EndpointsConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            template: DEFAULT_TEMPLATE.to_string(),
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// `{user cache dir}/dlorg/works.sqlite3`, falling back to the system temp
/// directory when no home directory can be determined.
pub fn default_cache_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
        .join(APPLICATION)
        .join(CACHE_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("dlorg/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Storefront URL templates; `{id}` is replaced by the work's catalog code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub work_url: String,
    pub announce_url: String,
}
impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            work_url: DEFAULT_WORK_URL.to_string(),
            announce_url: DEFAULT_ANNOUNCE_URL.to_string(),
        }
    }
}
impl From<&EndpointsConfig> for Endpoints {
    fn from(config: &EndpointsConfig) -> Self {
        Self {
            work_url: config.work_url.clone(),
            announce_url: config.announce_url.clone(),
        }
    }
}
