use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// SQLite database file; every table is one collection.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Maximum collections queried at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deadline for the whole fan-out of one search, in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_concurrency: default_max_concurrency(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("btagg.db")
}

fn default_max_concurrency() -> usize {
    8
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

/// Search pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Site label stamped on every result.
    #[serde(default = "default_site")]
    pub site: String,
    /// Results per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long a cached result set stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Collections never queried.
    #[serde(default)]
    pub excluded_collections: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            page_size: default_page_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            excluded_collections: Vec::new(),
        }
    }
}

fn default_site() -> String {
    "Sehuatang".to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

/// Collection membership sets used to flag results.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassificationConfig {
    /// Collections whose content carries Chinese subtitles.
    #[serde(default = "default_chinese")]
    pub chinese: Vec<String>,
    /// Collections whose content is uncensored.
    #[serde(default = "default_uncensored")]
    pub uncensored: Vec<String>,
    /// Collections whose content is ultra-high-definition.
    #[serde(default = "default_uhd")]
    pub uhd: Vec<String>,
    /// Title substring that marks a decensored release.
    #[serde(default = "default_decensor_marker")]
    pub decensor_marker: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            chinese: default_chinese(),
            uncensored: default_uncensored(),
            uhd: default_uhd(),
            decensor_marker: default_decensor_marker(),
        }
    }
}

fn default_chinese() -> Vec<String> {
    vec![
        "hd_chinese_subtitles".to_string(),
        "domestic_original".to_string(),
    ]
}

fn default_uncensored() -> Vec<String> {
    vec![
        "asia_codeless_originate".to_string(),
        "domestic_original".to_string(),
        "EU_US_no_mosaic".to_string(),
    ]
}

fn default_uhd() -> Vec<String> {
    vec!["4k_video".to_string(), "hd_chinese_subtitles".to_string()]
}

fn default_decensor_marker() -> String {
    "破解".to_string()
}
