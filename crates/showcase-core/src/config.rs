//! Runtime configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::PAGE_SIZE;

/// Default remote catalog.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Configuration file for the product showcase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Remote catalog settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Query cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// View settings.
    #[serde(default)]
    pub view: ViewConfig,
}

impl ShowcaseConfig {
    /// Load config from a TOML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Remote catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request transport timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Transport timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Query cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Staleness window for product pages and single products.
    #[serde(default = "default_product_stale_secs")]
    pub product_stale_secs: u64,

    /// Staleness window for the category list.
    #[serde(default = "default_category_stale_secs")]
    pub category_stale_secs: u64,

    /// Additional attempts after a failed fetch.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Re-fetch when the view regains focus.
    #[serde(default)]
    pub refetch_on_focus: bool,
}

impl CacheConfig {
    pub fn product_stale_time(&self) -> Duration {
        Duration::from_secs(self.product_stale_secs)
    }

    pub fn category_stale_time(&self) -> Duration {
        Duration::from_secs(self.category_stale_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            product_stale_secs: default_product_stale_secs(),
            category_stale_secs: default_category_stale_secs(),
            retries: default_retries(),
            refetch_on_focus: false,
        }
    }
}

fn default_product_stale_secs() -> u64 {
    5 * 60
}

fn default_category_stale_secs() -> u64 {
    10 * 60
}

fn default_retries() -> u32 {
    2
}

/// View settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Products per server page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    PAGE_SIZE
}
