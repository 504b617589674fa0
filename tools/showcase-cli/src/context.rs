//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use showcase_cache::CatalogQueries;
use showcase_core::ShowcaseConfig;
use showcase_data::HttpCatalogClient;
use showcase_view::{CatalogView, ErrorBoundary, PaginationController};
use tracing::debug;

use crate::output::Output;

/// File names searched for, in order, in each directory.
const CONFIG_NAMES: [&str; 3] = ["showcase.toml", ".showcase.toml", "showcase.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration.
    pub config: ShowcaseConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load the configuration and apply the base URL override.
    pub fn load(config_path: Option<&str>, api_url: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (ShowcaseConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (ShowcaseConfig::default(), None),
            },
        };

        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            config.api.base_url = url;
        }
        debug!(base_url = %config.api.base_url, config = ?config_path, "configuration loaded");

        Ok(Self {
            config,
            config_path,
            output,
        })
    }

    /// Cached catalog reads against the configured API.
    pub fn queries(&self) -> Result<CatalogQueries> {
        let client = HttpCatalogClient::from_config(&self.config.api)
            .with_context(|| format!("Failed to create catalog client for {}", self.config.api.base_url))?;
        Ok(CatalogQueries::new(Arc::new(client), &self.config.cache))
    }

    /// A browsing session with the configured page size.
    pub fn view(&self, queries: CatalogQueries) -> CatalogView {
        CatalogView::new(queries, PaginationController::new(self.config.view.page_size))
    }

    /// Error boundary printing toasts through this context's output.
    pub fn error_boundary(&self) -> ErrorBoundary {
        ErrorBoundary::new(Arc::new(self.output.notifier()))
    }
}

/// Find a config file in `start` or its ancestors.
fn find_config(start: &Path) -> Option<(ShowcaseConfig, PathBuf)> {
    for dir in start.ancestors() {
        for name in CONFIG_NAMES {
            let path = dir.join(name);
            if !path.exists() {
                continue;
            }
            match ShowcaseConfig::load(&path) {
                Ok(config) => return Some((config, path)),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable config"),
            }
        }
    }
    None
}
