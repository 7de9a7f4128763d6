//! spacetraveling: a static blog front-end for a headless CMS repository
//!
//! Posts are fetched from the repository's content API at build time and
//! rendered into a paginated list page plus one page per post, using
//! embedded Tera templates.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;
pub mod view;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::ContentError;

/// `_config.yml` in `base_dir`, or the defaults when there is none
pub fn load_config(base_dir: &Path) -> Result<config::SiteConfig> {
    let config_path = base_dir.join("_config.yml");
    if config_path.exists() {
        config::SiteConfig::load(&config_path)
    } else {
        Ok(config::SiteConfig::default())
    }
}

/// The site being built
#[derive(Clone, Debug)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Content API endpoint and token
    pub api: config::ContentApiConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Load the site in `base_dir`: `_config.yml` if present, credentials
    /// from the environment. Missing credentials fail here, before any
    /// request is made.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = load_config(&base_dir)?;

        let api = config::ContentApiConfig::from_env()
            .context("Content API is not configured")?;

        Ok(Self::with_config(base_dir, config, api))
    }

    /// Assemble a site from already-loaded configuration
    pub fn with_config<P: AsRef<Path>>(
        base_dir: P,
        config: config::SiteConfig,
        api: config::ContentApiConfig,
    ) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            api,
            base_dir,
            public_dir,
        }
    }

    /// HTTP client for the configured repository
    pub fn client(&self) -> Result<client::Client> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        Ok(client::Client::with_timeout(&self.api, timeout)?)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }
}
