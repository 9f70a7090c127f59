use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use news_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Origin: {}", config.site.origin);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Command-line overrides applied on top of a loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_page: Option<u32>,
    pub page_count: Option<u32>,
    pub origin: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub database_path: Option<PathBuf>,
}

impl Overrides {
    /// Applies the overrides and re-validates the result
    pub fn apply(&self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(start_page) = self.start_page {
            config.crawler.start_page = start_page;
        }
        if let Some(page_count) = self.page_count {
            config.crawler.page_count = page_count;
        }
        if let Some(origin) = &self.origin {
            config.site.origin = origin.clone();
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.crawler.request_timeout_secs = timeout;
        }
        if let Some(path) = &self.database_path {
            config.output.database_path = path.display().to_string();
        }

        validate(&config)?;
        Ok(config)
    }
}

/// Computes a SHA-256 hash of the effective configuration
///
/// Recorded on every crawl run so runs made with different settings can be
/// told apart.
pub fn config_hash(config: &Config) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", config).as_bytes());
    hex::encode(hasher.finalize())
}
