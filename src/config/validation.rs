use crate::config::types::{
    Config, CrawlerConfig, LanguageConfig, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selector_config(&config.selectors)?;
    validate_language_config(&config.languages)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let origin = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if origin.scheme() != "http" && origin.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must use http or https",
            config.origin
        )));
    }

    if origin.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' has no host",
            config.origin
        )));
    }

    if origin.path() != "/" || origin.query().is_some() || origin.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' must not carry a path, query or fragment",
            config.origin
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing_path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_count < 1 {
        return Err(ConfigError::Validation(format!(
            "page_count must be >= 1, got {}",
            config.page_count
        )));
    }

    if config.start_page.checked_add(config.page_count).is_none() {
        return Err(ConfigError::Validation(format!(
            "start_page {} + page_count {} overflows",
            config.start_page, config.page_count
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the user-agent pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if config.pool.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agent pool cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, selector) in [
        ("entry", &config.entry),
        ("title", &config.title),
        ("link", &config.link),
        ("tags", &config.tags),
        ("text", &config.text),
        ("date", &config.date),
    ] {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector {
                field,
                selector: selector.clone(),
            });
        }
    }

    Ok(())
}

/// Validates tag splitting rules
fn validate_language_config(config: &LanguageConfig) -> Result<(), ConfigError> {
    if config.separator.is_empty() {
        return Err(ConfigError::Validation(
            "language separator cannot be empty".to_string(),
        ));
    }

    for entry in &config.compound {
        if entry.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "compound label cannot be empty".to_string(),
            ));
        }

        if entry.expands.is_empty() || entry.expands.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "compound label '{}' must expand to non-empty language names",
                entry.label
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
