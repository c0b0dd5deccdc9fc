use crate::config::types::{Config, CrawlerConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url must use HTTP or HTTPS, got '{}'",
            url.scheme()
        )));
    }

    validate_site_id(&config.site_id)?;

    if config.main_menu_frame.is_empty() || config.service_menu_frame.is_empty() {
        return Err(ConfigError::Validation(
            "frame names cannot be empty".to_string(),
        ));
    }

    if config.navigation_targets.is_empty() {
        return Err(ConfigError::Validation(
            "navigation-targets must name at least one frame target".to_string(),
        ));
    }

    if config.max_links_per_page == 0 {
        return Err(ConfigError::Validation(
            "max-links-per-page must be >= 1".to_string(),
        ));
    }

    if crate::site::slugify(&config.pdf_breadcrumb).is_empty() {
        return Err(ConfigError::Validation(format!(
            "pdf-breadcrumb '{}' does not produce a usable directory name",
            config.pdf_breadcrumb
        )));
    }

    Ok(())
}

/// The site id becomes a directory name, so it must be a single plain segment
fn validate_site_id(site_id: &str) -> Result<(), ConfigError> {
    if site_id.is_empty() {
        return Err(ConfigError::Validation(
            "site-id cannot be empty".to_string(),
        ));
    }

    if site_id == "." || site_id == ".." {
        return Err(ConfigError::Validation(format!(
            "site-id '{}' is not a directory name",
            site_id
        )));
    }

    if !site_id
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ConfigError::Validation(format!(
            "site-id must contain only alphanumeric characters, '-', '_' and '.', got '{}'",
            site_id
        )));
    }

    Ok(())
}

/// Validates worker pool configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    // Deferred tasks need enough rounds for every worker's in-flight page to
    // land in the article map.
    let budget = config.retry_budget() as usize;
    if budget < config.workers + 1 {
        return Err(ConfigError::Validation(format!(
            "retry-budget must be at least workers + 1 ({}), got {}",
            config.workers + 1,
            budget
        )));
    }

    if config.fetch_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch-attempts must be >= 1, got {}",
            config.fetch_attempts
        )));
    }

    Ok(())
}
