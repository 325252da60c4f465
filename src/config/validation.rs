use crate::config::types::{
    Config, CrawlerConfig, HealthConfig, OutputConfig, UserAgentConfig, PAGE_PLACEHOLDER,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_health_config(&config.health)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing template and page range
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.url_template.is_empty() {
        return Err(ConfigError::Validation(
            "url_template cannot be empty".to_string(),
        ));
    }

    if !config.url_template.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "url_template must contain the {} placeholder, got '{}'",
            PAGE_PLACEHOLDER, config.url_template
        )));
    }

    let sample = config.page_url(config.start_page);
    let url = Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url_template '{}': {}", sample, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "url_template '{}' must use HTTP or HTTPS",
            config.url_template
        )));
    }

    if config.start_page > config.end_page {
        return Err(ConfigError::Validation(format!(
            "start_page ({}) must not exceed end_page ({})",
            config.start_page, config.end_page
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_health_config(config: &HealthConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "health max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "health timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation("csv_path cannot be empty".to_string()));
    }

    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
