use crate::config::types::{Config, CrawlerConfig, OutputConfig, RateLimitConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_retries < 1 || config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 20, got {}",
            config.max_retries
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_every must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the adaptive delay policy
fn validate_rate_limit_config(config: &RateLimitConfig) -> ConfigResult<()> {
    if config.min_delay_ms < 1 {
        return Err(ConfigError::Validation(
            "min_delay_ms must be >= 1ms".to_string(),
        ));
    }

    if config.max_delay_ms < config.min_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}) must not be below min_delay_ms ({})",
            config.max_delay_ms, config.min_delay_ms
        )));
    }

    if !(config.success_decay > 0.0 && config.success_decay < 1.0) {
        return Err(ConfigError::Validation(format!(
            "success_decay must be in (0, 1), got {}",
            config.success_decay
        )));
    }

    if !(config.backoff_factor > 1.0 && config.backoff_factor.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be > 1, got {}",
            config.backoff_factor
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.episodes_path.is_empty() {
        return Err(ConfigError::Validation(
            "episodes_path cannot be empty".to_string(),
        ));
    }

    if config.progress_path.is_empty() {
        return Err(ConfigError::Validation(
            "progress_path cannot be empty".to_string(),
        ));
    }

    if config.episodes_path == config.progress_path {
        return Err(ConfigError::Validation(format!(
            "episodes_path and progress_path must differ, both are '{}'",
            config.episodes_path
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
