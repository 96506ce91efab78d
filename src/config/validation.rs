use crate::config::types::{Config, CrawlerConfig, DimensionConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_dimensions(&config.dimensions)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.listing_concurrency < 1 || config.listing_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "listing_concurrency must be between 1 and 100, got {}",
            config.listing_concurrency
        )));
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 100, got {}",
            config.detail_concurrency
        )));
    }

    if let Some(max_pages) = config.max_pages {
        if max_pages < 1 {
            return Err(ConfigError::Validation(
                "max_pages must be >= 1 when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must be http(s), got '{}'",
            config.base_url
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must include a host, got '{}'",
            config.base_url
        )));
    }

    let scope = config.scope.trim();
    if scope.is_empty() {
        return Err(ConfigError::Validation("scope cannot be empty".to_string()));
    }

    // Scope becomes a path segment; reject anything that would mangle the URL
    if !scope
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "scope must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            scope
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    if config.listing_path.is_empty() {
        return Err(ConfigError::Validation(
            "listing_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates classification dimension tables
fn validate_dimensions(dimensions: &[DimensionConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for dimension in dimensions {
        if dimension.name.is_empty() {
            return Err(ConfigError::Validation(
                "dimension name cannot be empty".to_string(),
            ));
        }

        if !names.insert(dimension.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate dimension '{}'",
                dimension.name
            )));
        }

        if dimension.param.is_empty() {
            return Err(ConfigError::Validation(format!(
                "dimension '{}' must name its query parameter",
                dimension.name
            )));
        }

        if dimension.values.is_empty() {
            return Err(ConfigError::Validation(format!(
                "dimension '{}' must have at least one filter value",
                dimension.name
            )));
        }

        let mut ids = HashSet::new();
        for value in &dimension.values {
            if value.id.is_empty() || value.label.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "dimension '{}' has a filter value with an empty id or label",
                    dimension.name
                )));
            }

            if !ids.insert(value.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "dimension '{}' repeats filter id '{}'",
                    dimension.name, value.id
                )));
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    };

    if !valid {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}
