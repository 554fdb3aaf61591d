use crate::config::types::{Config, CrawlerConfig, OutputConfig, PatternGroups, UserAgentConfig};
use crate::url::Domain;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_domains(&config.domains)?;
    validate_pattern_groups(&config.patterns)?;

    for site in &config.sites {
        let domain = Domain::parse(&site.domain).map_err(|source| ConfigError::InvalidDomain {
            domain: site.domain.clone(),
            source,
        })?;
        validate_pattern_groups(&config.patterns_for(domain.as_str()))?;
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 256, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.max_concurrent_domains < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_domains must be >= 1, got {}",
            config.max_concurrent_domains
        )));
    }

    if config.max_scroll_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_scroll_iterations must be >= 1".to_string(),
        ));
    }

    if config.navigation_timeout_secs < 1 || config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got navigation={}s page={}s",
            config.navigation_timeout_secs, config.page_timeout_secs
        )));
    }

    if config.max_pages_per_domain == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages_per_domain must be >= 1 when set".to_string(),
        ));
    }

    if config.scheme != "http" && config.scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "scheme must be 'http' or 'https', got '{}'",
            config.scheme
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
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

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "report_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every configured domain normalizes to something crawlable
fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    for domain in domains {
        Domain::parse(domain).map_err(|source| ConfigError::InvalidDomain {
            domain: domain.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Validates that every rule in both groups compiles
pub(crate) fn validate_pattern_groups(groups: &PatternGroups) -> Result<(), ConfigError> {
    for (group, rules) in [("product", &groups.product), ("ignore", &groups.ignore)] {
        for rule in rules {
            Regex::new(rule).map_err(|e| ConfigError::InvalidPattern {
                group: group.to_string(),
                pattern: rule.clone(),
                message: e.to_string(),
            })?;
        }
    }
    Ok(())
}
