//! Aisle: a product page discovery crawler
//!
//! This crate walks the in-domain link graph of e-commerce sites breadth first,
//! classifies every discovered URL as a product page, a page worth following, or a
//! page to ignore, and aggregates the product pages found per domain.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Aisle operations
#[derive(Debug, Error)]
pub enum AisleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain '{domain}': {source}")]
    InvalidDomain { domain: String, source: UrlError },

    #[error("Invalid pattern '{pattern}' in group '{group}': {message}")]
    InvalidPattern {
        group: String,
        pattern: String,
        message: String,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Empty domain")]
    EmptyDomain,

    #[error("Malformed domain: {0}")]
    Malformed(String),
}

/// Errors that end a whole domain session
///
/// Per-URL failures never surface here; they are recovered inside the session.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to launch renderer for {domain}: {source}")]
    Launch {
        domain: String,
        source: render::RenderError,
    },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },

    #[error("Session for {domain} was already run")]
    AlreadyRun { domain: String },

    #[error("Session task for {domain} aborted: {message}")]
    Aborted { domain: String, message: String },
}

/// Result type alias for Aisle operations
pub type Result<T> = std::result::Result<T, AisleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlDirector, CrawlSession};
pub use output::{CrawlReport, CrawlResult};
pub use state::SessionState;
pub use crate::url::{is_out_of_domain, normalize_domain, normalize_url, Classifier, Domain, UrlClass};
