//! Configuration module for Aisle
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use aisle::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("aisle.toml")).unwrap();
//! println!("Workers per domain: {}", config.crawler.max_concurrent_tasks);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_ignore_patterns, default_product_patterns, Config, CrawlerConfig, OutputConfig,
    PatternGroups, SiteOverride, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
