//! Crawler module: the per-domain engine and the multi-domain director
//!
//! This module contains the core crawling logic, including:
//! - The frontier queue and the visited/product ledger of a session
//! - The extraction protocol run against each rendered page
//! - Bounded-concurrency traversal of one domain
//! - Concurrent orchestration of many domains

mod director;
mod extract;
mod frontier;
mod ledger;
mod session;

pub use director::CrawlDirector;
pub use extract::{extract_links, ExtractContext, ExtractOptions, Extraction, ExtractionOutcome};
pub use frontier::Frontier;
pub use ledger::CrawlLedger;
pub use session::{CrawlSession, SessionStats};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::render::HttpRendererFactory;
use crate::ConfigError;
use std::sync::Arc;

/// Crawls every domain listed in `config` with the static HTTP renderer
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - One entry per distinct domain
/// * `Err(ConfigError)` - A domain or pattern rule is invalid
pub async fn crawl(config: Config) -> Result<CrawlReport, ConfigError> {
    let factory = HttpRendererFactory::new(
        config.user_agent.clone(),
        config.crawler.navigation_timeout(),
    );
    let domains = config.domains.clone();
    CrawlDirector::new(config, Arc::new(factory))
        .run(domains)
        .await
}
