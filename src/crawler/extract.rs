//! Link extraction from a single rendered page
//!
//! # Extraction Protocol
//!
//! 1. Open the page through the session's renderer (bounded by the navigation timeout)
//! 2. Collect every anchor href currently in the DOM and classify it:
//!    - in-domain product links go straight into the ledger
//!    - in-domain followable links not yet visited are returned to the session
//! 3. Measure the scroll extent, scroll to the bottom, wait for the settle interval,
//!    measure again
//! 4. Stop when the extent no longer changes, otherwise repeat from 2
//!
//! The loop is capped by `max_scroll_iterations` and by the per-page timeout.
//! Hitting either cap keeps what was gathered and reports a partial extraction;
//! at the iteration cap the links loaded by the final scroll are collected too.

use crate::config::CrawlerConfig;
use crate::crawler::ledger::CrawlLedger;
use crate::render::{RenderError, RenderedPage, Renderer};
use crate::url::{is_out_of_domain, normalize_url, Classifier, UrlClass};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Bounds applied to each page visit
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub scroll_settle: Duration,
    pub max_scroll_iterations: u32,
    pub navigation_timeout: Duration,
    pub page_timeout: Duration,
}

impl From<&CrawlerConfig> for ExtractOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            scroll_settle: config.scroll_settle(),
            max_scroll_iterations: config.max_scroll_iterations,
            navigation_timeout: config.navigation_timeout(),
            page_timeout: config.page_timeout(),
        }
    }
}

/// Everything a worker needs besides the renderer, shared across a session
#[derive(Debug)]
pub struct ExtractContext {
    pub base_url: String,
    pub classifier: Arc<Classifier>,
    pub ledger: Arc<CrawlLedger>,
    pub options: ExtractOptions,
}

/// How a page visit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The scroll extent settled
    Complete,
    /// Scrolling was still producing content when the iteration cap was hit
    ScrollLimit,
    /// The page timeout expired mid-scroll
    TimedOut,
}

impl ExtractionOutcome {
    pub fn is_partial(&self) -> bool {
        !matches!(self, Self::Complete)
    }
}

/// Result of a successful page visit
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Newly found followable links, normalized, in discovery order
    pub links: Vec<String>,
    /// Product links first seen on this page
    pub new_products: usize,
    /// Number of scroll rounds performed
    pub scrolls: u32,
    pub outcome: ExtractionOutcome,
}

/// Links gathered so far; survives a page timeout
#[derive(Debug, Default)]
struct Gathered {
    links: Vec<String>,
    seen: HashSet<String>,
    new_products: usize,
    scrolls: u32,
}

/// Visits `url` and returns the followable links found on it
///
/// # Returns
///
/// * `Ok(Extraction)` - The page was opened; `outcome` tells whether scrolling settled
/// * `Err(RenderError)` - Navigation or a DOM call failed. Products recorded before
///   the failure stay in the ledger; links gathered so far are dropped.
pub async fn extract_links(
    renderer: &dyn Renderer,
    url: &str,
    ctx: &ExtractContext,
) -> Result<Extraction, RenderError> {
    let mut page = match timeout(ctx.options.navigation_timeout, renderer.open(url)).await {
        Ok(opened) => opened?,
        Err(_) => {
            return Err(RenderError::Timeout {
                url: url.to_string(),
            })
        }
    };

    let mut gathered = Gathered::default();
    let scrolled = timeout(
        ctx.options.page_timeout,
        scroll_and_collect(page.as_mut(), ctx, &mut gathered),
    )
    .await;

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page {}: {}", url, e);
    }

    let outcome = match scrolled {
        Ok(result) => result?,
        Err(_) => ExtractionOutcome::TimedOut,
    };

    if outcome.is_partial() {
        tracing::warn!(
            "Partial extraction from {} ({:?} after {} scrolls)",
            url,
            outcome,
            gathered.scrolls
        );
    }

    Ok(Extraction {
        links: gathered.links,
        new_products: gathered.new_products,
        scrolls: gathered.scrolls,
        outcome,
    })
}

async fn scroll_and_collect(
    page: &mut dyn RenderedPage,
    ctx: &ExtractContext,
    gathered: &mut Gathered,
) -> Result<ExtractionOutcome, RenderError> {
    loop {
        for href in page.links().await? {
            collect_link(&href, ctx, gathered);
        }

        let previous = page.scroll_extent().await?;
        page.scroll_to_bottom().await?;
        sleep(ctx.options.scroll_settle).await;
        let current = page.scroll_extent().await?;
        gathered.scrolls += 1;

        if current == previous {
            return Ok(ExtractionOutcome::Complete);
        }
        if gathered.scrolls >= ctx.options.max_scroll_iterations {
            // Keep whatever the last scroll loaded
            for href in page.links().await? {
                collect_link(&href, ctx, gathered);
            }
            return Ok(ExtractionOutcome::ScrollLimit);
        }
    }
}

fn collect_link(href: &str, ctx: &ExtractContext, gathered: &mut Gathered) {
    let link = normalize_url(href);
    if is_out_of_domain(&link, &ctx.base_url) {
        return;
    }

    match ctx.classifier.classify(&link) {
        UrlClass::Product => {
            if ctx.ledger.add_product(&link) {
                tracing::debug!("Product URL: {}", link);
                gathered.new_products += 1;
            }
        }
        UrlClass::Ignored => {}
        UrlClass::Followable => {
            if !ctx.ledger.is_visited(&link) && gathered.seen.insert(link.clone()) {
                gathered.links.push(link);
            }
        }
    }
}
