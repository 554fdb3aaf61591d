//! Crawl session: one domain's breadth-first traversal
//!
//! A session owns its frontier, its ledger of visited and product URLs, and the
//! classifier for its domain. Visits run as tasks in a [`JoinSet`] that is kept
//! topped up to `max_concurrent_tasks`; a finished visit is reaped and replaced
//! immediately, so one slow page never stalls the others.
//!
//! Admission happens when a URL leaves the frontier:
//! 1. Normalize it
//! 2. Skip it if it is out of domain, ignored, or disallowed by robots.txt
//! 3. Claim it in the ledger; a URL someone already claimed is skipped
//!
//! Only claimed URLs count as visited. The session ends once the frontier is
//! empty and no visit is in flight.

use crate::config::CrawlerConfig;
use crate::crawler::extract::{extract_links, ExtractContext, ExtractOptions, Extraction};
use crate::crawler::frontier::Frontier;
use crate::crawler::ledger::CrawlLedger;
use crate::render::{RenderError, Renderer};
use crate::robots::ParsedRobots;
use crate::state::SessionState;
use crate::url::{is_out_of_domain, normalize_url, Classifier, Domain, UrlClass};
use crate::CrawlError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Counters collected over a session's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// URLs claimed and handed to a worker
    pub pages_visited: usize,

    /// Visits that ended in a render error
    pub pages_failed: usize,

    /// Visits that hit the scroll cap or the page timeout
    pub partial_extractions: usize,

    /// Dequeued URLs dropped as out of domain, ignored or disallowed
    pub links_skipped: usize,

    /// Dequeued URLs dropped because they were already visited
    pub duplicates_skipped: usize,

    /// Highest number of visits in flight at once
    pub peak_in_flight: usize,
}

/// Why a dequeued URL was not visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    OutOfDomain,
    Ignored,
    Disallowed,
    Visited,
}

/// What a worker hands back to the session
struct VisitReport {
    url: String,
    result: Result<Extraction, RenderError>,
}

/// Per-domain crawl engine
#[derive(Debug)]
pub struct CrawlSession {
    domain: Domain,
    base_url: String,
    state: SessionState,
    frontier: Frontier,
    ledger: Arc<CrawlLedger>,
    classifier: Arc<Classifier>,
    robots: Option<ParsedRobots>,
    options: ExtractOptions,
    max_concurrent_tasks: usize,
    max_pages: Option<usize>,
    stats: SessionStats,
}

impl CrawlSession {
    /// Creates an idle session for `domain`
    pub fn new(domain: Domain, config: &CrawlerConfig, classifier: Classifier) -> Self {
        let base_url = domain.base_url(&config.scheme);
        Self {
            domain,
            base_url,
            state: SessionState::Idle,
            frontier: Frontier::new(),
            ledger: Arc::new(CrawlLedger::new()),
            classifier: Arc::new(classifier),
            robots: None,
            options: ExtractOptions::from(config),
            max_concurrent_tasks: config.max_concurrent_tasks.max(1),
            max_pages: config.max_pages_per_domain,
            stats: SessionStats::default(),
        }
    }

    /// Applies robots.txt rules at admission
    pub fn with_robots(mut self, robots: ParsedRobots) -> Self {
        self.robots = Some(robots);
        self
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Sorted visited URLs
    pub fn visited(&self) -> Vec<String> {
        self.ledger.visited()
    }

    /// Sorted product URLs discovered so far
    pub fn products(&self) -> Vec<String> {
        self.ledger.products()
    }

    /// Entries still queued, repeats included
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Crawls the domain to exhaustion and returns the sorted product URLs
    ///
    /// Per-URL failures are logged and counted; only a misuse of the session
    /// itself (running it twice) or a broken state transition is an error.
    ///
    /// # Arguments
    ///
    /// * `renderer` - The rendering context shared by every visit of this session
    pub async fn run(&mut self, renderer: Arc<dyn Renderer>) -> Result<Vec<String>, CrawlError> {
        if self.state != SessionState::Idle {
            return Err(CrawlError::AlreadyRun {
                domain: self.domain.to_string(),
            });
        }
        self.transition(SessionState::Running)?;

        tracing::info!("Starting crawl of {} from {}", self.domain, self.base_url);
        let start_time = Instant::now();

        let ctx = Arc::new(ExtractContext {
            base_url: self.base_url.clone(),
            classifier: Arc::clone(&self.classifier),
            ledger: Arc::clone(&self.ledger),
            options: self.options.clone(),
        });

        self.frontier.push(self.base_url.clone());
        let mut workers: JoinSet<VisitReport> = JoinSet::new();
        let mut reaped = 0usize;

        loop {
            while workers.len() < self.max_concurrent_tasks && self.state == SessionState::Running
            {
                if self.page_cap_reached() {
                    tracing::info!(
                        "{}: page cap reached, draining {} in-flight visits",
                        self.domain,
                        workers.len()
                    );
                    self.transition(SessionState::Draining)?;
                    break;
                }

                let url = match self.next_admitted() {
                    Some(url) => url,
                    None => break,
                };

                tracing::debug!("Visiting {}", url);
                let renderer = Arc::clone(&renderer);
                let ctx = Arc::clone(&ctx);
                workers.spawn(async move {
                    let result = extract_links(renderer.as_ref(), &url, &ctx).await;
                    VisitReport { url, result }
                });
                self.stats.peak_in_flight = self.stats.peak_in_flight.max(workers.len());
            }

            let joined = match workers.join_next().await {
                Some(joined) => joined,
                None => break,
            };

            match joined {
                Ok(report) => self.apply(report),
                Err(e) => {
                    self.stats.pages_failed += 1;
                    tracing::warn!("{}: visit task aborted: {}", self.domain, e);
                }
            }

            reaped += 1;
            if reaped % 10 == 0 {
                let elapsed = start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "{}: {} pages visited, {} queued, {} products, {:.2} pages/sec",
                    self.domain,
                    self.stats.pages_visited,
                    self.frontier.len(),
                    self.ledger.product_count(),
                    self.stats.pages_visited as f64 / elapsed.max(f64::EPSILON)
                );
            }
        }

        if self.state == SessionState::Running {
            self.transition(SessionState::Draining)?;
        }
        self.transition(SessionState::Done)?;

        let products = self.ledger.products();
        tracing::info!(
            "Finished crawl of {}: {} pages visited ({} failed), {} products in {:.1}s",
            self.domain,
            self.stats.pages_visited,
            self.stats.pages_failed,
            products.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(products)
    }

    /// Dequeues until a URL passes admission or the frontier runs dry
    fn next_admitted(&mut self) -> Option<String> {
        while let Some(raw) = self.frontier.pop() {
            let url = normalize_url(&raw);
            match self.admit(&url) {
                Ok(()) => {
                    self.stats.pages_visited += 1;
                    return Some(url);
                }
                Err(Skip::Visited) => self.stats.duplicates_skipped += 1,
                Err(reason) => {
                    tracing::debug!("Skipping {} ({:?})", url, reason);
                    self.stats.links_skipped += 1;
                }
            }
        }
        None
    }

    fn admit(&self, url: &str) -> Result<(), Skip> {
        if is_out_of_domain(url, &self.base_url) {
            return Err(Skip::OutOfDomain);
        }
        if self.classifier.classify(url) == UrlClass::Ignored {
            return Err(Skip::Ignored);
        }
        if let Some(robots) = &self.robots {
            if !robots.is_allowed(url) {
                return Err(Skip::Disallowed);
            }
        }
        if !self.ledger.claim(url) {
            return Err(Skip::Visited);
        }
        Ok(())
    }

    fn apply(&mut self, report: VisitReport) {
        match report.result {
            Ok(extraction) => {
                if extraction.outcome.is_partial() {
                    self.stats.partial_extractions += 1;
                }
                tracing::debug!(
                    "{}: {} new links, {} new products",
                    report.url,
                    extraction.links.len(),
                    extraction.new_products
                );
                self.frontier.extend(extraction.links);
            }
            Err(e) => {
                self.stats.pages_failed += 1;
                tracing::warn!("Failed to extract links from {}: {}", report.url, e);
            }
        }
    }

    fn page_cap_reached(&self) -> bool {
        self.max_pages
            .map_or(false, |cap| self.ledger.visited_count() >= cap)
    }

    fn transition(&mut self, to: SessionState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::trace!("{}: {} -> {}", self.domain, self.state, to);
        self.state = to;
        Ok(())
    }
}
