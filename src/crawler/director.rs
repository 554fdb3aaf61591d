//! Crawl director: one session per domain, run concurrently
//!
//! Every domain gets its own renderer from the [`RendererFactory`] and its own
//! tokio task. A semaphore caps how many domains crawl at once. Whatever
//! happens inside a domain's task (a launch failure, a session error, a panic)
//! ends up as a failed [`DomainReport`] for that domain alone, and the
//! renderer is shut down in every case.

use crate::config::Config;
use crate::crawler::session::{CrawlSession, SessionStats};
use crate::output::{CrawlReport, DomainReport};
use crate::render::{build_http_client, RendererFactory};
use crate::robots::fetch_robots;
use crate::url::{Classifier, Domain};
use crate::{ConfigError, CrawlError};
use chrono::Utc;
use reqwest::Client;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A domain ready to crawl, validated before any task starts
struct DomainJob {
    domain: Domain,
    classifier: Classifier,
}

/// Runs crawl sessions for many domains and aggregates their products
pub struct CrawlDirector {
    config: Arc<Config>,
    factory: Arc<dyn RendererFactory>,
}

impl CrawlDirector {
    pub fn new(config: Config, factory: Arc<dyn RendererFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls every domain and returns one report entry per distinct domain
    ///
    /// # Arguments
    ///
    /// * `domains` - Domain strings; duplicates after normalization collapse
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All sessions ended, successfully or not
    /// * `Err(ConfigError)` - A domain or its pattern rules are invalid; nothing was crawled
    pub async fn run<I, S>(&self, domains: I) -> Result<CrawlReport, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let jobs = self.prepare(domains)?;
        let started_at = Utc::now();
        tracing::info!(
            "Crawling {} domains ({} at a time)",
            jobs.len(),
            self.config.crawler.max_concurrent_domains
        );

        let robots_client = self.robots_client();

        // A domain whose task dies before reporting keeps this entry
        let mut reports: BTreeMap<Domain, DomainReport> = jobs
            .iter()
            .map(|job| {
                let report = DomainReport::failed(
                    job.domain.as_str(),
                    job.domain.base_url(&self.config.crawler.scheme),
                    "crawl task did not complete",
                    SessionStats::default(),
                    started_at,
                );
                (job.domain.clone(), report)
            })
            .collect();

        let semaphore = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_domains.max(1),
        ));
        let mut tasks: JoinSet<(Domain, DomainReport)> = JoinSet::new();

        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            let config = Arc::clone(&self.config);
            let factory = Arc::clone(&self.factory);
            let robots_client = robots_client.clone();

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let domain = job.domain.clone();
                let report = crawl_domain(job, config, factory, robots_client).await;
                (domain, report)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((domain, report)) => {
                    reports.insert(domain, report);
                }
                Err(e) => tracing::error!("Domain task aborted: {}", e),
            }
        }

        let report = CrawlReport {
            started_at,
            finished_at: Utc::now(),
            domains: reports.into_values().collect(),
        };
        tracing::info!(
            "Crawl finished: {} domains completed, {} failed, {} product URLs",
            report.completed_count(),
            report.failed_count(),
            report.total_products()
        );
        Ok(report)
    }

    /// Parses, deduplicates and builds classifiers for every domain up front
    fn prepare<I, S>(&self, domains: I) -> Result<Vec<DomainJob>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();

        for raw in domains {
            let raw = raw.as_ref();
            let domain = Domain::parse(raw).map_err(|source| ConfigError::InvalidDomain {
                domain: raw.to_string(),
                source,
            })?;
            if !seen.insert(domain.clone()) {
                tracing::debug!("Ignoring duplicate domain {}", domain);
                continue;
            }
            let classifier = Classifier::new(&self.config.patterns_for(domain.as_str()))?;
            jobs.push(DomainJob { domain, classifier });
        }

        Ok(jobs)
    }

    fn robots_client(&self) -> Option<Client> {
        if !self.config.crawler.respect_robots {
            return None;
        }
        match build_http_client(
            &self.config.user_agent,
            self.config.crawler.navigation_timeout(),
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Cannot build robots.txt client, robots rules disabled: {}", e);
                None
            }
        }
    }
}

/// Runs one domain from renderer launch to shutdown
async fn crawl_domain(
    job: DomainJob,
    config: Arc<Config>,
    factory: Arc<dyn RendererFactory>,
    robots_client: Option<Client>,
) -> DomainReport {
    let started_at = Utc::now();
    let DomainJob { domain, classifier } = job;
    let base_url = domain.base_url(&config.crawler.scheme);

    let renderer = match factory.launch(&domain).await {
        Ok(renderer) => renderer,
        Err(source) => {
            let error = CrawlError::Launch {
                domain: domain.to_string(),
                source,
            };
            tracing::error!("{}", error);
            return DomainReport::failed(
                domain.as_str(),
                base_url,
                error,
                SessionStats::default(),
                started_at,
            );
        }
    };

    let mut session = CrawlSession::new(domain.clone(), &config.crawler, classifier);
    if let Some(client) = robots_client {
        let robots = fetch_robots(&client, &base_url, &config.user_agent.crawler_name).await;
        if robots.blocks_site() {
            tracing::warn!("robots.txt for {} disallows the whole site", domain);
        }
        session = session.with_robots(robots);
    }

    // A panic inside the session surfaces here as a JoinError
    let session_renderer = Arc::clone(&renderer);
    let joined = tokio::spawn(async move {
        let result = session.run(session_renderer).await;
        (session, result)
    })
    .await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("Failed to shut down renderer for {}: {}", domain, e);
    }

    match joined {
        Ok((session, Ok(products))) => DomainReport::completed(
            domain.as_str(),
            base_url,
            products,
            session.stats().clone(),
            started_at,
        ),
        Ok((session, Err(error))) => {
            tracing::error!("Crawl of {} failed: {}", domain, error);
            DomainReport::failed(
                domain.as_str(),
                base_url,
                error,
                session.stats().clone(),
                started_at,
            )
        }
        Err(e) => {
            let error = CrawlError::Aborted {
                domain: domain.to_string(),
                message: e.to_string(),
            };
            tracing::error!("{}", error);
            DomainReport::failed(
                domain.as_str(),
                base_url,
                error,
                SessionStats::default(),
                started_at,
            )
        }
    }
}
