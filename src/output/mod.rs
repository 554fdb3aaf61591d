//! Output module for crawl results and reports
//!
//! This module handles:
//! - The per-domain report produced by the director
//! - Writing the flat `domain -> product URLs` JSON result
//! - Writing the detailed JSON report and printing a terminal summary

mod json;
mod summary;

pub use json::{write_report_json, write_results_json};
pub use summary::print_summary;

use crate::crawler::SessionStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Domain to sorted product URLs, one entry per requested domain
pub type CrawlResult = BTreeMap<String, Vec<String>>;

/// How a domain's session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DomainStatus {
    /// The frontier was exhausted (or the page cap reached)
    Completed,

    /// The session could not start or did not finish; products are empty
    Failed { error: String },
}

/// Outcome of one domain's crawl
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub base_url: String,
    #[serde(flatten)]
    pub status: DomainStatus,
    pub products: Vec<String>,
    pub stats: SessionStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DomainReport {
    pub fn completed(
        domain: impl Into<String>,
        base_url: impl Into<String>,
        products: Vec<String>,
        stats: SessionStats,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.into(),
            base_url: base_url.into(),
            status: DomainStatus::Completed,
            products,
            stats,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A failed domain never reports products, whatever was found before the failure
    pub fn failed(
        domain: impl Into<String>,
        base_url: impl Into<String>,
        error: impl ToString,
        stats: SessionStats,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.into(),
            base_url: base_url.into(),
            status: DomainStatus::Failed {
                error: error.to_string(),
            },
            products: Vec::new(),
            stats,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == DomainStatus::Completed
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            DomainStatus::Completed => None,
            DomainStatus::Failed { error } => Some(error),
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Everything a director run produced, domains in sorted order
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domains: Vec<DomainReport>,
}

impl CrawlReport {
    pub fn get(&self, domain: &str) -> Option<&DomainReport> {
        self.domains.iter().find(|d| d.domain == domain)
    }

    /// The flat result map
    pub fn result(&self) -> CrawlResult {
        self.domains
            .iter()
            .map(|d| (d.domain.clone(), d.products.clone()))
            .collect()
    }

    pub fn into_result(self) -> CrawlResult {
        self.domains
            .into_iter()
            .map(|d| (d.domain, d.products))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.domains.iter().filter(|d| d.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.domains.len() - self.completed_count()
    }

    pub fn total_products(&self) -> usize {
        self.domains.iter().map(|d| d.products.len()).sum()
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
