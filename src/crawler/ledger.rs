//! Visited and discovered-product sets of one session
//!
//! Both sets only grow. Workers of the same session share one ledger; sessions
//! never share ledgers.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Sets {
    visited: HashSet<String>,
    products: HashSet<String>,
}

/// Mutex-guarded visited and product sets
#[derive(Debug, Default)]
pub struct CrawlLedger {
    sets: Mutex<Sets>,
}

impl CrawlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` visited, returning false if it already was
    ///
    /// Check and insert happen under one lock, so two workers can never both
    /// claim the same URL.
    pub fn claim(&self, url: &str) -> bool {
        let mut sets = self.lock();
        if sets.visited.contains(url) {
            return false;
        }
        sets.visited.insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    /// Records a product URL, returning true if it was new
    pub fn add_product(&self, url: &str) -> bool {
        let mut sets = self.lock();
        if sets.products.contains(url) {
            return false;
        }
        sets.products.insert(url.to_string())
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }

    /// Sorted snapshot of the visited set
    pub fn visited(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().visited.iter().cloned().collect();
        urls.sort();
        urls
    }

    /// Sorted snapshot of the product set
    pub fn products(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().products.iter().cloned().collect();
        urls.sort();
        urls
    }

    fn lock(&self) -> MutexGuard<'_, Sets> {
        self.sets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
