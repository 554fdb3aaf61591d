use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Aisle
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Domains to crawl, one session each
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub patterns: PatternGroups,
    /// Per-domain pattern overrides
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteOverride>,
}

impl Config {
    /// Returns the pattern groups that apply to `domain`
    ///
    /// A `[[site]]` entry replaces only the groups it names; the others fall back to
    /// the global `[patterns]` table. `domain` is expected to be normalized already.
    pub fn patterns_for(&self, domain: &str) -> PatternGroups {
        let mut groups = self.patterns.clone();
        if let Some(site) = self
            .sites
            .iter()
            .find(|s| crate::url::normalize_domain(&s.domain) == domain)
        {
            if let Some(product) = &site.product {
                groups.product = product.clone();
            }
            if let Some(ignore) = &site.ignore {
                groups.ignore = ignore.clone();
            }
        }
        groups
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of pages rendered concurrently within one domain session
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Maximum number of domain sessions running at the same time
    #[serde(default = "default_max_concurrent_domains")]
    pub max_concurrent_domains: usize,

    /// Wait after each scroll for lazily loaded content (milliseconds)
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,

    /// Maximum number of scroll rounds on a single page
    #[serde(default = "default_max_scroll_iterations")]
    pub max_scroll_iterations: u32,

    /// Maximum time spent navigating to a single page (seconds)
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Maximum time spent on a single page, scrolling included (seconds)
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Optional cap on pages visited per domain
    #[serde(default)]
    pub max_pages_per_domain: Option<usize>,

    /// Scheme used to build each domain's base URL
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Whether robots.txt is consulted before visiting a page
    #[serde(default = "default_respect_robots")]
    pub respect_robots: bool,
}

impl CrawlerConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            max_concurrent_domains: default_max_concurrent_domains(),
            scroll_settle_ms: default_scroll_settle_ms(),
            max_scroll_iterations: default_max_scroll_iterations(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            page_timeout_secs: default_page_timeout_secs(),
            max_pages_per_domain: None,
            scheme: default_scheme(),
            respect_robots: default_respect_robots(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value, e.g. `Aisle/1.0 (+https://example.com/bot)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the flat `{domain: [url, ...]}` JSON file
    #[serde(default = "default_results_path")]
    pub results_path: String,

    /// Optional path of the detailed per-domain report
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            report_path: None,
        }
    }
}

/// Named groups of URL classification rules (regular expressions)
///
/// Product rules are always evaluated before ignore rules.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PatternGroups {
    #[serde(default = "default_product_patterns")]
    pub product: Vec<String>,

    #[serde(default = "default_ignore_patterns")]
    pub ignore: Vec<String>,
}

impl Default for PatternGroups {
    fn default() -> Self {
        Self {
            product: default_product_patterns(),
            ignore: default_ignore_patterns(),
        }
    }
}

/// Pattern overrides for a single domain
#[derive(Debug, Clone, Deserialize)]
pub struct SiteOverride {
    /// Domain the override applies to (normalized before matching)
    pub domain: String,

    /// Replacement product rules
    #[serde(default)]
    pub product: Option<Vec<String>>,

    /// Replacement ignore rules
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

fn default_max_concurrent_tasks() -> usize {
    50
}

fn default_max_concurrent_domains() -> usize {
    50
}

fn default_scroll_settle_ms() -> u64 {
    2000
}

fn default_max_scroll_iterations() -> u32 {
    50
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_page_timeout_secs() -> u64 {
    120
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_respect_robots() -> bool {
    true
}

fn default_crawler_name() -> String {
    "Aisle".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_results_path() -> String {
    "results.json".to_string()
}

/// Built-in product page rules, in evaluation order
pub fn default_product_patterns() -> Vec<String> {
    [
        r"/buy",
        r"-p[0-9]+\.html",
        r"/product/",
        r"/dp/",
        r"/p/",
        r"/productpage\.[0-9]+\.html",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Built-in rules for pages that are never followed
pub fn default_ignore_patterns() -> Vec<String> {
    [
        // Site sections
        r"/contact",
        r"/about",
        r"/help",
        r"/faq",
        r"/privacy",
        r"/terms",
        r"/shipping",
        r"/news",
        r"customer",
        r"privacy",
        // Account
        r"/log",
        r"/forgot",
        // Transaction flow
        r"/cart",
        r"/checkout",
        r"/payment",
        r"/order",
        r"/return",
        r"/track",
        // Well-known files
        r"/robots\.txt$",
        r"/sitemap\.xml$",
        r"/favicon\.ico$",
        r"/manifest\.json$",
        r"/ads\.txt$",
        r"/security\.txt$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
