//! Integration tests for the crawler
//!
//! Most tests drive the director and sessions with a scripted in-memory
//! renderer. The last ones use wiremock to run the full stack over HTTP.

use aisle::config::{Config, CrawlerConfig};
use aisle::crawler::{crawl, CrawlDirector, CrawlSession};
use aisle::output::DomainStatus;
use aisle::render::{RenderError, RenderedPage, Renderer, RendererFactory};
use aisle::{Classifier, Domain, SessionState};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Shared counters observed by the tests
#[derive(Default)]
struct Probe {
    opened: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    launches: AtomicUsize,
    shutdowns: AtomicUsize,
}

/// A page whose DOM grows by one batch of links per scroll
struct ScriptedPage {
    batches: Vec<Vec<String>>,
    shown: usize,
    probe: Arc<Probe>,
}

#[async_trait]
impl RenderedPage for ScriptedPage {
    async fn links(&mut self) -> Result<Vec<String>, RenderError> {
        Ok(self.batches[..self.shown].concat())
    }

    async fn scroll_extent(&mut self) -> Result<u64, RenderError> {
        Ok(self.shown as u64 * 800)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        if self.shown < self.batches.len() {
            self.shown += 1;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One site's link graph; each page is a list of scroll batches
#[derive(Default)]
struct ScriptedSite {
    pages: HashMap<String, Vec<Vec<String>>>,
    fail: HashSet<String>,
    panic_on: HashSet<String>,
    latency: Duration,
}

impl ScriptedSite {
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            vec![links.iter().map(|l| l.to_string()).collect()],
        );
        self
    }

    fn scrolling_page(mut self, url: &str, batches: Vec<Vec<&str>>) -> Self {
        self.pages.insert(
            url.to_string(),
            batches
                .into_iter()
                .map(|b| b.into_iter().map(String::from).collect())
                .collect(),
        );
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.fail.insert(url.to_string());
        self
    }

    fn panicking(mut self, url: &str) -> Self {
        self.panic_on.insert(url.to_string());
        self
    }

    fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

struct ScriptedRenderer {
    site: Arc<ScriptedSite>,
    probe: Arc<Probe>,
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>, RenderError> {
        self.probe.opened.lock().unwrap().push(url.to_string());
        if self.site.panic_on.contains(url) {
            panic!("renderer crashed on {}", url);
        }
        if self.site.fail.contains(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }

        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.site.latency).await;

        let batches = self
            .site
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| vec![Vec::new()]);
        Ok(Box::new(ScriptedPage {
            batches,
            shown: 1,
            probe: Arc::clone(&self.probe),
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launches a scripted renderer per domain; listed domains fail to launch
#[derive(Default)]
struct ScriptedFactory {
    sites: HashMap<String, Arc<ScriptedSite>>,
    broken: HashSet<String>,
    probe: Arc<Probe>,
}

impl ScriptedFactory {
    fn site(mut self, domain: &str, site: ScriptedSite) -> Self {
        self.sites.insert(domain.to_string(), Arc::new(site));
        self
    }

    fn broken(mut self, domain: &str) -> Self {
        self.broken.insert(domain.to_string());
        self
    }
}

#[async_trait]
impl RendererFactory for ScriptedFactory {
    async fn launch(&self, domain: &Domain) -> Result<Arc<dyn Renderer>, RenderError> {
        if self.broken.contains(domain.as_str()) {
            return Err(RenderError::Launch("browser executable not found".to_string()));
        }
        self.probe.launches.fetch_add(1, Ordering::SeqCst);
        let site = self.sites.get(domain.as_str()).cloned().unwrap_or_default();
        Ok(Arc::new(ScriptedRenderer {
            site,
            probe: Arc::clone(&self.probe),
        }))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.scroll_settle_ms = 0;
    config.crawler.max_concurrent_tasks = 4;
    config.crawler.respect_robots = false;
    config
}

fn shop_site() -> ScriptedSite {
    ScriptedSite::default()
        .page(
            "https://shop.test",
            &[
                "https://shop.test/product/1",
                "https://shop.test/about",
                "https://shop.test/category",
            ],
        )
        .page(
            "https://shop.test/category",
            &["https://shop.test/product/2", "https://other.test/x"],
        )
}

#[tokio::test]
async fn test_end_to_end_shop() {
    let factory = Arc::new(ScriptedFactory::default().site("shop.test", shop_site()));
    let probe = Arc::clone(&factory.probe);

    let report = CrawlDirector::new(test_config(), factory)
        .run(["shop.test"])
        .await
        .expect("Crawl failed");

    let shop = report.get("shop.test").unwrap();
    assert_eq!(shop.status, DomainStatus::Completed);
    assert_eq!(
        shop.products,
        vec!["https://shop.test/product/1", "https://shop.test/product/2"]
    );
    assert_eq!(shop.stats.pages_visited, 2);

    let mut opened = probe.opened.lock().unwrap().clone();
    opened.sort();
    assert_eq!(opened, vec!["https://shop.test", "https://shop.test/category"]);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_visited_set_matches_scenario() {
    let probe = Arc::new(Probe::default());
    let renderer = Arc::new(ScriptedRenderer {
        site: Arc::new(shop_site()),
        probe,
    });
    let config = test_config();
    let mut session = CrawlSession::new(
        Domain::parse("https://www.shop.test").unwrap(),
        &config.crawler,
        Classifier::default(),
    );

    session.run(renderer).await.unwrap();

    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(
        session.visited(),
        vec!["https://shop.test", "https://shop.test/category"]
    );
}

#[tokio::test]
async fn test_infinite_scroll_is_followed_and_capped() {
    let site = ScriptedSite::default()
        .scrolling_page(
            "https://feed.test",
            vec![
                vec!["https://feed.test/product/1"],
                vec!["https://feed.test/product/2"],
                vec!["https://feed.test/product/3", "https://feed.test/sale"],
            ],
        )
        .scrolling_page(
            "https://feed.test/sale",
            (1..=10)
                .map(|i| match i {
                    1 => vec!["https://feed.test/dp/a1"],
                    2 => vec!["https://feed.test/dp/a2"],
                    _ => vec!["https://feed.test/dp/never"],
                })
                .collect(),
        );
    let probe = Arc::new(Probe::default());
    let renderer = Arc::new(ScriptedRenderer {
        site: Arc::new(site),
        probe,
    });
    let config = CrawlerConfig {
        max_scroll_iterations: 3,
        ..test_config().crawler
    };
    let mut session = CrawlSession::new(
        Domain::parse("feed.test").unwrap(),
        &config,
        Classifier::default(),
    );

    let products = session.run(renderer).await.unwrap();

    // The feed page settles after its third batch; the sale page never settles
    assert_eq!(
        products,
        vec![
            "https://feed.test/dp/a1",
            "https://feed.test/dp/a2",
            "https://feed.test/dp/never",
            "https://feed.test/product/1",
            "https://feed.test/product/2",
            "https://feed.test/product/3",
        ]
    );
    assert_eq!(session.stats().partial_extractions, 1);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_crawl() {
    let site = ScriptedSite::default()
        .page(
            "https://shop.test",
            &["https://shop.test/women", "https://shop.test/men"],
        )
        .page("https://shop.test/men", &["https://shop.test/p/42"])
        .page("https://shop.test/women", &["https://shop.test/p/7"])
        .failing("https://shop.test/women")
        .panicking("https://shop.test/men");
    let factory = Arc::new(ScriptedFactory::default().site("shop.test", site));

    let report = CrawlDirector::new(test_config(), factory)
        .run(["shop.test"])
        .await
        .unwrap();

    let shop = report.get("shop.test").unwrap();
    assert!(shop.is_completed());
    assert!(shop.products.is_empty());
    assert_eq!(shop.stats.pages_visited, 3);
    assert_eq!(shop.stats.pages_failed, 2);
}

#[tokio::test]
async fn test_domain_failures_are_isolated() {
    let factory = Arc::new(
        ScriptedFactory::default()
            .site("shop.test", shop_site())
            .broken("down.test"),
    );
    let probe = Arc::clone(&factory.probe);

    let report = CrawlDirector::new(test_config(), factory)
        .run(["shop.test", "down.test"])
        .await
        .unwrap();

    let down = report.get("down.test").unwrap();
    assert!(!down.is_completed());
    assert!(down.error().unwrap().contains("browser executable not found"));

    let result = report.into_result();
    assert_eq!(result.len(), 2);
    assert!(result["down.test"].is_empty());
    assert_eq!(result["shop.test"].len(), 2);

    // Only launched renderers need shutting down
    assert_eq!(probe.launches.load(Ordering::SeqCst), 1);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_renderer_is_shut_down() {
    let mut factory = ScriptedFactory::default();
    for i in 0..6 {
        let domain = format!("shop{}.test", i);
        let base = format!("https://{}", domain);
        let product = format!("{}/product/{}", base, i);
        let site = ScriptedSite::default().page(&base, &[product.as_str()]);
        factory = factory.site(&domain, site);
    }
    let factory = Arc::new(factory);
    let probe = Arc::clone(&factory.probe);

    let mut config = test_config();
    config.crawler.max_concurrent_domains = 2;
    let domains: Vec<String> = (0..6).map(|i| format!("shop{}.test", i)).collect();

    let report = CrawlDirector::new(config, factory)
        .run(&domains)
        .await
        .unwrap();

    assert_eq!(report.completed_count(), 6);
    assert_eq!(report.total_products(), 6);
    assert_eq!(probe.launches.load(Ordering::SeqCst), 6);
    assert_eq!(probe.shutdowns.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let mut site = ScriptedSite::default().latency(Duration::from_millis(20));
    let links: Vec<String> = (0..30)
        .map(|i| format!("https://wide.test/c/{}", i))
        .collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    site = site.page("https://wide.test", &link_refs);
    let factory = Arc::new(ScriptedFactory::default().site("wide.test", site));
    let probe = Arc::clone(&factory.probe);

    let mut config = test_config();
    config.crawler.max_concurrent_tasks = 5;

    let report = CrawlDirector::new(config, factory)
        .run(["wide.test"])
        .await
        .unwrap();

    let wide = report.get("wide.test").unwrap();
    assert_eq!(wide.stats.pages_visited, 31);
    assert!(wide.stats.peak_in_flight <= 5);
    assert!(probe.peak.load(Ordering::SeqCst) <= 5);
    assert!(probe.peak.load(Ordering::SeqCst) > 1);
}

fn page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let domain = mock_server
        .uri()
        .trim_start_matches("http://")
        .to_string();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
            "/product/1",
            "/category",
            "/about",
            "/private/deals",
            "https://elsewhere.test/product/9",
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
            "/product/2#reviews",
            "/category?page=2",
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    // The paginated category shares the path and fails
    Mock::given(method("GET"))
        .and(path("/category"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/deals"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.crawler.scheme = "http".to_string();
    config.crawler.respect_robots = true;
    config.domains = vec![domain.clone()];

    let report = crawl(config).await.expect("Crawl failed");

    let site = report.get(&domain).unwrap();
    assert!(site.is_completed());
    assert_eq!(
        site.products,
        vec![
            format!("{}/product/1", mock_server.uri()),
            format!("{}/product/2", mock_server.uri()),
        ]
    );
    // Base page, category, and the failing second category page
    assert_eq!(site.stats.pages_visited, 3);
    assert_eq!(site.stats.pages_failed, 1);
}

#[tokio::test]
async fn test_unreachable_domain_completes_empty() {
    let mut config = test_config();
    config.crawler.scheme = "http".to_string();
    config.crawler.navigation_timeout_secs = 2;
    config.domains = vec!["127.0.0.1:1".to_string()];

    let report = crawl(config).await.unwrap();

    let result = report.into_result();
    assert_eq!(result.len(), 1);
    assert!(result["127.0.0.1:1"].is_empty());
}
