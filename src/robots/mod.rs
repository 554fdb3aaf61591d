//! Robots.txt handling module
//!
//! A basic allow/disallow check: each session fetches its site's robots.txt once
//! and skips URLs the rules disallow. Crawl-delay and sitemap directives are not
//! interpreted.

mod parser;

pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};

/// Fetches and parses robots.txt for a site
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `base_url` - The session's base URL; only its origin is used
/// * `agent` - The crawler's user-agent product token
///
/// # Returns
///
/// The parsed rules. A missing file (4xx) or an unreachable server yields
/// [`ParsedRobots::allow_all`]; the failure is logged, never propagated.
pub async fn fetch_robots(client: &Client, base_url: &str, agent: &str) -> ParsedRobots {
    let robots_url = match url::Url::parse(base_url).and_then(|u| u.join("/robots.txt")) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL from {}: {}", base_url, e);
            return ParsedRobots::allow_all();
        }
    };

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status() == StatusCode::OK => match response.text().await {
            Ok(body) => {
                tracing::debug!("Loaded robots.txt from {} ({} bytes)", robots_url, body.len());
                ParsedRobots::from_content(&body, agent)
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!(
                "No robots.txt at {} (HTTP {}), allowing all",
                robots_url,
                response.status()
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
