//! Static HTML renderer over plain HTTP
//!
//! This backend fetches a page with `reqwest` and reads its anchors with `scraper`.
//! It executes no scripts, so its scroll extent never changes and the extraction
//! loop settles after one pass.

use crate::config::UserAgentConfig;
use crate::render::html::extract_anchor_hrefs;
use crate::render::{RenderError, RenderedPage, Renderer, RendererFactory};
use crate::url::Domain;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use aisle::config::UserAgentConfig;
/// use aisle::render::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.5"),
    );

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A fetched HTML page
///
/// Its links are fixed at fetch time; scrolling is a no-op.
#[derive(Debug)]
pub struct StaticPage {
    links: Vec<String>,
    extent: u64,
}

#[async_trait]
impl RenderedPage for StaticPage {
    async fn links(&mut self) -> Result<Vec<String>, RenderError> {
        Ok(self.links.clone())
    }

    async fn scroll_extent(&mut self) -> Result<u64, RenderError> {
        Ok(self.extent)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Renderer that fetches pages over HTTP without executing scripts
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>, RenderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Relative links resolve against the post-redirect URL
        let final_url: Url = response.url().clone();

        let body = response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let links = extract_anchor_hrefs(&body, &final_url);
        tracing::trace!("Fetched {} ({} bytes, {} links)", url, body.len(), links.len());

        Ok(Box::new(StaticPage {
            links,
            extent: body.len() as u64,
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Hands every session its own [`HttpRenderer`]
#[derive(Debug, Clone)]
pub struct HttpRendererFactory {
    user_agent: UserAgentConfig,
    timeout: Duration,
}

impl HttpRendererFactory {
    pub fn new(user_agent: UserAgentConfig, timeout: Duration) -> Self {
        Self {
            user_agent,
            timeout,
        }
    }
}

#[async_trait]
impl RendererFactory for HttpRendererFactory {
    async fn launch(&self, domain: &Domain) -> Result<Arc<dyn Renderer>, RenderError> {
        tracing::debug!("Launching HTTP renderer for {}", domain);
        let client = build_http_client(&self.user_agent, self.timeout)
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        Ok(Arc::new(HttpRenderer::new(client)))
    }
}
