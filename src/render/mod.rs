//! Page rendering adapter
//!
//! The crawl engine never talks to a browser directly. It consumes three seams:
//!
//! - [`RendererFactory`] launches one [`Renderer`] per domain session
//! - [`Renderer`] is the session's shared rendering context; each worker opens its
//!   own [`RenderedPage`] from it
//! - [`RenderedPage`] exposes the anchors currently in the DOM, the scroll extent,
//!   and a scroll-to-bottom action
//!
//! [`HttpRenderer`] is the bundled implementation for sites that serve their links
//! in static HTML. A headless-browser backend plugs in behind the same traits.

mod html;
mod http;

pub use html::extract_anchor_hrefs;
pub use http::{build_http_client, HttpRenderer, HttpRendererFactory};

use crate::url::Domain;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a renderer backend
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Page evaluation failed for {url}: {message}")]
    Evaluation { url: String, message: String },

    #[error("Renderer launch failed: {0}")]
    Launch(String),
}

/// A page opened in a renderer, after navigation completed
#[async_trait]
pub trait RenderedPage: Send {
    /// All anchor hrefs currently in the DOM, as absolute URLs
    async fn links(&mut self) -> Result<Vec<String>, RenderError>;

    /// Current scrollable height of the document
    async fn scroll_extent(&mut self) -> Result<u64, RenderError>;

    /// Scrolls to the bottom to trigger lazily loaded content
    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// Closes the page (tab)
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// A rendering context shared by all workers of one session
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigates a new page to `url`
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>, RenderError>;

    /// Releases the context; called exactly once when the session ends
    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// Launches a fresh renderer for each domain session
#[async_trait]
pub trait RendererFactory: Send + Sync {
    async fn launch(&self, domain: &Domain) -> Result<Arc<dyn Renderer>, RenderError>;
}
