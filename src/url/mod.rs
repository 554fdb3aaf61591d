//! URL handling module for Aisle
//!
//! This module provides domain and URL normalization, same-site checks, and the
//! pattern-driven classifier that decides whether a URL is a product page, a page to
//! follow, or a page to ignore.

mod classify;
mod domain;
mod normalize;

// Re-export main functions
pub use classify::{Classifier, UrlClass};
pub use domain::{is_out_of_domain, Domain};
pub use normalize::{normalize_domain, normalize_url};
