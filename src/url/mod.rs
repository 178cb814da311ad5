//! URL handling module
//!
//! This module provides URL normalization and the domain scoping rules that
//! keep a crawl on its seed's host.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_site};
pub use normalize::normalize_url;
