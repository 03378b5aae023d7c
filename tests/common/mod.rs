//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Project fixtures with pages, dotenv files and installed modules
//! - Context loading that ignores the process environment
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures::ProjectFixture;
//!
//! fn test_pages() {
//!     let project = ProjectFixture::new().page("index", "tsx").build();
//!     let ctx = project.context(jm_cli::config::BuildMode::Development);
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeMap;

/// Build a variable map from string pairs
#[allow(dead_code)]
pub fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
