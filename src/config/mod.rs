//! Configuration module for Product Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Site layout, request headers, retry policy and selector mappings all live
//! here so tests can point the crawler at a mock server.
//!
//! # Example
//!
//! ```no_run
//! use product_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Detail concurrency: {}", config.crawler.max_concurrent_details);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffKind, CrawlerConfig, DetailSelectors, FetchConfig, FieldSelector, HarvestConfig,
    HeaderConfig, ListingSelectors, OutputConfig, OutputFormat, ReviewSelectors, SelectorConfig,
    SiteConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
