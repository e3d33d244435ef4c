//! Integration tests for the crawl pipeline
//!
//! `crawl_tests` drives the real HTTP stack against a wiremock server;
//! `pipeline_tests` swaps in an instrumented transport to observe
//! concurrency, ordering and progress reporting.

mod crawl_tests;
mod pipeline_tests;
