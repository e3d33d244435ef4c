//! State module for tracking crawl progress
//!
//! This module provides the phase machine a single crawl moves through and the
//! running counters the orchestrator keeps while it runs.
//!
//! # Components
//!
//! - `CrawlPhase`: Idle, listing walk, detail fan-out, aggregation, done
//! - `CrawlState`: the current phase plus page/URL/record counters

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::CrawlState;
