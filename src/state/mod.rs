//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UnitState`: Tracks the state of individual output units (discovered, fetched, queued, converted, etc.)
//! - `CrawlLedger`: Latest state of every unit in a run, plus the causes of permanent failures

mod ledger;
mod unit_state;

// Re-export main types
pub use ledger::CrawlLedger;
pub use unit_state::UnitState;
