//! Crawler module for mirroring a manual
//!
//! This module contains the core mirroring logic, including:
//! - Cached HTTP fetching with retry logic
//! - Frameset and page parsing
//! - The shared conversion queue and its worker pool
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod layout;
mod parser;
mod queue;
mod task;

pub use coordinator::{CrawlReport, Crawler};
pub use fetcher::{build_http_client, Fetch, HttpFetcher};
pub use layout::Layout;
pub use parser::{
    extract_menu, extract_model, extract_page_links, find_frame_src, PageAnchor, PageLinks,
    ServiceMenu,
};
pub use queue::ConversionQueue;
pub use task::{ConversionTask, Job, Source, UnitKind};

use crate::config::Config;
use crate::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Runs a complete mirror over HTTP
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Lay out the output directory for the site id
/// 2. Build the cached HTTP fetcher
/// 3. Crawl every section and convert what it reaches
/// 4. Write the MkDocs manifest
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished; failed units are listed in the report
/// * `Err(MirrorError)` - The run was aborted
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wsm_mirror::config::load_config;
/// use wsm_mirror::crawler::mirror;
///
/// # async fn example() -> wsm_mirror::Result<()> {
/// let config = load_config(Path::new("wsm.toml"))?;
/// let report = mirror(config).await?;
/// println!("{} units converted", report.converted);
/// # Ok(())
/// # }
/// ```
pub async fn mirror(config: Config) -> Result<CrawlReport> {
    let layout = Layout::new(&config.output.root, &config.site.site_id);
    let fetcher = HttpFetcher::new(&config, layout.cache())?;
    let crawler = Crawler::new(config, fetcher)?;
    crawler.run().await
}

/// Locks `mutex`, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
