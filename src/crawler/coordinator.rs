//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run loop that coordinates all aspects of
//! mirroring a manual, including:
//! - Locating the frameset, the model name and the sections
//! - Crawling section pages depth-first and fetching their images and PDFs
//! - Converting every unit through the shared queue once the crawl is done,
//!   deferring units whose links are not mapped yet
//! - Writing the MkDocs manifest once the queue drains

use crate::config::Config;
use crate::convert::render_document;
use crate::crawler::fetcher::Fetch;
use crate::crawler::layout::Layout;
use crate::crawler::parser::{extract_menu, extract_model, extract_page_links, find_frame_src};
use crate::crawler::queue::ConversionQueue;
use crate::crawler::task::{ConversionTask, Job, Source, UnitKind};
use crate::crawler::lock;
use crate::site::{article_location, render_manifest, ArticleMap, EntryKind, NavigationTree};
use crate::state::{CrawlLedger, UnitState};
use crate::url::{ensure_relative, join_leaf, local_path, site_base};
use crate::{ConvertError, MirrorError, Result};
use chrono::{DateTime, Utc};
use futures::future::{try_join_all, FutureExt, LocalBoxFuture};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Model name shown by the main menu
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Units written or already present
    pub converted: usize,
    /// Units that failed permanently, with their cause
    pub failures: Vec<(String, String)>,
}

impl CrawlReport {
    /// Returns true if every discovered unit was converted
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler structure
///
/// Owns all state of one run: the dedupe set, the article map, the
/// navigation tree and the unit ledger.
pub struct Crawler<F: Fetch> {
    config: Config,
    fetcher: F,
    start: Url,
    base: Url,
    layout: Layout,
    queue: ConversionQueue<Job>,
    /// Conversions held back until the crawl phase drains
    pending: Mutex<Vec<ConversionTask>>,
    seen: Mutex<HashSet<String>>,
    articles: Mutex<ArticleMap>,
    navigation: Mutex<NavigationTree>,
    ledger: Mutex<CrawlLedger>,
}

impl<F: Fetch> Crawler<F> {
    /// Creates a new crawler instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `fetcher` - Source of page, image and PDF bytes
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(MirrorError)` - The start URL is unusable
    pub fn new(config: Config, fetcher: F) -> Result<Self> {
        let start = Url::parse(&config.site.start_url)?;
        let base = site_base(&start)?;
        let layout = Layout::new(&config.output.root, &config.site.site_id);

        Ok(Self {
            config,
            fetcher,
            start,
            base,
            layout,
            queue: ConversionQueue::new(),
            pending: Mutex::new(Vec::new()),
            seen: Mutex::new(HashSet::new()),
            articles: Mutex::new(ArticleMap::new()),
            navigation: Mutex::new(NavigationTree::new()),
            ledger: Mutex::new(CrawlLedger::new()),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Snapshot of the article map
    pub fn articles(&self) -> ArticleMap {
        lock(&self.articles).clone()
    }

    /// Snapshot of the navigation tree
    pub fn navigation(&self) -> NavigationTree {
        lock(&self.navigation).clone()
    }

    /// Snapshot of the unit ledger
    pub fn ledger(&self) -> CrawlLedger {
        lock(&self.ledger).clone()
    }

    /// Runs a complete mirror of the site
    ///
    /// # Process
    ///
    /// 1. Read the start page and both menu frames
    /// 2. Queue one crawl job per section and drain the crawl
    /// 3. Queue every fetched unit in crawl order and drain the conversions
    /// 4. Write `mkdocs.yml`
    pub async fn run(&self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        tracing::info!("Mirroring {} into {}", self.start, self.layout.root().display());

        let (model, sections) = self.discover_sections().await?;
        for (title, url) in sections {
            self.queue.push(Job::Crawl {
                url,
                breadcrumbs: vec![title],
            });
        }

        self.drain().await?;

        let tasks = std::mem::take(&mut *lock(&self.pending));
        tracing::info!("Crawl finished, converting {} units", tasks.len());
        for task in tasks {
            self.enqueue_task(task);
        }

        self.drain().await?;
        self.write_manifest(&model).await?;

        let ledger = lock(&self.ledger);
        let report = CrawlReport {
            model,
            started_at,
            finished_at: Utc::now(),
            converted: ledger.count(|s| s.is_success()),
            failures: ledger.failures(),
        };

        tracing::info!(
            "Run complete: {} converted, {} failed",
            report.converted,
            report.failures.len()
        );

        Ok(report)
    }

    /// Queues a conversion task directly
    pub fn enqueue_task(&self, task: ConversionTask) {
        lock(&self.ledger).record(&task.target_filename, UnitState::Queued);
        self.queue.push(Job::Convert(task));
    }

    /// Runs the worker pool until the queue is drained
    ///
    /// A fatal error closes the queue and is returned once all workers stop.
    pub async fn drain(&self) -> Result<()> {
        let workers = (0..self.config.crawler.workers.max(1)).map(|id| self.worker(id));
        try_join_all(workers).await?;
        Ok(())
    }

    async fn worker(&self, id: usize) -> Result<()> {
        tracing::debug!("Worker {} started", id);

        while let Some(job) = self.queue.next().await {
            let outcome = self.process(job).await;
            self.queue.finish();

            if let Err(e) = outcome {
                if e.is_fatal() {
                    tracing::error!("Worker {} stopping the run: {}", id, e);
                    self.queue.close();
                    return Err(e);
                }
                tracing::warn!("Worker {}: {}", id, e);
            }
        }

        tracing::debug!("Worker {} finished", id);
        Ok(())
    }

    async fn process(&self, job: Job) -> Result<()> {
        match job {
            Job::Crawl { url, breadcrumbs } => {
                let result = self.crawl_page(url.clone(), breadcrumbs).await;
                self.tolerate(result, url.as_str())
            }
            Job::Convert(task) => self.convert(task).await,
        }
    }

    /// Locates the menu frames and returns the model and the section roots
    async fn discover_sections(&self) -> Result<(String, Vec<(String, Url)>)> {
        let site = &self.config.site;
        let index = self.fetch_page(&self.start).await?;

        let main_menu = self.frame_url(&index, &site.main_menu_frame)?;
        let model = extract_model(&self.fetch_page(&main_menu).await?).ok_or_else(|| {
            MirrorError::Topology(format!("no model name in frame '{}'", site.main_menu_frame))
        })?;

        let service_menu = self.frame_url(&index, &site.service_menu_frame)?;
        let menu = extract_menu(&self.fetch_page(&service_menu).await?);

        if menu.titles.is_empty() || menu.paths.is_empty() {
            return Err(MirrorError::Topology(format!(
                "frame '{}' lists {} section titles and {} section pages",
                site.service_menu_frame,
                menu.titles.len(),
                menu.paths.len()
            )));
        }

        if menu.titles.len() != menu.paths.len() {
            tracing::warn!(
                "Service menu lists {} titles but {} pages, using the first {}",
                menu.titles.len(),
                menu.paths.len(),
                menu.titles.len().min(menu.paths.len())
            );
        }

        let sections = menu
            .sections()
            .map(|(title, path)| -> Result<(String, Url)> {
                Ok((title.to_string(), join_leaf(&service_menu, path)?))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Found {} sections for {}", sections.len(), model);
        Ok((model, sections))
    }

    fn frame_url(&self, index: &str, name: &str) -> Result<Url> {
        let src = find_frame_src(index, name)
            .ok_or_else(|| MirrorError::Topology(format!("frame '{}' not found", name)))?;
        join_leaf(&self.start, &src)
    }

    /// Fetches a frameset page, bypassing the dedupe set
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let local = local_path(&self.base, url)?;
        let content = self.fetcher.fetch(url, &local).await?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    /// Fetches `url` unless it has been fetched before in this run
    ///
    /// # Returns
    ///
    /// * `Ok(Some((local, content)))` - First fetch of the unit
    /// * `Ok(None)` - Already fetched
    async fn download(&self, url: &Url, source: Source) -> Result<Option<(String, Vec<u8>)>> {
        let local = local_path(&self.base, url)?;

        if !lock(&self.seen).insert(local.clone()) {
            tracing::debug!("Already fetched: {}", local);
            return Ok(None);
        }

        let unit = source.output_name(&local);
        lock(&self.ledger).record(&unit, UnitState::Discovered);

        match self.fetcher.fetch(url, &local).await {
            Ok(content) => {
                lock(&self.ledger).record(&unit, UnitState::Fetched);
                Ok(Some((local, content)))
            }
            Err(e) => {
                lock(&self.ledger).fail(&unit, e.to_string());
                Err(e)
            }
        }
    }

    /// Crawls a page, its images, its PDF and its in-frame links, then
    /// queues the page itself
    fn crawl_page(&self, url: Url, breadcrumbs: Vec<String>) -> LocalBoxFuture<'_, Result<()>> {
        async move {
            let Some((local, content)) = self.download(&url, Source::Page).await? else {
                return Ok(());
            };

            let site = &self.config.site;
            let links = extract_page_links(
                &String::from_utf8_lossy(&content),
                site.max_links_per_page,
            );

            for src in &links.images {
                let result = self.fetch_asset(&url, src, &breadcrumbs).await;
                self.tolerate(result, src)?;
            }

            for anchor in &links.anchors {
                if anchor.href == site.pdf_trigger {
                    match &links.pdf_name {
                        Some(name) => {
                            let bucket = [site.pdf_breadcrumb.clone()];
                            let leaf = format!("../pdf/{}", name);
                            let result = self.fetch_asset(&url, &leaf, &bucket).await;
                            self.tolerate(result, name)?;
                        }
                        None => tracing::warn!("PDF link on {} without a pdfname", url),
                    }
                }

                let in_frame = anchor
                    .target
                    .as_deref()
                    .is_some_and(|t| site.navigation_targets.iter().any(|n| n == t));

                if in_frame && is_followable(&anchor.href) {
                    let mut trail = breadcrumbs.clone();
                    trail.push(anchor.text.clone());

                    let result = match join_leaf(&url, &anchor.href) {
                        Ok(child) => self.crawl_page(child, trail).await,
                        Err(e) => Err(e),
                    };
                    self.tolerate(result, &anchor.href)?;
                }
            }

            self.enqueue(&breadcrumbs, Source::Page.output_name(&local), content);
            Ok(())
        }
        .boxed_local()
    }

    async fn fetch_asset(&self, page: &Url, leaf: &str, breadcrumbs: &[String]) -> Result<()> {
        let url = join_leaf(page, leaf)?;
        if let Some((local, content)) = self.download(&url, Source::Asset).await? {
            self.enqueue(breadcrumbs, Source::Asset.output_name(&local), content);
        }
        Ok(())
    }

    fn enqueue(&self, breadcrumbs: &[String], filename: String, content: Vec<u8>) {
        let task = ConversionTask::new(
            breadcrumbs.to_vec(),
            filename,
            content,
            self.config.crawler.retry_budget(),
        );
        lock(&self.pending).push(task);
    }

    /// Logs a non-fatal error and carries on; fatal errors pass through
    fn tolerate(&self, result: Result<()>, what: &str) -> Result<()> {
        match result {
            Err(e) if !e.is_fatal() => {
                tracing::warn!("Skipping {}: {}", what, e);
                Ok(())
            }
            other => other,
        }
    }

    /// Converts one unit, deferring it on unresolved links
    async fn convert(&self, task: ConversionTask) -> Result<()> {
        let outcome = match self.prepare(&task) {
            Ok(Some((path, bytes))) => write_output(&path, &bytes).await,
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                let location = article_location(&task.breadcrumbs, &task.target_filename);
                lock(&self.navigation).mark_written(&location);
                lock(&self.ledger).record(&task.target_filename, UnitState::Converted);
                Ok(())
            }
            Err(MirrorError::Convert(ConvertError::UnresolvedLink(link))) => {
                self.defer(task, &link);
                Ok(())
            }
            Err(MirrorError::Convert(ConvertError::PendingLink(link))) => {
                self.wait(task, &link).await;
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.give_up(&task, e.to_string());
                Ok(())
            }
        }
    }

    /// Registers the unit and renders its output
    ///
    /// # Returns
    ///
    /// * `Ok(Some((path, bytes)))` - Output to write
    /// * `Ok(None)` - Output already exists and `force` is off
    fn prepare(&self, task: &ConversionTask) -> Result<Option<(PathBuf, Vec<u8>)>> {
        let site = &self.config.site;
        let name = task.target_filename.as_str();
        let location = article_location(&task.breadcrumbs, name);
        ensure_relative(Path::new(&location))?;

        lock(&self.articles).insert(name, &location);

        let kind = task.kind();
        let path = match kind {
            UnitKind::Document => {
                let entry = if site.index_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
                    EntryKind::Index
                } else {
                    EntryKind::Page
                };
                lock(&self.navigation).insert(&task.breadcrumbs, &location, entry);
                self.layout.docs().join(&location)
            }
            UnitKind::Image => self.layout.images().join(name),
            UnitKind::Pdf => {
                lock(&self.articles).alias(&site.pdf_trigger, name);
                self.layout.docs().join(&location)
            }
            UnitKind::Unsupported => {
                return Err(ConvertError::UnsupportedStructure(format!(
                    "unsupported file type: {}",
                    name
                ))
                .into());
            }
        };

        if path.exists() && !self.config.output.force {
            tracing::debug!("Already converted: {}", path.display());
            return Ok(None);
        }

        let bytes = match kind {
            UnitKind::Document => {
                let html = String::from_utf8_lossy(&task.raw_content);
                let articles = lock(&self.articles);
                let navigation = lock(&self.navigation);
                render_document(
                    &html,
                    &task.breadcrumbs,
                    &location,
                    &articles,
                    &navigation,
                    &site.pdf_trigger,
                )?
                .into_bytes()
            }
            _ => task.raw_content.clone(),
        };

        Ok(Some((path, bytes)))
    }

    fn defer(&self, task: ConversionTask, link: &str) {
        let name = task.target_filename.clone();
        let location = article_location(&task.breadcrumbs, &name);

        match task.deferred() {
            Some(task) => {
                tracing::debug!(
                    "Deferring {} until {} is mapped ({} retries left)",
                    name,
                    link,
                    task.retries_remaining
                );
                lock(&self.ledger).record(&name, UnitState::Deferred(task.retries_remaining));
                self.queue.push(Job::Convert(task));
            }
            None => self.fail(&name, &location, format!("Unresolved link: {}", link)),
        }
    }

    /// Requeues `task` without spending a retry
    ///
    /// The target is filed and its own task is still queued or in flight, so
    /// it settles after a bounded number of rounds.
    async fn wait(&self, task: ConversionTask, link: &str) {
        tracing::debug!("Requeueing {} until {} is written", task.target_filename, link);
        lock(&self.ledger).record(
            &task.target_filename,
            UnitState::Deferred(task.retries_remaining),
        );
        self.queue.push(Job::Convert(task));
        tokio::task::yield_now().await;
    }

    fn give_up(&self, task: &ConversionTask, cause: String) {
        let location = article_location(&task.breadcrumbs, &task.target_filename);
        self.fail(&task.target_filename, &location, cause);
    }

    /// Records a permanent failure; the unit's map entry is withdrawn and
    /// its navigation location marked failed
    fn fail(&self, name: &str, location: &str, cause: String) {
        tracing::error!("Couldn't convert {}: {}", name, cause);
        lock(&self.articles).withdraw(name);
        lock(&self.navigation).mark_failed(location);
        lock(&self.ledger).fail(name, cause);
    }

    async fn write_manifest(&self, model: &str) -> Result<()> {
        let site = &self.config.site;
        let manifest = {
            let navigation = lock(&self.navigation);
            render_manifest(&site.site_name, model, &site.site_id, &navigation)?
        };

        tokio::fs::create_dir_all(self.layout.root()).await?;
        let path = self.layout.manifest();
        tracing::info!("Writing manifest: {}", path.display());
        tokio::fs::write(&path, manifest).await?;
        Ok(())
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tracing::info!("Writing docs: {}", path.display());
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Links that can name a page of the site
fn is_followable(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:"))
}
