use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for wsm-mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The manual being mirrored and the shape of its frameset
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// URL of the frameset start page; every fetched URL must live below it
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Identifier of the manual version, used as the output directory name
    #[serde(rename = "site-id")]
    pub site_id: String,

    /// Prefix for the generated site name
    #[serde(rename = "site-name", default = "default_site_name")]
    pub site_name: String,

    #[serde(rename = "main-menu-frame", default = "default_main_menu_frame")]
    pub main_menu_frame: String,

    #[serde(rename = "service-menu-frame", default = "default_service_menu_frame")]
    pub service_menu_frame: String,

    /// Link `target` values that denote in-frame navigation
    #[serde(rename = "navigation-targets", default = "default_navigation_targets")]
    pub navigation_targets: Vec<String>,

    /// Filename prefixes of group landing pages (table-of-contents frames)
    #[serde(rename = "index-prefixes", default = "default_index_prefixes")]
    pub index_prefixes: Vec<String>,

    /// The `href` of the script-driven PDF link
    #[serde(rename = "pdf-trigger", default = "default_pdf_trigger")]
    pub pdf_trigger: String,

    /// Breadcrumb bucket for documents reached through the PDF trigger
    #[serde(rename = "pdf-breadcrumb", default = "default_pdf_breadcrumb")]
    pub pdf_breadcrumb: String,

    /// Only the first N anchors of a page are considered
    #[serde(rename = "max-links-per-page", default = "default_max_links")]
    pub max_links_per_page: usize,
}

/// Worker pool and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent queue workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Initial number of deferrals allowed per conversion task
    ///
    /// Defaults to `workers + 1` when absent.
    #[serde(rename = "retry-budget", default)]
    pub retry_budget: Option<u32>,

    /// Attempts per fetch before giving up on transient errors
    #[serde(rename = "fetch-attempts", default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// Delay between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,
}

impl CrawlerConfig {
    /// The effective per-task retry budget
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
            .unwrap_or_else(|| u32::try_from(self.workers + 1).unwrap_or(u32::MAX))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            retry_budget: None,
            fetch_attempts: default_fetch_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Full User-Agent header value sent with every request
    #[serde(default = "default_user_agent")]
    pub value: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one subdirectory per site id
    #[serde(default = "default_output_root")]
    pub root: PathBuf,

    /// Re-render documents even when their output already exists
    #[serde(default)]
    pub force: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            force: false,
        }
    }
}

fn default_site_name() -> String {
    "Mazda WSM".to_string()
}

fn default_main_menu_frame() -> String {
    "main_menu".to_string()
}

fn default_service_menu_frame() -> String {
    "srvc_menu".to_string()
}

fn default_navigation_targets() -> Vec<String> {
    vec!["main".to_string(), "fraToc".to_string()]
}

fn default_index_prefixes() -> Vec<String> {
    vec!["left_menu".to_string(), "node".to_string()]
}

fn default_pdf_trigger() -> String {
    "javascript:Open()".to_string()
}

fn default_pdf_breadcrumb() -> String {
    "pdf".to_string()
}

fn default_max_links() -> usize {
    200
}

fn default_workers() -> usize {
    4
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:140.0) Gecko/20100101 Firefox/140.0"
        .to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}
