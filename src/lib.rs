//! wsm-mirror: an offline mirror for frame-based workshop manuals
//!
//! This crate crawls a frameset documentation site, converts every page it
//! reaches into Markdown (tables become bordered grid tables, cross-document
//! links are rewritten to relative paths), and lays the result out as a
//! statically renderable MkDocs tree.

pub mod config;
pub mod convert;
pub mod crawler;
pub mod site;
pub mod state;
pub mod table;
pub mod url;

use thiserror::Error;

/// Main error type for wsm-mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Path escapes the output root: {path}")]
    PermissionViolation { path: String },

    #[error("Site topology not recognised: {0}")]
    Topology(String),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Returns true if the error must stop the whole run
    ///
    /// Everything else is recorded against the job that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PermissionViolation { .. } | Self::Topology(_))
    }
}

/// Errors raised while converting a single document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A link points at a document that is not in the article map yet
    #[error("Unresolved link: {0}")]
    UnresolvedLink(String),

    /// A link target is filed but its output is not written yet
    #[error("Waiting for {0}")]
    PendingLink(String),

    #[error("Unsupported structure: {0}")]
    UnsupportedStructure(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for wsm-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for document conversion
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler};
pub use state::UnitState;
