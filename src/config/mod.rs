//! Configuration module for wsm-mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wsm_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wsm.toml")).unwrap();
//! println!("Mirroring {}", config.site.site_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_force_override, compute_config_hash, load_config, load_config_with_hash, FORCE_ENV,
};

// Re-export validation for overrides applied after loading
pub use validation::validate;
