use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::path::Path;

/// Environment variable that forces every document to be re-rendered
pub const FORCE_ENV: &str = "FORCE_MARKDOWN";

/// Loads and parses a configuration file from the given path
///
/// The `FORCE_MARKDOWN` environment variable is applied on top of the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use wsm_mirror::config::load_config;
///
/// let config = load_config(Path::new("wsm.toml")).unwrap();
/// println!("Workers: {}", config.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_force_override(&mut config, std::env::var_os(FORCE_ENV));

    validate(&config)?;

    Ok(config)
}

/// Turns on `output.force` when the override value is set and non-empty
pub fn apply_force_override(config: &mut Config, value: Option<OsString>) {
    if value.is_some_and(|v| !v.is_empty()) {
        config.output.force = true;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
