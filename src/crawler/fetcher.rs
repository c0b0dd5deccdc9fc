//! HTTP fetcher implementation
//!
//! This module handles all source downloads for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Serving repeat fetches from the on-disk cache
//! - Retry logic for transient failures

use crate::config::{Config, UserAgentConfig};
use crate::url::ensure_relative;
use crate::{MirrorError, Result};
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Source of raw page, image and PDF bytes
///
/// `local` is the site-relative path of `url`, usable as a cache key.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &Url, local: &str) -> Result<Vec<u8>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use wsm_mirror::config::UserAgentConfig;
/// use wsm_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches over HTTP, mirroring every response into a cache directory
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Cached copy exists | Served from disk, no request |
/// | HTTP 5xx | Retry up to `fetch-attempts` times |
/// | Timeout | Retry up to `fetch-attempts` times |
/// | Other HTTP error | Immediate failure |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    cache_dir: PathBuf,
    attempts: u32,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &Config, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            client: build_http_client(&config.user_agent)?,
            cache_dir: cache_dir.into(),
            attempts: config.crawler.fetch_attempts.max(1),
            delay: Duration::from_millis(config.crawler.retry_delay),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let mut attempt = 1;

        loop {
            tracing::info!("Downloading: {}", url);

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .and_then(|r| r.error_for_status());

            let error = match response {
                Ok(response) => match response.bytes().await {
                    Ok(body) => return Ok(body.to_vec()),
                    Err(e) => e,
                },
                Err(e) => e,
            };

            if attempt >= self.attempts || !is_transient(&error) {
                return Err(MirrorError::Http {
                    url: url.to_string(),
                    source: error,
                });
            }

            tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                self.attempts,
                url,
                error
            );
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url, local: &str) -> Result<Vec<u8>> {
        ensure_relative(Path::new(local))?;
        let path = self.cache_dir.join(local);

        match tokio::fs::read(&path).await {
            Ok(content) => {
                tracing::debug!("Reading cached: {}", path.display());
                return Ok(content);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let content = self.download(url).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::debug!("Caching: {}", url);
        tokio::fs::write(&path, &content).await?;

        Ok(content)
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.status().is_some_and(|s| s.is_server_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> Config {
        let mut config: Config = toml::from_str(
            "[site]\nstart-url = \"https://example.com/wsm/\"\nsite-id = \"v1\"\n",
        )
        .unwrap();
        config.crawler.retry_delay = 0;
        config
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_caches_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wsm/doc.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(&create_test_config(), cache.path()).unwrap();
        let url = Url::parse(&format!("{}/wsm/doc.html", server.uri())).unwrap();

        let first = fetcher.fetch(&url, "doc.html").await.unwrap();
        let second = fetcher.fetch(&url, "doc.html").await.unwrap();

        assert_eq!(first, b"<p>hello</p>");
        assert_eq!(first, second);
        assert!(cache.path().join("doc.html").exists());
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wsm/flaky.html"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wsm/flaky.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(&create_test_config(), cache.path()).unwrap();
        let url = Url::parse(&format!("{}/wsm/flaky.html", server.uri())).unwrap();

        assert_eq!(fetcher.fetch(&url, "flaky.html").await.unwrap(), b"ok");
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wsm/missing.html"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(&create_test_config(), cache.path()).unwrap();
        let url = Url::parse(&format!("{}/wsm/missing.html", server.uri())).unwrap();

        let result = fetcher.fetch(&url, "missing.html").await;
        assert!(matches!(result, Err(MirrorError::Http { .. })));
        assert!(!cache.path().join("missing.html").exists());
    }

    #[tokio::test]
    async fn test_fetch_rejects_escaping_cache_path() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(&create_test_config(), cache.path()).unwrap();
        let url = Url::parse("https://example.com/wsm/x.html").unwrap();

        let result = fetcher.fetch(&url, "../x.html").await;
        assert!(matches!(result, Err(MirrorError::PermissionViolation { .. })));
    }
}
