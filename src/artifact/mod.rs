//! Reference table and model artifact store.
//!
//! This module handles:
//! - Resolving the cache path of an artifact from its deterministic file name
//! - Serving cache hits without touching the network
//! - Downloading misses (or forced refreshes) from the configured base URL
//! - Publishing downloads atomically into the cache

mod cache;
mod download;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

use cache::{cache_path, load_from_cache, save_to_cache};
use download::{download_with_retries, request_timeout};

/// Where an artifact is downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Reference tables (`Config::data_base_url`)
    Data,
    /// Models, vocabularies and category names (`Config::models_base_url`)
    Model,
}

/// Fetch-and-cache access to named artifacts.
pub struct ArtifactStore {
    client: reqwest::Client,
    data_base_url: String,
    models_base_url: String,
    auth_token: Option<String>,
    cache_dir: PathBuf,
    max_download_size: usize,
    download_retries: u32,
}

impl ArtifactStore {
    /// Creates a store with its own HTTP client.
    pub fn new(config: &Config) -> Result<Self, InitializationError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            data_base_url: config.data_base_url.clone(),
            models_base_url: config.models_base_url.clone(),
            auth_token: config.auth_token.clone(),
            cache_dir: config.cache_dir.clone(),
            max_download_size: config.max_download_size,
            download_retries: config.download_retries,
        })
    }

    /// Directory holding cached artifacts.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Remote URL of an artifact.
    pub fn url_for(&self, kind: ArtifactKind, file_name: &str) -> String {
        let base = match kind {
            ArtifactKind::Data => &self.data_base_url,
            ArtifactKind::Model => &self.models_base_url,
        };
        format!("{}/{}", base.trim_end_matches('/'), file_name)
    }

    /// Returns the local path of an artifact, downloading it on a cache miss.
    ///
    /// With `refresh` set the cached copy is ignored and replaced.
    pub async fn fetch_path(
        &self,
        kind: ArtifactKind,
        file_name: &str,
        refresh: bool,
    ) -> Result<PathBuf> {
        let path = cache_path(&self.cache_dir, file_name);
        if !refresh && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            log::info!("Using cached {} from {}", file_name, path.display());
            return Ok(path);
        }
        self.download(kind, file_name, &path).await?;
        Ok(path)
    }

    /// Returns the bytes of an artifact, downloading it on a cache miss.
    pub async fn fetch(&self, kind: ArtifactKind, file_name: &str, refresh: bool) -> Result<Vec<u8>> {
        let path = cache_path(&self.cache_dir, file_name);
        if !refresh {
            if let Some(bytes) = load_from_cache(&path).await? {
                log::info!("Using cached {} from {}", file_name, path.display());
                return Ok(bytes);
            }
        }
        self.download(kind, file_name, &path).await
    }

    async fn download(&self, kind: ArtifactKind, file_name: &str, path: &Path) -> Result<Vec<u8>> {
        let url = self.url_for(kind, file_name);
        log::info!("Downloading {} from {}", file_name, url);

        let bytes = download_with_retries(
            &self.client,
            &url,
            self.auth_token.as_deref(),
            self.max_download_size,
            self.download_retries,
        )
        .await
        .with_context(|| format!("Cannot download {}", file_name))?;

        save_to_cache(path, bytes.clone()).await?;
        log::debug!("Cached {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer, cache_dir: &Path) -> Config {
        Config {
            data_base_url: format!("{}/data/", server.uri()),
            models_base_url: format!("{}/models", server.uri()),
            auth_token: None,
            cache_dir: cache_dir.to_path_buf(),
            timeout_seconds: 5,
            download_retries: 1,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_url_for_joins_base_and_name() {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(&test_config(&server, temp_dir.path())).unwrap();
        assert_eq!(
            store.url_for(ArtifactKind::Data, "dmoz_2016.csv.bz2"),
            format!("{}/data/dmoz_2016.csv.bz2", server.uri())
        );
        assert_eq!(
            store.url_for(ArtifactKind::Model, "phish_cat_vocab_2016.csv"),
            format!("{}/models/phish_cat_vocab_2016.csv", server.uri())
        );
    }

    #[tokio::test]
    async fn test_fetch_downloads_once_then_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/shalla_2017.csv.bz2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"domain,shalla_cat\n".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(&test_config(&server, temp_dir.path())).unwrap();

        let first = store.fetch(ArtifactKind::Data, "shalla_2017.csv.bz2", false).await.unwrap();
        let second = store.fetch(ArtifactKind::Data, "shalla_2017.csv.bz2", false).await.unwrap();
        assert_eq!(first, second);
        assert!(temp_dir.path().join("shalla_2017.csv.bz2").exists());
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/phish_2017.csv.bz2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("phish_2017.csv.bz2"), b"stale").unwrap();
        let store = ArtifactStore::new(&test_config(&server, temp_dir.path())).unwrap();

        let bytes = store.fetch(ArtifactKind::Data, "phish_2017.csv.bz2", true).await.unwrap();
        assert_eq!(bytes, b"fresh");
        assert_eq!(std::fs::read(temp_dir.path().join("phish_2017.csv.bz2")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_cache_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(&test_config(&server, temp_dir.path())).unwrap();

        let result = store.fetch(ArtifactKind::Data, "dmoz_2016.csv.bz2", false).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("dmoz_2016.csv.bz2"));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/phish_cat_vocab_2016.csv"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("vocab\nab\n"))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            auth_token: Some("s3cret".to_string()),
            ..test_config(&server, temp_dir.path())
        };
        let store = ArtifactStore::new(&config).unwrap();

        let path = store
            .fetch_path(ArtifactKind::Model, "phish_cat_vocab_2016.csv", false)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "vocab\nab\n");
    }

    #[tokio::test]
    async fn test_oversized_download_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 64]))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            max_download_size: 16,
            ..test_config(&server, temp_dir.path())
        };
        let store = ArtifactStore::new(&config).unwrap();

        let result = store.fetch(ArtifactKind::Data, "big.csv.bz2", false).await;
        assert!(result.is_err());
        assert!(!temp_dir.path().join("big.csv.bz2").exists());
    }
}
