//! Artifact cache on disk.
//!
//! One file per artifact under the cache directory. A correctly named file is
//! a cache hit; writes go through a temporary file in the same directory that
//! is renamed into place, so a failed download never leaves a partial file.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of a cached artifact.
pub(crate) fn cache_path(cache_dir: &Path, file_name: &str) -> PathBuf {
    cache_dir.join(file_name)
}

/// Returns the cached bytes if the artifact is present.
pub(crate) async fn load_from_cache(path: &Path) -> Result<Option<Vec<u8>>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
    Ok(Some(bytes))
}

/// Atomically publishes `bytes` at `path`.
pub(crate) async fn save_to_cache(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || publish(&path, &bytes))
        .await
        .context("Cache writer task failed")?
}

fn publish(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Cache path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes).context("Failed to write temporary cache file")?;
    tmp.as_file().sync_all().context("Failed to sync temporary cache file")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to publish cache file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_from_cache_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = cache_path(temp_dir.path(), "dmoz_2016.csv.bz2");
        assert!(load_from_cache(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = cache_path(&temp_dir.path().join("nested"), "phish_2017.csv.bz2");

        save_to_cache(&path, b"domain,verified\n".to_vec()).await.unwrap();
        let bytes = load_from_cache(&path).await.unwrap().expect("cached");
        assert_eq!(bytes, b"domain,verified\n");
    }

    #[tokio::test]
    async fn test_save_overwrites_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = cache_path(temp_dir.path(), "vocab.csv");

        save_to_cache(&path, b"old".to_vec()).await.unwrap();
        save_to_cache(&path, b"new".to_vec()).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("vocab.csv")]);
    }
}
