use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tracing::{error, info, warn};

use crate::counter::DownloadCounter;
use crate::models::{Artifact, StorageConfig};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Could not read storage directory {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Create the storage directory if it does not exist yet
pub async fn ensure_storage_dir(path: &Path) -> std::io::Result<()> {
    if tokio::fs::metadata(path).await.is_ok() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    info!("Created directory: {}", path.display());
    Ok(())
}

/// Strip the final extension segment. Names without one are their own base
/// name, as are dot-files such as `.env`.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// List every artifact in the storage directory, in enumeration order.
///
/// Sidecar description files are folded into their artifact rather than
/// listed. A missing or unreadable sidecar falls back to the configured
/// placeholder; only a failure to enumerate the directory itself is an error.
pub async fn list_artifacts(
    config: &StorageConfig,
    counter: &DownloadCounter,
) -> Result<Vec<Artifact>, StorageError> {
    let names = artifact_names(config).await.map_err(|source| {
        error!(
            "Error reading files directory {}: {}",
            config.files_dir.display(),
            source
        );
        StorageError::DirectoryUnavailable {
            path: config.files_dir.clone(),
            source,
        }
    })?;

    let descriptions = join_all(names.iter().map(|name| read_description(config, name))).await;

    Ok(names
        .into_iter()
        .zip(descriptions)
        .map(|(name, description)| {
            let downloads = counter.get(&name);
            Artifact::new(name, description, downloads)
        })
        .collect())
}

async fn artifact_names(config: &StorageConfig) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(&config.files_dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Skipping non UTF-8 file name {:?}", raw);
                continue;
            }
        };

        if config.is_sidecar(&name) {
            continue;
        }

        // Follows symlinks, so a link to a regular file is listed
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => names.push(name),
            Ok(_) => {}
            Err(e) => warn!("Skipping {}: {}", name, e),
        }
    }

    Ok(names)
}

async fn read_description(config: &StorageConfig, file_name: &str) -> String {
    let sidecar = config
        .files_dir
        .join(config.sidecar_name(base_name(file_name)));

    match tokio::fs::read_to_string(&sidecar).await {
        Ok(description) => description,
        Err(_) => {
            warn!(
                "No description file for {}: {}",
                file_name,
                sidecar.display()
            );
            config.placeholder.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> StorageConfig {
        StorageConfig {
            files_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        }
    }

    fn sorted(mut artifacts: Vec<Artifact>) -> Vec<Artifact> {
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        artifacts
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("tool.zip"), "tool");
        assert_eq!(base_name("lib.tar.gz"), "lib.tar");
        assert_eq!(base_name("README"), "README");
        assert_eq!(base_name(".env"), ".env");
    }

    #[tokio::test]
    async fn test_listing_pairs_sidecar_description() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tool.zip"), b"PK").unwrap();
        std::fs::write(dir.path().join("tool.md"), "A sample tool").unwrap();

        let counter = DownloadCounter::new();
        let artifacts = list_artifacts(&config_for(&dir), &counter).await.unwrap();

        assert_eq!(artifacts, vec![Artifact::new("tool.zip", "A sample tool", 0)]);
    }

    #[tokio::test]
    async fn test_missing_sidecar_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lib.zip"), b"PK").unwrap();

        let counter = DownloadCounter::new();
        let artifacts = list_artifacts(&config_for(&dir), &counter).await.unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].description, "No description available.");
    }

    #[tokio::test]
    async fn test_one_entry_per_artifact_and_no_sidecars() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"a").unwrap();
        std::fs::write(dir.path().join("a.md"), "first\nsecond line").unwrap();
        std::fs::write(dir.path().join("b.tar.gz"), b"b").unwrap();
        std::fs::write(dir.path().join("orphan.md"), "no artifact").unwrap();
        std::fs::write(dir.path().join("NOTES"), b"n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let counter = DownloadCounter::new();
        let artifacts = sorted(list_artifacts(&config_for(&dir), &counter).await.unwrap());

        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["NOTES", "a.zip", "b.tar.gz"]);
        assert_eq!(artifacts[1].description, "first\nsecond line");
        assert_eq!(artifacts[2].description, "No description available.");
    }

    #[tokio::test]
    async fn test_listing_reports_counter_values() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tool.zip"), b"PK").unwrap();

        let counter = DownloadCounter::new();
        for _ in 0..3 {
            counter.increment("tool.zip");
        }

        let artifacts = list_artifacts(&config_for(&dir), &counter).await.unwrap();
        assert_eq!(artifacts[0].downloads, 3);
    }

    #[tokio::test]
    async fn test_unreadable_sidecar_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bin.zip"), b"PK").unwrap();
        std::fs::write(dir.path().join("bin.md"), [0xff, 0xfe, 0xfd]).unwrap();

        let counter = DownloadCounter::new();
        let artifacts = list_artifacts(&config_for(&dir), &counter).await.unwrap();
        assert_eq!(artifacts[0].description, "No description available.");
    }

    #[tokio::test]
    async fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            files_dir: dir.path().join("does-not-exist"),
            ..StorageConfig::default()
        };

        let result = list_artifacts(&config, &DownloadCounter::new()).await;
        assert!(matches!(
            result,
            Err(StorageError::DirectoryUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_ensure_storage_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("files");

        ensure_storage_dir(&target).await.unwrap();
        assert!(target.is_dir());

        // Idempotent
        ensure_storage_dir(&target).await.unwrap();
    }
}
