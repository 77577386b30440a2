//! Blob storage for photo files
//!
//! Stores binary data under generated keys of the form
//! `stock-photos/<uuid-v7>.webp`, relative to the store root. UUID v7 keys
//! sort by creation time, so a directory listing reads in upload order.
//!
//! Every filesystem failure surfaces as `AppError::Storage`.

use crate::config::PHOTO_KEY_PREFIX;
use crate::error::{AppError, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Key-addressed blob store rooted at a directory
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a new blob store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the blob store (create directories if needed)
    pub async fn initialize(&self) -> Result<()> {
        let dir = self.root.join(PHOTO_KEY_PREFIX);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create", &dir, e))?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write data under a fresh key with the given extension, returns the key
    pub async fn put(&self, data: &[u8], extension: &str) -> Result<String> {
        let key = format!("{}/{}.{}", PHOTO_KEY_PREFIX, Uuid::now_v7(), extension);
        let path = self.path_for(&key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create", parent, e))?;
        }

        // Write to temp file first (atomic write)
        let temp_path = path.with_extension("tmp");
        if let Err(e) = write_atomic(&temp_path, &path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(storage_error("write", &path, e));
        }

        tracing::debug!("Wrote blob: {} ({} bytes)", key, data.len());

        Ok(key)
    }

    /// Read data from blob store
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;

        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::Storage(format!("Blob not found: {}", key))
            } else {
                storage_error("read", &path, e)
            }
        })?;

        tracing::debug!("Read blob: {} ({} bytes)", key, data.len());

        Ok(data)
    }

    /// Check if a blob exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| storage_error("stat", &path, e))
    }

    /// Delete a blob. A blob that is already gone counts as deleted.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(storage_error("delete", &path, e)),
        }

        tracing::debug!("Deleted blob: {}", key);

        Ok(())
    }

    /// Resolve a key to a path inside the root, rejecting anything that
    /// could escape it.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !safe {
            return Err(AppError::Storage(format!("Invalid blob key: {:?}", key)));
        }

        Ok(self.root.join(relative))
    }

    /// List all stored keys under the photo prefix
    pub async fn list_all(&self) -> Result<Vec<String>> {
        let dir = self.root.join(PHOTO_KEY_PREFIX);
        let mut keys = Vec::new();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(storage_error("list", &dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("list", &dir, e))?
        {
            let path = entry.path();
            let is_tmp = path.extension().is_some_and(|ext| ext == "tmp");
            if !path.is_file() || is_tmp {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                keys.push(format!("{}/{}", PHOTO_KEY_PREFIX, name));
            }
        }

        keys.sort();
        Ok(keys)
    }
}

async fn write_atomic(temp_path: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    fs::rename(temp_path, path).await
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::Storage(format!("Failed to {} {:?}: {}", action, path, err))
}
