//! Photo store
//!
//! Owns the ordered photos of each stock item and the files behind them.
//! Integrates Repository and BlobStore. A photo's file and its record change
//! together: files are written before records are inserted and deleted
//! before records are removed, so a failure leaves at worst a file with no
//! record, never a record with no file.

use crate::config::{MAX_PHOTOS_PER_ITEM, PHOTO_EXTENSION};
use crate::database::{Photo, Repository};
use crate::error::{AppError, Result};
use crate::imaging::{self, NormalizedImage, SourceFormat};
use crate::storage::BlobStore;
use std::collections::HashSet;

/// Service for managing stock item photos
#[derive(Clone)]
pub struct PhotoStore {
    repo: Repository,
    blob_store: BlobStore,
    public_url: String,
}

impl PhotoStore {
    pub fn new(repo: Repository, blob_store: BlobStore, public_url: impl Into<String>) -> Self {
        Self {
            repo,
            blob_store,
            public_url: public_url.into(),
        }
    }

    /// Normalize raw image bytes and append them to the item's photos
    pub async fn add_photo(&self, item_id: &str, data: &[u8], format: SourceFormat) -> Result<Photo> {
        let image = imaging::normalize_blocking(data.to_vec(), format).await?;
        self.append(item_id, &image).await
    }

    /// Append an already normalized image at the next sort position
    pub async fn append(&self, item_id: &str, image: &NormalizedImage) -> Result<Photo> {
        self.repo.get_item(item_id).await?;

        // Early out before touching the disk; the insert re-checks the cap
        let count = self.repo.count_photos(item_id).await?;
        if count as usize >= MAX_PHOTOS_PER_ITEM {
            return Err(AppError::TooManyPhotos {
                item_id: item_id.to_string(),
                limit: MAX_PHOTOS_PER_ITEM,
            });
        }

        // Write to blob store
        let key = self.blob_store.put(&image.bytes, PHOTO_EXTENSION).await?;

        // Create photo record
        match self.repo.create_photo(item_id, &key, MAX_PHOTOS_PER_ITEM).await {
            Ok(photo) => {
                tracing::info!(
                    "Photo {} added to item {} ({}x{}, {} bytes)",
                    photo.id,
                    item_id,
                    image.width,
                    image.height,
                    image.bytes.len()
                );
                Ok(photo)
            }
            Err(e) => {
                // No record points at the file, discard it
                if let Err(cleanup) = self.blob_store.delete(&key).await {
                    tracing::warn!("Failed to discard blob {} after insert error: {}", key, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete a photo's file, then its record
    pub async fn remove_photo(&self, photo_id: &str) -> Result<()> {
        let photo = self.repo.get_photo(photo_id).await?;
        self.remove(&photo).await
    }

    async fn remove(&self, photo: &Photo) -> Result<()> {
        tracing::info!("Removing photo {} of item {}", photo.id, photo.stock_item_id);

        // Delete from blob store; the record stays if this fails
        self.blob_store.delete(&photo.path).await?;

        // Delete photo record and close the gap in the sort order
        self.repo.delete_photo(&photo.id).await
    }

    /// List photos for an item ordered by sort position
    pub async fn list_photos(&self, item_id: &str) -> Result<Vec<Photo>> {
        self.repo.list_photos(item_id).await
    }

    /// Keep only `kept_ids` among the existing photos, then append
    /// `new_images` in order. Images that would exceed the per-item cap are
    /// dropped without error.
    pub async fn replace_photo_set(
        &self,
        item_id: &str,
        kept_ids: &[String],
        new_images: &[NormalizedImage],
    ) -> Result<Vec<Photo>> {
        let existing = self.repo.list_photos(item_id).await?;

        // Remove photos the caller did not keep
        for photo in existing.iter().filter(|p| !kept_ids.contains(&p.id)) {
            self.remove(photo).await?;
        }

        // Append new images until the cap is reached
        let mut count = self.repo.count_photos(item_id).await? as usize;
        for (index, image) in new_images.iter().enumerate() {
            if count >= MAX_PHOTOS_PER_ITEM {
                tracing::warn!(
                    "Item {} is at {} photos, dropping {} new image(s)",
                    item_id,
                    MAX_PHOTOS_PER_ITEM,
                    new_images.len() - index
                );
                break;
            }
            match self.append(item_id, image).await {
                Ok(_) => count += 1,
                // A concurrent upload took the last slot
                Err(AppError::TooManyPhotos { .. }) => {
                    tracing::warn!("Item {} filled up concurrently, dropping remaining images", item_id);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        self.repo.list_photos(item_id).await
    }

    /// Remove every photo of an item, stopping at the first failure
    pub async fn remove_all(&self, item_id: &str) -> Result<usize> {
        let photos = self.repo.list_photos(item_id).await?;

        for photo in &photos {
            self.remove(photo).await?;
        }

        Ok(photos.len())
    }

    /// Public URL for a photo's file
    pub fn public_url(&self, photo: &Photo) -> String {
        format!("{}/{}", self.public_url, photo.path)
    }

    /// Stored files that no photo record references
    pub async fn find_orphaned_blobs(&self) -> Result<Vec<String>> {
        // Keys still referenced by a record
        let referenced: HashSet<String> = self
            .repo
            .list_all_photos()
            .await?
            .into_iter()
            .map(|p| p.path)
            .collect();

        let orphans = self
            .blob_store
            .list_all()
            .await?
            .into_iter()
            .filter(|key| !referenced.contains(key))
            .collect();

        Ok(orphans)
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.blob_store
    }
}
