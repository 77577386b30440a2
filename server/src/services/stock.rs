//! Stock service
//!
//! Item lifecycle on top of the repository and the photo store. Deleting an
//! item is an explicit cascade: every photo is removed through the photo
//! store (file first, then record) before the item row itself goes.

use crate::database::{ItemFields, Photo, Repository, StockItem, StockItemWithPhotos};
use crate::error::{AppError, FieldErrors, Result};
use crate::imaging::NormalizedImage;
use crate::services::photos::PhotoStore;
use std::collections::HashMap;

/// Service for managing stock items
#[derive(Clone)]
pub struct StockService {
    repo: Repository,
    photos: PhotoStore,
}

impl StockService {
    pub fn new(repo: Repository, photos: PhotoStore) -> Self {
        Self { repo, photos }
    }

    /// Create an item without photos
    pub async fn create_item(&self, fields: &ItemFields) -> Result<StockItem> {
        tracing::info!("Creating stock item: {}", fields.name);

        let item = self.repo.create_item(fields).await?;

        tracing::info!("Stock item created successfully: {}", item.id);

        Ok(item)
    }

    /// Create an item and attach photos in submission order.
    ///
    /// All or nothing: if any photo cannot be attached, the new item is
    /// cascaded away before the error is returned.
    pub async fn create_item_with_photos(
        &self,
        fields: &ItemFields,
        images: &[NormalizedImage],
    ) -> Result<StockItemWithPhotos> {
        let item = self.create_item(fields).await?;

        // Attach photos in submission order
        let mut photos = Vec::with_capacity(images.len());
        for image in images {
            match self.photos.append(&item.id, image).await {
                Ok(photo) => photos.push(photo),
                Err(e) => {
                    // Undo the partial create
                    tracing::warn!("Rolling back stock item {}: {}", item.id, e);
                    if let Err(cleanup) = self.delete_item(&item.id).await {
                        tracing::error!("Rollback of stock item {} failed: {}", item.id, cleanup);
                    }
                    return Err(e);
                }
            }
        }

        Ok(StockItemWithPhotos { item, photos })
    }

    /// Replace the scalar fields of an item; photos are untouched
    pub async fn update_item(&self, id: &str, fields: &ItemFields) -> Result<StockItem> {
        tracing::debug!("Updating stock item: {}", id);

        let item = self.repo.update_item(id, fields).await?;

        tracing::debug!("Stock item updated successfully: {}", item.id);

        Ok(item)
    }

    /// Reconcile the photo set, then replace the scalar fields.
    ///
    /// Fields are only written once every photo change has succeeded, so a
    /// failed edit leaves the item's values as they were.
    pub async fn update_item_with_photos(
        &self,
        id: &str,
        fields: &ItemFields,
        kept_ids: &[String],
        images: &[NormalizedImage],
    ) -> Result<StockItemWithPhotos> {
        // Make sure the item exists before touching its photos
        self.repo.get_item(id).await?;

        // Photos first: storage failures abort before any field changes
        let photos = self.photos.replace_photo_set(id, kept_ids, images).await?;

        // Then the scalar fields
        let item = self.update_item(id, fields).await?;

        Ok(StockItemWithPhotos { item, photos })
    }

    /// Set the quantity alone
    pub async fn update_quantity(&self, id: &str, qty: i64) -> Result<StockItem> {
        if qty < 0 {
            let mut errors = FieldErrors::new();
            errors.add("qty", "The qty field must be at least 0.");
            return Err(AppError::Validation(errors));
        }

        tracing::debug!("Setting quantity of stock item {} to {}", id, qty);

        self.repo.update_quantity(id, qty).await
    }

    /// Delete an item and all of its photos.
    ///
    /// Stops at the first photo that cannot be removed; the item row then
    /// stays, holding whatever photos remain.
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting stock item: {}", id);

        self.repo.get_item(id).await?;

        // Remove photos (files, then records)
        let removed = self.photos.remove_all(id).await?;

        // Delete the item row last
        self.repo.delete_item(id).await?;

        tracing::info!("Stock item deleted successfully: {} ({} photos)", id, removed);

        Ok(())
    }

    /// Get one item with its ordered photos
    pub async fn get_item(&self, id: &str) -> Result<StockItemWithPhotos> {
        let item = self.repo.get_item(id).await?;
        let photos = self.photos.list_photos(id).await?;

        Ok(StockItemWithPhotos { item, photos })
    }

    /// List all items sorted by name, each with its ordered photos
    pub async fn list_items(&self) -> Result<Vec<StockItemWithPhotos>> {
        let items = self.repo.list_items().await?;

        // Group every photo by item in one pass
        let mut grouped: HashMap<String, Vec<Photo>> = HashMap::new();
        for photo in self.repo.list_all_photos().await? {
            grouped
                .entry(photo.stock_item_id.clone())
                .or_default()
                .push(photo);
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let photos = grouped.remove(&item.id).unwrap_or_default();
                StockItemWithPhotos { item, photos }
            })
            .collect())
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }
}
