//! Repository layer for database operations
//!
//! Row-level CRUD for stock items and their photos. Every scalar write is a
//! single statement; multi-row changes run inside a transaction. The
//! repository never touches photo files, so deleting an item row is refused
//! while photo rows remain.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Round-trip a trivial query to check the database is reachable
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ===== Stock items =====

    /// Create a new stock item
    pub async fn create_item(&self, fields: &ItemFields) -> Result<StockItem> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let item = sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items (id, name, category, qty, min_qty, location, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.qty)
        .bind(fields.min_qty)
        .bind(&fields.location)
        .bind(&fields.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created stock item: {}", id);
        Ok(item)
    }

    /// Get a stock item by ID
    pub async fn get_item(&self, id: &str) -> Result<StockItem> {
        sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))
    }

    /// List all stock items sorted by name
    pub async fn list_items(&self) -> Result<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT * FROM stock_items
            ORDER BY name COLLATE NOCASE, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count_items(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Replace every mutable scalar field of an item
    pub async fn update_item(&self, id: &str, fields: &ItemFields) -> Result<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET name = ?, category = ?, qty = ?, min_qty = ?, location = ?, notes = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(fields.qty)
        .bind(fields.min_qty)
        .bind(&fields.location)
        .bind(&fields.notes)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;

        tracing::debug!("Updated stock item: {}", id);
        Ok(item)
    }

    /// Set only the quantity (and the update timestamp)
    pub async fn update_quantity(&self, id: &str, qty: i64) -> Result<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(
            "UPDATE stock_items SET qty = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(qty)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;

        tracing::debug!("Set quantity of {} to {}", id, qty);
        Ok(item)
    }

    /// Delete an item row. Fails with `ItemHasPhotos` if photo rows remain.
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_item_photos WHERE stock_item_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if remaining > 0 {
            return Err(AppError::ItemHasPhotos(id.to_string()));
        }

        let rows = sqlx::query("DELETE FROM stock_items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::ItemNotFound(id.to_string()));
        }

        tx.commit().await?;

        tracing::debug!("Deleted stock item: {}", id);
        Ok(())
    }

    // ===== Photos =====

    /// Insert a photo record at the next sort position, unless the item
    /// already holds `limit` photos.
    ///
    /// The cap check and the position choice happen in the same statement,
    /// so concurrent appends to one item cannot overshoot the cap or share
    /// a position.
    pub async fn create_photo(&self, item_id: &str, path: &str, limit: usize) -> Result<Photo> {
        let id = Uuid::new_v4().to_string();

        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO stock_item_photos (id, stock_item_id, path, sort_order, created_at)
            SELECT ?, ?, ?, (SELECT COUNT(*) FROM stock_item_photos WHERE stock_item_id = ?), ?
            WHERE (SELECT COUNT(*) FROM stock_item_photos WHERE stock_item_id = ?) < ?
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(item_id)
        .bind(path)
        .bind(item_id)
        .bind(Utc::now())
        .bind(item_id)
        .bind(limit as i64)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::TooManyPhotos {
            item_id: item_id.to_string(),
            limit,
        })?;

        tracing::debug!(
            "Created photo: {} for item: {} at {}",
            id,
            item_id,
            photo.sort_order
        );
        Ok(photo)
    }

    pub async fn get_photo(&self, id: &str) -> Result<Photo> {
        sqlx::query_as::<_, Photo>("SELECT * FROM stock_item_photos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))
    }

    /// List photos for an item ordered by sort position
    pub async fn list_photos(&self, item_id: &str) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM stock_item_photos
            WHERE stock_item_id = ?
            ORDER BY sort_order, created_at
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    /// Every photo, grouped by item and ordered by sort position
    pub async fn list_all_photos(&self) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT * FROM stock_item_photos ORDER BY stock_item_id, sort_order, created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    pub async fn count_photos(&self, item_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_item_photos WHERE stock_item_id = ?")
                .bind(item_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Delete a photo record and close the gap it leaves in the sort order
    pub async fn delete_photo(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let (item_id, sort_order): (String, i64) = sqlx::query_as(
            "DELETE FROM stock_item_photos WHERE id = ? RETURNING stock_item_id, sort_order",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))?;

        sqlx::query(
            r#"
            UPDATE stock_item_photos
            SET sort_order = sort_order - 1
            WHERE stock_item_id = ? AND sort_order > ?
            "#,
        )
        .bind(&item_id)
        .bind(sort_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Deleted photo: {} of item: {}", id, item_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PHOTOS_PER_ITEM;
    use crate::database::create_memory_pool;

    async fn create_test_repo() -> Repository {
        Repository::new(create_memory_pool().await.unwrap())
    }

    fn fields(name: &str, qty: i64, min_qty: i64) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            category: "Correias".to_string(),
            qty,
            min_qty,
            location: "Gaveta B3".to_string(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Correia A-42", 12, 5)).await.unwrap();
        assert_eq!(item.name, "Correia A-42");

        let fetched = repo.get_item(&item.id).await.unwrap();
        assert_eq!(fetched.id, item.id);
        assert_eq!(fetched.qty, 12);
        assert_eq!(fetched.min_qty, 5);
        assert_eq!(fetched.location, "Gaveta B3");
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let repo = create_test_repo().await;

        let result = repo.get_item("missing").await;
        assert!(matches!(result, Err(AppError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_items_sorted_by_name() {
        let repo = create_test_repo().await;

        for name in ["motor", "Correia", "capacitor"] {
            repo.create_item(&fields(name, 1, 0)).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["capacitor", "Correia", "motor"]);
        assert_eq!(repo.count_items().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_item_replaces_fields() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Old", 1, 1)).await.unwrap();
        let mut new_fields = fields("New", 9, 3);
        new_fields.category = String::new();
        new_fields.notes = "moved".to_string();

        let updated = repo.update_item(&item.id, &new_fields).await.unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.category, "");
        assert_eq!(updated.qty, 9);
        assert_eq!(updated.notes, "moved");
        assert_eq!(updated.created_at, item.created_at);
        assert!(updated.updated_at >= item.updated_at);
    }

    #[tokio::test]
    async fn test_update_quantity_only_touches_qty() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        let updated = repo.update_quantity(&item.id, 1).await.unwrap();

        assert_eq!(updated.qty, 1);
        assert_eq!(updated.min_qty, 2);
        assert_eq!(updated.name, "Belt");
        assert!(updated.is_low_stock());
    }

    #[tokio::test]
    async fn test_quantity_last_writer_wins() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        repo.update_quantity(&item.id, 5).await.unwrap();
        repo.update_quantity(&item.id, 7).await.unwrap();

        assert_eq!(repo.get_item(&item.id).await.unwrap().qty, 7);
    }

    #[tokio::test]
    async fn test_delete_item_refused_while_photos_remain() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        let photo = repo.create_photo(&item.id, "stock-photos/a.webp", MAX_PHOTOS_PER_ITEM).await.unwrap();

        let result = repo.delete_item(&item.id).await;
        assert!(matches!(result, Err(AppError::ItemHasPhotos(_))));
        assert!(repo.get_item(&item.id).await.is_ok());

        repo.delete_photo(&photo.id).await.unwrap();
        repo.delete_item(&item.id).await.unwrap();
        assert!(repo.get_item(&item.id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let repo = create_test_repo().await;

        let result = repo.delete_item("missing").await;
        assert!(matches!(result, Err(AppError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_photos_ordered_and_compacted() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        let first = repo.create_photo(&item.id, "stock-photos/0.webp", MAX_PHOTOS_PER_ITEM).await.unwrap();
        let second = repo.create_photo(&item.id, "stock-photos/1.webp", MAX_PHOTOS_PER_ITEM).await.unwrap();
        let third = repo.create_photo(&item.id, "stock-photos/2.webp", MAX_PHOTOS_PER_ITEM).await.unwrap();

        repo.delete_photo(&second.id).await.unwrap();

        let photos = repo.list_photos(&item.id).await.unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        let positions: Vec<i64> = photos.iter().map(|p| p.sort_order).collect();
        assert_eq!(ids, vec![first.id.as_str(), third.id.as_str()]);
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(repo.count_photos(&item.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_photo() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        let photo = repo.create_photo(&item.id, "stock-photos/a.webp", MAX_PHOTOS_PER_ITEM).await.unwrap();
        repo.delete_photo(&photo.id).await.unwrap();

        let result = repo.delete_photo(&photo.id).await;
        assert!(matches!(result, Err(AppError::PhotoNotFound(_))));
        assert!(matches!(
            repo.get_photo(&photo.id).await,
            Err(AppError::PhotoNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_photo_stops_at_limit() {
        let repo = create_test_repo().await;

        let item = repo.create_item(&fields("Belt", 4, 2)).await.unwrap();
        for i in 0..MAX_PHOTOS_PER_ITEM {
            let photo = repo
                .create_photo(&item.id, &format!("stock-photos/{}.webp", i), MAX_PHOTOS_PER_ITEM)
                .await
                .unwrap();
            assert_eq!(photo.sort_order, i as i64);
        }

        let result = repo
            .create_photo(&item.id, "stock-photos/extra.webp", MAX_PHOTOS_PER_ITEM)
            .await;
        assert!(matches!(result, Err(AppError::TooManyPhotos { limit: 5, .. })));
        assert_eq!(repo.count_photos(&item.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_photo_requires_existing_item() {
        let repo = create_test_repo().await;

        let result = repo.create_photo("missing", "stock-photos/a.webp", MAX_PHOTOS_PER_ITEM).await;
        assert!(result.is_err());
    }
}
