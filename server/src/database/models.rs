//! Database models
//!
//! Rust structs representing database entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked stock item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    /// Empty means uncategorized
    pub category: String,
    pub qty: i64,
    pub min_qty: i64,
    pub location: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Minimum quantity is set and the current quantity has fallen to or below it.
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.qty, self.min_qty)
    }
}

pub fn is_low_stock(qty: i64, min_qty: i64) -> bool {
    min_qty > 0 && qty <= min_qty
}

/// Mutable scalar fields of a stock item, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub category: String,
    pub qty: i64,
    pub min_qty: i64,
    pub location: String,
    pub notes: String,
}

/// Photo of a stock item; `path` is the blob store key of the encoded file
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: String,
    pub stock_item_id: String,
    pub path: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// A stock item together with its photos ordered by sort position
#[derive(Debug, Clone, Serialize)]
pub struct StockItemWithPhotos {
    #[serde(flatten)]
    pub item: StockItem,
    pub photos: Vec<Photo>,
}
