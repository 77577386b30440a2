//! JSON shapes returned to clients

use crate::database::StockItemWithPhotos;
use crate::services::listing::Summary;
use crate::services::PhotoStore;
use serde::Serialize;

/// Client-facing view of a stock item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub qty: i64,
    pub min_qty: i64,
    pub location: String,
    pub notes: String,
    /// Public URLs in display order
    pub photos: Vec<String>,
    pub photo_ids: Vec<String>,
    /// Epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
    pub low_stock: bool,
}

impl StockItemView {
    pub fn new(entry: &StockItemWithPhotos, photos: &PhotoStore) -> Self {
        let item = &entry.item;
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            qty: item.qty,
            min_qty: item.min_qty,
            location: item.location.clone(),
            notes: item.notes.clone(),
            photos: entry.photos.iter().map(|p| photos.public_url(p)).collect(),
            photo_ids: entry.photos.iter().map(|p| p.id.clone()).collect(),
            created_at: item.created_at.timestamp_millis(),
            updated_at: item.updated_at.timestamp_millis(),
            low_stock: item.is_low_stock(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<StockItemView>,
    pub summary: Summary,
}

/// Success acknowledgement
#[derive(Debug, Serialize)]
pub struct Ack<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Ack<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Ack<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
