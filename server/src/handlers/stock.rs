//! Stock item endpoints

use crate::app::AppState;
use crate::error::{AppError, Result};
use crate::handlers::form::{self, read_stock_form};
use crate::handlers::views::{Ack, ListResponse, StockItemView};
use crate::services::listing::{self, ListQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    #[serde(default)]
    pub qty: Value,
}

pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let items = state.stock.list_items().await?;
    let summary = listing::summarize(&items);

    let photos = state.stock.photos();
    let items = listing::apply(items, &query)
        .iter()
        .map(|entry| StockItemView::new(entry, photos))
        .collect();

    Ok(Json(ListResponse { items, summary }))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StockItemView>> {
    let entry = state.stock.get_item(&id).await?;
    Ok(Json(StockItemView::new(&entry, state.stock.photos())))
}

pub async fn create_stock(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Ack<StockItemView>>)> {
    let form = read_stock_form(multipart).await?;
    let fields = form.validate(state.settings.max_photo_bytes, None)?;
    let images = form.normalize_photos().await?;

    let created = state.stock.create_item_with_photos(&fields, &images).await?;
    let view = StockItemView::new(&created, state.stock.photos());

    Ok((
        StatusCode::CREATED,
        Json(Ack::with_data("Item adicionado ao estoque.", view)),
    ))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Ack<StockItemView>>> {
    let current = state.stock.get_item(&id).await?;
    let existing: Vec<String> = current.photos.iter().map(|p| p.id.clone()).collect();

    let form = read_stock_form(multipart).await?;
    let fields = form.validate(state.settings.max_photo_bytes, Some(&existing))?;
    let images = form.normalize_photos().await?;

    let updated = state
        .stock
        .update_item_with_photos(&id, &fields, &form.kept_photo_ids, &images)
        .await?;
    let view = StockItemView::new(&updated, state.stock.photos());

    Ok(Json(Ack::with_data("Item atualizado.", view)))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<Ack<StockItemView>>> {
    state.stock.get_item(&id).await?;

    // Malformed bodies get the same JSON error shape as everything else
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let qty = form::parse_quantity(&request.qty)?;

    state.stock.update_quantity(&id, qty).await?;
    let entry = state.stock.get_item(&id).await?;

    Ok(Json(Ack::with_data(
        "Quantidade atualizada.",
        StockItemView::new(&entry, state.stock.photos()),
    )))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack<()>>> {
    state.stock.delete_item(&id).await?;
    Ok(Json(Ack::message("Item excluído do estoque.")))
}
