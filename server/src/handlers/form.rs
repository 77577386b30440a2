//! Stock item form parsing and validation
//!
//! Multipart bodies are read in full, then validated in one pass so that
//! every violated field is reported together.

use crate::config::{MAX_NOTES_LENGTH, MAX_PHOTOS_PER_ITEM, MAX_SHORT_TEXT_LENGTH};
use crate::database::ItemFields;
use crate::error::{AppError, FieldErrors, Result};
use crate::imaging::{self, NormalizedImage, SourceFormat};
use axum::body::Bytes;
use axum::extract::Multipart;
use serde_json::Value;

/// A file part of the form
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedPhoto {
    fn source_format(&self) -> SourceFormat {
        self.content_type
            .as_deref()
            .map(SourceFormat::from_mime)
            .unwrap_or(SourceFormat::Unknown)
    }
}

/// Raw stock item form as submitted
#[derive(Debug, Clone, Default)]
pub struct StockForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub qty: Option<String>,
    pub min_qty: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub kept_photo_ids: Vec<String>,
    pub photos: Vec<UploadedPhoto>,
}

/// Read every part of a multipart stock form.
///
/// Array fields are accepted with or without the `[]` suffix. Empty file
/// parts without a file name are what browsers send for an untouched file
/// input and are skipped.
pub async fn read_stock_form(mut multipart: Multipart) -> Result<StockForm> {
    let mut form = StockForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = match field.name() {
            Some(name) => name.trim_end_matches("[]").to_string(),
            None => continue,
        };

        if name == "photos" {
            let has_file_name = field.file_name().is_some_and(|f| !f.is_empty());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            if !has_file_name && data.is_empty() {
                continue;
            }
            form.photos.push(UploadedPhoto { content_type, data });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        match name.as_str() {
            "name" => form.name = Some(text),
            "category" => form.category = Some(text),
            "qty" => form.qty = Some(text),
            "min_qty" => form.min_qty = Some(text),
            "location" => form.location = Some(text),
            "notes" => form.notes = Some(text),
            "kept_photo_ids" => {
                let id = text.trim();
                if !id.is_empty() {
                    form.kept_photo_ids.push(id.to_string());
                }
            }
            other => tracing::debug!("Ignoring unknown form field: {}", other),
        }
    }

    Ok(form)
}

impl StockForm {
    /// Validate the form, returning trimmed item fields.
    ///
    /// `existing_photo_ids` is the photo set of the item being edited; on
    /// create it is `None` and kept ids are not allowed.
    pub fn validate(
        &self,
        max_photo_bytes: usize,
        existing_photo_ids: Option<&[String]>,
    ) -> Result<ItemFields> {
        let mut errors = FieldErrors::new();

        let name = trimmed(&self.name);
        if name.is_empty() {
            errors.add("name", "The name field is required.");
        }
        check_length(&mut errors, "name", &name, MAX_SHORT_TEXT_LENGTH);

        let category = trimmed(&self.category);
        check_length(&mut errors, "category", &category, MAX_SHORT_TEXT_LENGTH);

        let location = trimmed(&self.location);
        check_length(&mut errors, "location", &location, MAX_SHORT_TEXT_LENGTH);

        let notes = trimmed(&self.notes);
        check_length(&mut errors, "notes", &notes, MAX_NOTES_LENGTH);

        let qty = parse_count(&mut errors, "qty", self.qty.as_deref());
        let min_qty = parse_count(&mut errors, "min_qty", self.min_qty.as_deref());

        if self.photos.len() > MAX_PHOTOS_PER_ITEM {
            errors.add(
                "photos",
                format!("The photos field must not have more than {} items.", MAX_PHOTOS_PER_ITEM),
            );
        }
        for (index, photo) in self.photos.iter().enumerate() {
            let field = format!("photos.{}", index);
            let is_image = photo
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));

            if photo.data.is_empty() {
                errors.add(&field, format!("The {} field must not be empty.", field));
            }
            if !is_image {
                errors.add(&field, format!("The {} field must be an image.", field));
            }
            if photo.data.len() > max_photo_bytes {
                errors.add(
                    &field,
                    format!(
                        "The {} field must not be greater than {} kilobytes.",
                        field,
                        max_photo_bytes / 1024
                    ),
                );
            }
        }

        for (index, id) in self.kept_photo_ids.iter().enumerate() {
            let known = existing_photo_ids.is_some_and(|ids| ids.contains(id));
            if !known {
                let field = format!("kept_photo_ids.{}", index);
                errors.add(&field, format!("The selected {} is invalid.", field));
            }
        }

        errors.into_result()?;

        Ok(ItemFields {
            name,
            category,
            qty: qty.unwrap_or_default(),
            min_qty: min_qty.unwrap_or_default(),
            location,
            notes,
        })
    }

    /// Normalize every uploaded photo, in submission order
    pub async fn normalize_photos(&self) -> Result<Vec<NormalizedImage>> {
        let mut images = Vec::with_capacity(self.photos.len());
        for photo in &self.photos {
            let image = imaging::normalize_blocking(photo.data.to_vec(), photo.source_format()).await?;
            images.push(image);
        }
        Ok(images)
    }
}

/// Validate a quantity given as a JSON number or numeric string
pub fn parse_quantity(value: &Value) -> Result<i64> {
    let mut errors = FieldErrors::new();

    let raw = match value {
        Value::Null => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => Some(String::new()),
    };
    let qty = parse_count(&mut errors, "qty", raw.as_deref());

    errors.into_result()?;
    Ok(qty.unwrap_or_default())
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("The {} field must not be greater than {} characters.", field, max),
        );
    }
}

/// Required non-negative integer
fn parse_count(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<i64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        errors.add(field, format!("The {} field is required.", field));
        return None;
    }

    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Some(n),
        Ok(_) => {
            errors.add(field, format!("The {} field must be at least 0.", field));
            None
        }
        Err(_) => {
            errors.add(field, format!("The {} field must be an integer.", field));
            None
        }
    }
}
