//! Application configuration
//!
//! Central location for the fixed limits and validation boundaries used
//! throughout the application, plus the runtime settings read from the
//! environment at startup.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

// ===== Stock Item Limits =====

/// Maximum length of an item name, category or location, in characters
pub const MAX_SHORT_TEXT_LENGTH: usize = 255;

/// Maximum length of the free-form notes field, in characters
pub const MAX_NOTES_LENGTH: usize = 2000;

// ===== Photo Limits =====

/// Maximum number of photos a single stock item may hold
pub const MAX_PHOTOS_PER_ITEM: usize = 5;

/// Default per-upload size cap (20 MiB)
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 20 * 1024 * 1024;

/// WebP quality used for every stored photo (0-100 scale)
pub const WEBP_QUALITY: f32 = 80.0;

/// Prefix under the blob root where photo files live
pub const PHOTO_KEY_PREFIX: &str = "stock-photos";

/// Extension of normalized photo files
pub const PHOTO_EXTENSION: &str = "webp";

// ===== Runtime Defaults =====

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_PUBLIC_URL: &str = "/storage";

/// Runtime settings, read from `STOCKROOM_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    /// URL prefix under which stored photos are served
    pub public_url: String,
    pub max_photo_bytes: usize,
    pub seed_demo: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_raw = value("STOCKROOM_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("STOCKROOM_ADDR '{}': {}", addr_raw, e)))?;

        let data_dir = PathBuf::from(
            value("STOCKROOM_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let public_url = normalize_public_url(
            &value("STOCKROOM_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        )?;

        let max_photo_bytes = match value("STOCKROOM_MAX_PHOTO_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "STOCKROOM_MAX_PHOTO_BYTES must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => DEFAULT_MAX_PHOTO_BYTES,
        };

        let seed_demo = match value("STOCKROOM_SEED_DEMO") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("STOCKROOM_SEED_DEMO must be a boolean, got '{}'", raw))
            })?,
            None => false,
        };

        Ok(Self {
            addr,
            data_dir,
            public_url,
            max_photo_bytes,
            seed_demo,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("stockroom.db")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    /// Request body limit: every photo at the cap plus room for the text fields.
    pub fn body_limit(&self) -> usize {
        self.max_photo_bytes
            .saturating_mul(MAX_PHOTOS_PER_ITEM)
            .saturating_add(1024 * 1024)
    }
}

fn normalize_public_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(AppError::Config(format!(
            "STOCKROOM_PUBLIC_URL must be an absolute path like /storage, got '{}'",
            raw
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
