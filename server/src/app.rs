//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::Settings;
use crate::database::{self, Repository};
use crate::error::Result;
use crate::services::{PhotoStore, StockService};
use crate::storage::BlobStore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub repo: Repository,
    pub stock: StockService,
}

impl AppState {
    pub fn new(settings: Settings, pool: SqlitePool, blob_store: BlobStore) -> Self {
        let repo = Repository::new(pool);
        let photos = PhotoStore::new(repo.clone(), blob_store, settings.public_url.clone());
        let stock = StockService::new(repo.clone(), photos);

        Self {
            settings: Arc::new(settings),
            repo,
            stock,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(settings: Settings) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Data directory: {:?}", settings.data_dir);

    // Create necessary directories
    std::fs::create_dir_all(&settings.data_dir)?;

    let pool = database::create_pool(&settings.database_path()).await?;

    let blob_store = BlobStore::new(settings.storage_dir());
    blob_store.initialize().await?;

    let state = AppState::new(settings, pool, blob_store);

    tracing::info!("Application initialized successfully");

    Ok(state)
}
