//! Storage module
//!
//! Provides blob storage for photo files.

pub mod blob_store;

pub use blob_store::BlobStore;
