//! Services module
//!
//! Business logic services that coordinate between handlers and repository.

pub mod listing;
pub mod photos;
pub mod seed;
pub mod stock;

pub use photos::PhotoStore;
pub use stock::StockService;
