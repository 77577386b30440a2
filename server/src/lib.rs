//! Stockroom library
//!
//! This library exposes the core functionality of Stockroom for the server
//! binary and for integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod imaging;
pub mod services;
pub mod storage;
