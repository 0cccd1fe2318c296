//! Shared library for the `$UPV` widget service
//!
//! This library contains the pieces that do not depend on the widget itself:
//! - Error type and HTTP error responses
//! - Environment configuration
//! - Key-value store seam with Redis and in-memory backends
//! - Common types and utilities

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use cache::{CacheKeys, RedisStore};
pub use config::Config;
pub use error::{AppError, Result};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use types::*;
