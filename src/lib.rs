//! Skycache - A TTL cache for weather API responses
//!
//! Caches successful weather reports in a namespaced key/value storage,
//! evicting expired entries lazily on read.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod favorites;
pub mod models;
pub mod tasks;
pub mod tools;
pub mod units;
pub mod weather;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
