//! Items service.
//!
//! A small HTTP service exposing list/get/create over an append-only "items"
//! collection, plus liveness, readiness and Prometheus metrics endpoints.
//!
//! # Backends
//!
//! The collection lives in one of two interchangeable stores:
//!
//! ```text
//! STORAGE_BACKEND=memory    process-local, seeded with two items
//! STORAGE_BACKEND=postgres  `items` table, created on startup if absent
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: Storage backends and the item model
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
