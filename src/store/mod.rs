//! Storage backends for the item collection.
//!
//! Both backends implement [`ItemStore`] and are interchangeable behind an
//! `Arc<dyn ItemStore>`.

pub mod memory;
pub mod postgres;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::StoreError;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;
pub use types::{Item, NewItem, DEFAULT_ITEM_NAME};

/// List/get/create over the item collection.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Prepare the backend for use, e.g. create the schema.
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Check the backend can serve requests.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// All items in ascending id order.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// Item with exactly this id, if any.
    async fn get(&self, id: i32) -> Result<Option<Item>, StoreError>;

    /// Persist a new item and return the stored record.
    async fn create(&self, input: NewItem) -> Result<Item, StoreError>;
}

/// Which backend the service runs with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process memory, seeded with two items.
    #[default]
    #[strum(to_string = "memory", serialize = "MEMORY")]
    Memory,
    /// PostgreSQL `items` table.
    #[serde(alias = "postgresql")]
    #[strum(to_string = "postgres", serialize = "POSTGRES", serialize = "postgresql")]
    Postgres,
}

/// What to do when schema bootstrap fails at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapPolicy {
    /// Log the failure and keep serving; requests fail individually.
    #[default]
    LogAndContinue,
    /// Abort startup.
    Fatal,
}

impl BootstrapPolicy {
    /// Policy for the `strict` flag.
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Fatal
        } else {
            Self::LogAndContinue
        }
    }
}

/// Construct the configured backend.
pub fn build_store(config: &Config) -> Arc<dyn ItemStore> {
    match config.storage_backend {
        BackendKind::Memory => {
            info!("Using in-memory item store");
            Arc::new(MemoryItemStore::seeded())
        }
        BackendKind::Postgres => Arc::new(PgItemStore::connect_lazy(config)),
    }
}

/// Run backend initialization under the given failure policy.
pub async fn bootstrap(store: &dyn ItemStore, policy: BootstrapPolicy) -> Result<(), StoreError> {
    match store.init().await {
        Ok(()) => Ok(()),
        Err(e) => match policy {
            BootstrapPolicy::LogAndContinue => {
                warn!(error = %e, "Schema bootstrap failed, continuing without it");
                Ok(())
            }
            BootstrapPolicy::Fatal => Err(e),
        },
    }
}
