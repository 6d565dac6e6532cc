//! PostgreSQL-backed item store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::StoreError;

use super::types::{Item, NewItem};
use super::ItemStore;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Item store backed by the `items` table.
///
/// Every operation checks a connection out of the pool for the duration of a
/// single statement.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Build a pool from configuration without connecting.
    ///
    /// Connections are opened on first use, so an unreachable database surfaces
    /// as per-request errors rather than a startup failure.
    pub fn connect_lazy(config: &Config) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .database(&config.db_name)
            .username(&config.db_user)
            .password(&config.db_password);

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect_lazy_with(options);

        info!(
            database = %config.database_target(),
            max_connections = config.db_max_connections,
            "PostgreSQL pool configured"
        );

        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self))]
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        info!("items table ready");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, COALESCE(description, '') AS description, created_at
            FROM items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = items.len(), "items listed");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<Option<Item>, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, COALESCE(description, '') AS description, created_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self, input))]
    async fn create(&self, input: NewItem) -> Result<Item, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description)
            VALUES ($1, $2)
            RETURNING id, name, COALESCE(description, '') AS description, created_at
            "#,
        )
        .bind(input.name())
        .bind(input.description())
        .fetch_one(&self.pool)
        .await?;

        debug!(id = item.id, "item inserted");
        Ok(item)
    }
}
