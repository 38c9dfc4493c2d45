use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{FieldDescriptor, MetadataSource};

const BASE_TABLES_SQL: &str = "SELECT table_name::text \
     FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND lower(table_name) = $2 \
     ORDER BY ordinal_position";

/// Postgres `information_schema` reader over a single pooled connection.
///
/// The pool is capped at one connection: the generator is sequential and the
/// handle is released explicitly via [`MetadataSource::close`].
pub struct PgMetadataSource {
    pool: PgPool,
}

impl PgMetadataSource {
    /// Connect to `database_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established within 30s.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database: {}", mask_database_url(database_url));
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })
            .with_context(|| {
                format!("Failed to connect to {}", mask_database_url(database_url))
            })?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataSource for PgMetadataSource {
    async fn base_tables(&self, schema: &str) -> anyhow::Result<Vec<String>> {
        debug!(sql = BASE_TABLES_SQL, schema, "querying base tables");
        let rows: Vec<(String,)> = sqlx::query_as(BASE_TABLES_SQL)
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            .context("information_schema.tables query failed")?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn columns(
        &self,
        schema: &str,
        table_lower: &str,
    ) -> anyhow::Result<Vec<FieldDescriptor>> {
        debug!(sql = COLUMNS_SQL, schema, table = table_lower, "querying columns");
        let rows: Vec<(String, String)> = sqlx::query_as(COLUMNS_SQL)
            .bind(schema)
            .bind(table_lower)
            .fetch_all(&self.pool)
            .await
            .with_context(|| {
                format!("information_schema.columns query failed for {table_lower}")
            })?;
        Ok(rows
            .into_iter()
            .map(|(column_name, data_type)| FieldDescriptor {
                column_name,
                data_type,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

/// Hide the password part of a connection string for logging
pub fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut masked = parsed.clone();
        if parsed.password().is_some() && masked.set_password(Some("***")).is_err() {
            return "***".to_string();
        }
        masked.to_string()
    } else if url.len() > 20 {
        let head: String = url.chars().take(10).collect();
        let tail: String = url
            .chars()
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{head}***{tail}")
    } else {
        "***".to_string()
    }
}
