//! # Schema Module
//!
//! Reads table and column metadata from the connected database and turns it
//! into the inputs the generator renders from.
//!
//! ## Overview
//!
//! The module is split in two:
//!
//! - **[`MetadataSource`]** - the raw query contract: base table names for a
//!   schema, and `{column_name, data_type}` rows for one table. Postgres is the
//!   production implementation ([`PgMetadataSource`]); tests substitute an
//!   in-memory source.
//! - **[`SchemaReader`]** - applies the naming rules on top of a source:
//!   reserved tables (leading `_`, e.g. `_prisma_migrations`) are dropped from
//!   discovery, and column lookups use the lower-cased model name.
//!
//! Neither layer caches. Every call goes to the source, and any failure is
//! wrapped in [`ScaffoldError::MetadataFetch`] naming the table involved.

mod postgres;

pub use postgres::{mask_database_url, PgMetadataSource};

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::error::{ScaffoldError, ScaffoldResult};

/// One column of a table as reported by the metadata source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name, used verbatim as the generated field name
    pub column_name: String,
    /// Declared native type (e.g. `integer`, `character varying`)
    pub data_type: String,
}

impl FieldDescriptor {
    pub fn new(column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Name of one generated resource, derived 1:1 from a base table name.
///
/// Only names matching `[A-Za-z0-9_]+` are accepted. Anything else cannot be
/// spliced into identifiers and file names safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelName(String);

impl ModelName {
    /// Validate a discovered table name
    ///
    /// Returns `None` when the name contains anything outside `[A-Za-z0-9_]`
    /// or is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| ModelName(raw.to_string()))
    }

    /// The name as discovered (e.g. `User`)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased resource identifier used for paths, file names and
    /// Prisma accessors (e.g. `user`)
    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query capability the schema reader depends on.
///
/// Implementations return raw rows; no filtering or renaming happens here.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Names of base tables (not views) in `schema`
    async fn base_tables(&self, schema: &str) -> anyhow::Result<Vec<String>>;

    /// Columns of the table whose lower-cased name equals `table_lower`
    async fn columns(&self, schema: &str, table_lower: &str)
        -> anyhow::Result<Vec<FieldDescriptor>>;

    /// Release the underlying connection. Called exactly once per run.
    async fn close(&self);
}

/// Drop reserved/internal tables from a discovered name list
///
/// Order of the remaining names is preserved.
pub fn exclude_reserved(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !name.starts_with('_'))
        .collect()
}

/// Lower-cased names shared by more than one valid model name
///
/// Column lookup and output file names both use the lower-cased form, so
/// `User` and `user` cannot both be generated.
pub fn case_collisions(names: &[String]) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut collisions = HashSet::new();
    for model in names.iter().filter_map(|name| ModelName::parse(name)) {
        let lower = model.lower();
        if !seen.insert(lower.clone()) {
            collisions.insert(lower);
        }
    }
    collisions
}

/// Model discovery and field lookup over a [`MetadataSource`].
pub struct SchemaReader<S> {
    source: S,
    schema: String,
}

impl<S: MetadataSource> SchemaReader<S> {
    pub fn new(source: S, schema: impl Into<String>) -> Self {
        Self {
            source,
            schema: schema.into(),
        }
    }

    /// Base table names with reserved (`_`-prefixed) tables removed
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::MetadataFetch`] if the source query fails.
    pub async fn list_models(&self) -> ScaffoldResult<Vec<String>> {
        let tables = self
            .source
            .base_tables(&self.schema)
            .await
            .map_err(|source| ScaffoldError::MetadataFetch {
                resource: "model list".to_string(),
                source,
            })?;
        debug!(schema = %self.schema, count = tables.len(), "discovered base tables");
        Ok(exclude_reserved(tables))
    }

    /// Columns for `model`, looked up by its lower-cased name
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::MetadataFetch`] naming the model if the
    /// source query fails.
    pub async fn fields_of(&self, model: &ModelName) -> ScaffoldResult<Vec<FieldDescriptor>> {
        self.source
            .columns(&self.schema, &model.lower())
            .await
            .map_err(|source| ScaffoldError::MetadataFetch {
                resource: format!("model {model}"),
                source,
            })
    }

    /// Release the source's connection
    pub async fn close(&self) {
        self.source.close().await;
    }

    /// Borrow the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }
}
