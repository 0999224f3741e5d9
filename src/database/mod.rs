// ABOUTME: SQLite storage for users, catalog, recipes, relations, and follows
// ABOUTME: Owns the connection pool and creates the schema on startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! # Database
//!
//! A single [`Database`] handle wraps the `SQLite` pool. Each submodule adds an
//! `impl Database` block for one area of the schema. Foreign keys are enforced
//! and every child row cascades with its parent recipe or user.

mod catalog;
mod follows;
mod recipes;
mod relations;
mod shopping_list;
/// Transaction guard used by multi-row writes
pub mod transactions;
mod users;

pub use recipes::{RecipeChanges, RecipeFilter, RecipeRecord};
pub use transactions::TransactionGuard;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult, DatabaseResultExt};

/// Handle to the Foodgram database
#[derive(Clone, Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if missing) the database described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let mut options = SqliteConnectOptions::from_str(&config.url.to_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if let DatabaseUrl::File { path } = &config.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::storage(format!("Failed to create database directory: {e}"))
                })?;
            }
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.pool_size());
        if config.url.is_memory() {
            // The database lives only as long as its single connection
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .db_context("Failed to connect to database")?;

        info!(url = %config.url, "Database connected");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub const fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Open a write transaction named after the operation it serves
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired
    pub async fn begin(&self, label: &'static str) -> AppResult<TransactionGuard> {
        let tx = self
            .pool
            .begin()
            .await
            .db_context("Failed to begin transaction")?;
        Ok(TransactionGuard::new(label, tx))
    }

    /// Create every table and index if missing
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_catalog().await?;
        self.migrate_recipes().await?;
        self.migrate_relations().await?;
        self.migrate_follows().await?;
        info!("Database schema ready");
        Ok(())
    }

    async fn run_schema(&self, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .db_context("Migration failed")?;
        }
        Ok(())
    }

    /// Liveness check
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .db_context("Database ping failed")?;
        Ok(())
    }
}

/// Append `(?, ?, ...)` binding every id
pub(crate) fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
