// ABOUTME: Favorites and shopping cart storage, both (user, recipe) pairs
// ABOUTME: One implementation parameterized by RelationKind serves both tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use chrono::Utc;

use super::Database;
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use crate::models::RelationKind;

impl Database {
    pub(super) async fn migrate_relations(&self) -> AppResult<()> {
        for kind in [RelationKind::Favorite, RelationKind::ShoppingCart] {
            let table = kind.table();
            let create = format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, recipe_id)
                )
                "
            );
            let index = format!("CREATE INDEX IF NOT EXISTS idx_{table}_recipe ON {table}(recipe_id)");
            self.run_schema(&[create.as_str(), index.as_str()]).await?;
        }
        Ok(())
    }

    /// Record that a user favorited or carted a recipe
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the pair already exists
    pub async fn add_relation(&self, kind: RelationKind, user_id: i64, recipe_id: i64) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .db_unique(
            kind.already_present_message(),
            format_args!("Failed to add {}", kind.as_str()),
        )?;
        Ok(())
    }

    /// Remove a (user, recipe) pair
    ///
    /// # Errors
    ///
    /// Returns `NotPresent` if the pair does not exist
    pub async fn remove_relation(
        &self,
        kind: RelationKind,
        user_id: i64,
        recipe_id: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .db_context(format_args!("Failed to remove {}", kind.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_present(kind.not_present_message()));
        }
        Ok(())
    }

    /// Whether a (user, recipe) pair exists
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn has_relation(&self, kind: RelationKind, user_id: i64, recipe_id: i64) -> AppResult<bool> {
        sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?)",
            kind.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .db_context(format_args!("Failed to check {}", kind.as_str()))
    }
}
