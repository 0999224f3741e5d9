// ABOUTME: Tag and ingredient catalog storage, read-only through the API
// ABOUTME: Ingredient search matches a case-folded name prefix; loaders insert idempotently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::collections::HashSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::{push_id_list, Database};
use crate::errors::{AppResult, DatabaseResultExt};
use crate::models::{Ingredient, Tag};

impl Database {
    pub(super) async fn migrate_catalog(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL,
                name_folded TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_ingredients_name_folded ON ingredients(name_folded)",
        ])
        .await
    }

    /// All tags ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to list tags")?;
        Ok(rows.iter().map(row_to_tag).collect())
    }

    /// One tag
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_tag(&self, tag_id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE id = ?")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get tag")?;
        Ok(row.as_ref().map(row_to_tag))
    }

    /// Insert a tag unless one with the same name or slug exists
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_tag(&self, name: &str, slug: &str) -> AppResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO tags (name, slug) VALUES (?, ?)")
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await
            .db_context("Failed to create tag")?;
        Ok(result.rows_affected() > 0)
    }

    /// Ingredients ordered by name, optionally filtered by a case-insensitive name prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name, measurement_unit FROM ingredients");
        if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
            // substr comparison avoids LIKE wildcards inside user input
            let folded = fold_name(prefix);
            builder
                .push(" WHERE substr(name_folded, 1, length(")
                .push_bind(folded.clone())
                .push(")) = ")
                .push_bind(folded);
        }
        builder.push(" ORDER BY name, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to list ingredients")?;
        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    /// One ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_ingredient(&self, ingredient_id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = ?")
            .bind(ingredient_id)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get ingredient")?;
        Ok(row.as_ref().map(row_to_ingredient))
    }

    /// Insert an ingredient unless the (name, unit) pair exists
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_ingredient(&self, name: &str, measurement_unit: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO ingredients (name, measurement_unit, name_folded) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(measurement_unit)
        .bind(fold_name(name))
        .execute(&self.pool)
        .await
        .db_context("Failed to create ingredient")?;
        Ok(result.rows_affected() > 0)
    }

    /// Which of `ids` are existing tags
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn existing_tag_ids(&self, ids: &[i64]) -> AppResult<HashSet<i64>> {
        self.existing_ids("tags", ids).await
    }

    /// Which of `ids` are existing ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn existing_ingredient_ids(&self, ids: &[i64]) -> AppResult<HashSet<i64>> {
        self.existing_ids("ingredients", ids).await
    }

    async fn existing_ids(&self, table: &'static str, ids: &[i64]) -> AppResult<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT id FROM {table} WHERE id IN "));
        push_id_list(&mut builder, ids);
        let found: Vec<i64> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to look up ids")?;
        Ok(found.into_iter().collect())
    }
}

/// Unicode lowercase form used for prefix search
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(super) fn row_to_tag(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}
