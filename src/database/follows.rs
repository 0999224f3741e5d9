// ABOUTME: Follow (subscription) storage and the subscriptions projection
// ABOUTME: Recipe previews per author are limited with a window function in one query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::recipes::row_to_summary;
use super::users::{profile_query, row_to_profile};
use super::{push_id_list, Database};
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use crate::models::{RecipeSummary, Subscription, UserProfile};

impl Database {
    pub(super) async fn migrate_follows(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS follows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, author_id),
                CHECK (user_id <> author_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_follows_author ON follows(author_id)",
        ])
        .await
    }

    /// Start following an author
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a self-follow and `Conflict` if already following
    pub async fn follow(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::invalid_input("You cannot subscribe to yourself"));
        }
        sqlx::query("INSERT INTO follows (user_id, author_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(author_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .db_unique(
                "You are already subscribed to this user",
                "Failed to create subscription",
            )?;
        Ok(())
    }

    /// Stop following an author
    ///
    /// # Errors
    ///
    /// Returns `NotPresent` if the follow does not exist
    pub async fn unfollow(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .db_context("Failed to remove subscription")?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_present("You are not subscribed to this user"));
        }
        Ok(())
    }

    /// Authors the user follows, each with recipe previews and a recipe count
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn subscriptions(
        &self,
        user_id: i64,
        recipes_limit: Option<i64>,
    ) -> AppResult<Vec<Subscription>> {
        let mut builder = profile_query(Some(user_id));
        builder
            .push(" JOIN follows fl ON fl.author_id = u.id WHERE fl.user_id = ")
            .push_bind(user_id)
            .push(" ORDER BY u.id");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to list subscriptions")?;
        let authors: Vec<UserProfile> = rows.iter().map(row_to_profile).collect();
        self.attach_recipes(authors, recipes_limit).await
    }

    /// One followed author in subscription form
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the author does not exist
    pub async fn subscription_for(
        &self,
        author_id: i64,
        viewer: i64,
        recipes_limit: Option<i64>,
    ) -> AppResult<Subscription> {
        let author = self
            .get_profile(author_id, Some(viewer))
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        self.attach_recipes(vec![author], recipes_limit)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Subscription projection was empty"))
    }

    async fn attach_recipes(
        &self,
        authors: Vec<UserProfile>,
        recipes_limit: Option<i64>,
    ) -> AppResult<Vec<Subscription>> {
        let author_ids: Vec<i64> = authors.iter().map(|a| a.id).collect();
        let mut previews = self.recipe_previews(&author_ids, recipes_limit).await?;
        let counts = self.recipe_counts(&author_ids).await?;

        Ok(authors
            .into_iter()
            .map(|author| {
                let id = author.id;
                Subscription {
                    author,
                    recipes: previews.remove(&id).unwrap_or_default(),
                    recipes_count: counts.get(&id).copied().unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Newest recipes per author, at most `limit` each
    async fn recipe_previews(
        &self,
        author_ids: &[i64],
        limit: Option<i64>,
    ) -> AppResult<HashMap<i64, Vec<RecipeSummary>>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT author_id, id, name, image, cooking_time FROM (\
             SELECT r.author_id, r.id, r.name, r.image, r.cooking_time, \
             ROW_NUMBER() OVER (PARTITION BY r.author_id ORDER BY r.id DESC) AS position \
             FROM recipes r WHERE r.author_id IN ",
        );
        push_id_list(&mut builder, author_ids);
        builder.push(")");
        if let Some(limit) = limit {
            builder.push(" WHERE position <= ").push_bind(limit);
        }
        builder.push(" ORDER BY author_id, id DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to load recipe previews")?;

        let mut grouped: HashMap<i64, Vec<RecipeSummary>> = HashMap::new();
        for row in &rows {
            grouped
                .entry(row.get("author_id"))
                .or_default()
                .push(row_to_summary(row));
        }
        Ok(grouped)
    }

    async fn recipe_counts(&self, author_ids: &[i64]) -> AppResult<HashMap<i64, i64>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT author_id, COUNT(*) AS recipes_count FROM recipes WHERE author_id IN ",
        );
        push_id_list(&mut builder, author_ids);
        builder.push(" GROUP BY author_id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to count recipes")?;
        Ok(rows
            .iter()
            .map(|row| (row.get("author_id"), row.get("recipes_count")))
            .collect())
    }
}
