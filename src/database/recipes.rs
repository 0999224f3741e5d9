// ABOUTME: Recipe storage with atomic tag/ingredient set writes and batched read projection
// ABOUTME: Projections resolve tags, ingredient lines, authors, and viewer flags in fixed queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::catalog::row_to_tag;
use super::transactions::TransactionGuard;
use super::{push_id_list, Database};
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use crate::models::{
    IngredientAmountInput, Recipe, RecipeIngredientLine, RecipeSummary, RecipeView, Tag,
};

/// A fully validated new recipe
#[derive(Debug, Clone)]
pub struct RecipeRecord {
    /// Title
    pub name: String,
    /// Description / method
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
    /// Image URL
    pub image: String,
    /// Distinct, existing tag ids
    pub tag_ids: Vec<i64>,
    /// Distinct, existing ingredient lines with positive amounts
    pub ingredients: Vec<IngredientAmountInput>,
}

/// Validated fields of a partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    /// Title
    pub name: Option<String>,
    /// Description / method
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i64>,
    /// Image URL
    pub image: Option<String>,
    /// Replacement tag set
    pub tag_ids: Option<Vec<i64>>,
    /// Replacement ingredient set
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

impl RecipeChanges {
    /// Convert into a new-recipe record
    ///
    /// # Errors
    ///
    /// Returns an internal error if a field required for creation is missing
    pub fn into_record(self) -> AppResult<RecipeRecord> {
        let missing = |field: &str| AppError::internal(format!("Validated recipe is missing {field}"));
        Ok(RecipeRecord {
            name: self.name.ok_or_else(|| missing("name"))?,
            text: self.text.ok_or_else(|| missing("text"))?,
            cooking_time: self.cooking_time.ok_or_else(|| missing("cooking_time"))?,
            image: self.image.ok_or_else(|| missing("image"))?,
            tag_ids: self.tag_ids.ok_or_else(|| missing("tags"))?,
            ingredients: self.ingredients.ok_or_else(|| missing("ingredients"))?,
        })
    }
}

/// Recipe list filters; all supplied filters combine with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Recipe has at least one of these tag slugs
    pub tags: Vec<String>,
    /// Recipe author id
    pub author: Option<i64>,
    /// Only the viewer's favorites; ignored for anonymous viewers
    pub is_favorited: bool,
    /// Only recipes in the viewer's cart; ignored for anonymous viewers
    pub is_in_shopping_cart: bool,
}

impl Database {
    pub(super) async fn migrate_recipes(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time BETWEEN 1 AND 32000),
                image TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (recipe_id, tag_id)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL CHECK (amount BETWEEN 1 AND 32000),
                UNIQUE (recipe_id, ingredient_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)",
            "CREATE INDEX IF NOT EXISTS idx_recipe_tags_tag ON recipe_tags(tag_id)",
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id)",
        ])
        .await
    }

    /// Insert a recipe with its tag and ingredient sets in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is persisted in that case
    pub async fn create_recipe(&self, author_id: i64, record: &RecipeRecord) -> AppResult<i64> {
        let mut tx = self.begin("create_recipe").await?;
        let now = Utc::now();

        let recipe_id = sqlx::query(
            r"
            INSERT INTO recipes (author_id, name, text, cooking_time, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(author_id)
        .bind(&record.name)
        .bind(&record.text)
        .bind(record.cooking_time)
        .bind(&record.image)
        .bind(now)
        .bind(now)
        .execute(tx.executor()?)
        .await
        .db_context("Failed to insert recipe")?
        .last_insert_rowid();

        insert_tag_links(&mut tx, recipe_id, &record.tag_ids).await?;
        insert_ingredient_lines(&mut tx, recipe_id, &record.ingredients).await?;

        tx.commit().await?;
        Ok(recipe_id)
    }

    /// Apply a partial update in one transaction
    ///
    /// Supplied sets replace the stored set entirely. `updated_at` is always refreshed.
    /// Returns the image URL that was replaced, if the image changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe does not exist, or an error if any write fails
    pub async fn update_recipe(
        &self,
        recipe_id: i64,
        changes: &RecipeChanges,
    ) -> AppResult<Option<String>> {
        let mut tx = self.begin("update_recipe").await?;

        let previous_image: Option<String> =
            sqlx::query_scalar("SELECT image FROM recipes WHERE id = ?")
                .bind(recipe_id)
                .fetch_optional(tx.executor()?)
                .await
                .db_context("Failed to read recipe")?;
        let previous_image = previous_image.ok_or_else(|| AppError::not_found("Recipe"))?;

        sqlx::query(
            r"
            UPDATE recipes SET
                name = COALESCE(?, name),
                text = COALESCE(?, text),
                cooking_time = COALESCE(?, cooking_time),
                image = COALESCE(?, image),
                updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(changes.name.as_deref())
        .bind(changes.text.as_deref())
        .bind(changes.cooking_time)
        .bind(changes.image.as_deref())
        .bind(Utc::now())
        .bind(recipe_id)
        .execute(tx.executor()?)
        .await
        .db_context("Failed to update recipe")?;

        if let Some(tag_ids) = &changes.tag_ids {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
                .bind(recipe_id)
                .execute(tx.executor()?)
                .await
                .db_context("Failed to clear recipe tags")?;
            insert_tag_links(&mut tx, recipe_id, tag_ids).await?;
        }

        if let Some(ingredients) = &changes.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
                .bind(recipe_id)
                .execute(tx.executor()?)
                .await
                .db_context("Failed to clear recipe ingredients")?;
            insert_ingredient_lines(&mut tx, recipe_id, ingredients).await?;
        }

        tx.commit().await?;
        Ok(changes
            .image
            .as_ref()
            .filter(|new| **new != previous_image)
            .map(|_| previous_image))
    }

    /// Delete a recipe; join rows, favorites, and cart entries cascade
    ///
    /// Returns the deleted recipe's image URL.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe does not exist
    pub async fn delete_recipe(&self, recipe_id: i64) -> AppResult<String> {
        let image: Option<String> = sqlx::query_scalar("DELETE FROM recipes WHERE id = ? RETURNING image")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to delete recipe")?;
        image.ok_or_else(|| AppError::not_found("Recipe"))
    }

    /// Stored recipe row
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_recipe(&self, recipe_id: i64) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, author_id, name, text, cooking_time, image, created_at, updated_at
            FROM recipes WHERE id = ?
            ",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to get recipe")?;

        Ok(row.map(|row| Recipe {
            id: row.get("id"),
            author_id: row.get("author_id"),
            name: row.get("name"),
            text: row.get("text"),
            cooking_time: row.get("cooking_time"),
            image: row.get("image"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    /// Whether a recipe exists
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn recipe_exists(&self, recipe_id: i64) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?)")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
            .db_context("Failed to check recipe")
    }

    /// Short representation of one recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_recipe_summary(&self, recipe_id: i64) -> AppResult<Option<RecipeSummary>> {
        let row = sqlx::query("SELECT id, name, image, cooking_time FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get recipe")?;
        Ok(row.as_ref().map(row_to_summary))
    }

    /// Filtered recipe projections, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
    ) -> AppResult<Vec<RecipeView>> {
        let mut builder = recipe_view_query(viewer);
        builder.push(" WHERE 1 = 1");

        if !filter.tags.is_empty() {
            builder.push(
                " AND EXISTS(SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug IN (",
            );
            let mut slugs = builder.separated(", ");
            for slug in &filter.tags {
                slugs.push_bind(slug.clone());
            }
            slugs.push_unseparated("))");
        }
        if let Some(author_id) = filter.author {
            builder.push(" AND r.author_id = ").push_bind(author_id);
        }
        if let Some(viewer_id) = viewer {
            if filter.is_favorited {
                builder
                    .push(" AND EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                    .push_bind(viewer_id)
                    .push(")");
            }
            if filter.is_in_shopping_cart {
                builder
                    .push(" AND EXISTS(SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = ")
                    .push_bind(viewer_id)
                    .push(")");
            }
        }
        builder.push(" ORDER BY r.id DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to list recipes")?;
        self.assemble_views(&rows, viewer).await
    }

    /// One recipe projection
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn get_recipe_view(
        &self,
        recipe_id: i64,
        viewer: Option<i64>,
    ) -> AppResult<Option<RecipeView>> {
        let mut builder = recipe_view_query(viewer);
        builder.push(" WHERE r.id = ").push_bind(recipe_id);
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to get recipe")?;
        Ok(self.assemble_views(&rows, viewer).await?.into_iter().next())
    }

    /// Attach tags, ingredient lines, and authors to base rows
    ///
    /// Three batched queries regardless of how many rows there are.
    async fn assemble_views(
        &self,
        rows: &[SqliteRow],
        viewer: Option<i64>,
    ) -> AppResult<Vec<RecipeView>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<i64> = rows.iter().map(|row| row.get("id")).collect();
        let mut author_ids: Vec<i64> = rows.iter().map(|row| row.get("author_id")).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut tags = self.tags_for_recipes(&recipe_ids).await?;
        let mut lines = self.ingredient_lines_for_recipes(&recipe_ids).await?;
        let authors = self.profiles_by_ids(&author_ids, viewer).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let author_id: i64 = row.get("author_id");
                let author = authors
                    .get(&author_id)
                    .cloned()
                    .ok_or_else(|| AppError::internal(format!("Author {author_id} missing for recipe {id}")))?;
                Ok(RecipeView {
                    id,
                    tags: tags.remove(&id).unwrap_or_default(),
                    author,
                    ingredients: lines.remove(&id).unwrap_or_default(),
                    is_favorited: row.get("is_favorited"),
                    is_in_shopping_cart: row.get("is_in_shopping_cart"),
                    name: row.get("name"),
                    image: row.get("image"),
                    text: row.get("text"),
                    cooking_time: row.get("cooking_time"),
                })
            })
            .collect()
    }

    async fn tags_for_recipes(&self, recipe_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Tag>>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT rt.recipe_id, t.id, t.name, t.slug FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id IN ",
        );
        push_id_list(&mut builder, recipe_ids);
        builder.push(" ORDER BY t.name");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to load recipe tags")?;

        let mut grouped: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in &rows {
            grouped
                .entry(row.get("recipe_id"))
                .or_default()
                .push(row_to_tag(row));
        }
        Ok(grouped)
    }

    async fn ingredient_lines_for_recipes(
        &self,
        recipe_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<RecipeIngredientLine>>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount \
             FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id IN ",
        );
        push_id_list(&mut builder, recipe_ids);
        builder.push(" ORDER BY ri.id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to load recipe ingredients")?;

        let mut grouped: HashMap<i64, Vec<RecipeIngredientLine>> = HashMap::new();
        for row in &rows {
            grouped
                .entry(row.get("recipe_id"))
                .or_default()
                .push(RecipeIngredientLine {
                    id: row.get("id"),
                    name: row.get("name"),
                    measurement_unit: row.get("measurement_unit"),
                    amount: row.get("amount"),
                });
        }
        Ok(grouped)
    }
}

/// Base `SELECT` for projections with the viewer's favorite and cart flags
///
/// Anonymous viewers get constant `0` flags instead of existence subqueries.
fn recipe_view_query<'a>(viewer: Option<i64>) -> QueryBuilder<'a, Sqlite> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, ");
    match viewer {
        Some(viewer_id) => {
            builder
                .push("EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(viewer_id)
                .push(") AS is_favorited, ")
                .push("EXISTS(SELECT 1 FROM shopping_carts c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(viewer_id)
                .push(") AS is_in_shopping_cart");
        }
        None => {
            builder.push("0 AS is_favorited, 0 AS is_in_shopping_cart");
        }
    }
    builder.push(" FROM recipes r");
    builder
}

async fn insert_tag_links(
    tx: &mut TransactionGuard,
    recipe_id: i64,
    tag_ids: &[i64],
) -> AppResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    builder.push_values(tag_ids, |mut row, tag_id| {
        row.push_bind(recipe_id).push_bind(*tag_id);
    });
    builder
        .build()
        .execute(tx.executor()?)
        .await
        .db_context("Failed to link recipe tags")?;
    Ok(())
}

async fn insert_ingredient_lines(
    tx: &mut TransactionGuard,
    recipe_id: i64,
    ingredients: &[IngredientAmountInput],
) -> AppResult<()> {
    if ingredients.is_empty() {
        return Ok(());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    builder.push_values(ingredients, |mut row, line| {
        row.push_bind(recipe_id)
            .push_bind(line.id)
            .push_bind(line.amount);
    });
    builder
        .build()
        .execute(tx.executor()?)
        .await
        .db_context("Failed to insert recipe ingredients")?;
    Ok(())
}

pub(super) fn row_to_summary(row: &SqliteRow) -> RecipeSummary {
    RecipeSummary {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        cooking_time: row.get("cooking_time"),
    }
}
