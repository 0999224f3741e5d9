// ABOUTME: Shopping list aggregation over the user's cart
// ABOUTME: Sums amounts per (ingredient name, unit) in a single grouped query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use sqlx::Row;

use super::Database;
use crate::errors::{AppResult, DatabaseResultExt};
use crate::models::ShoppingListItem;

impl Database {
    /// Aggregated ingredients for every recipe in the user's cart
    ///
    /// Groups by ingredient name and unit, so the same name in different units
    /// yields separate lines. Ordered by name, then unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn shopping_list(&self, user_id: i64) -> AppResult<Vec<ShoppingListItem>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
            FROM shopping_carts sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = ?
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to build shopping list")?;

        Ok(rows
            .iter()
            .map(|row| ShoppingListItem {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                total_amount: row.get("total_amount"),
            })
            .collect())
    }
}
