// ABOUTME: Recipe, tag, and ingredient models with write payloads and read projections
// ABOUTME: Join rows resolve to (ingredient id, name, unit, amount) lines in projections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Recipe tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Primary key
    pub id: i64,
    /// Display name, unique
    pub name: String,
    /// URL slug, unique
    pub slug: String,
}

/// Ingredient catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Primary key
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unit the amount is expressed in (g, ml, pcs, ...)
    pub measurement_unit: String,
}

/// Stored recipe row
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Primary key
    pub id: i64,
    /// Author user id
    pub author_id: i64,
    /// Title
    pub name: String,
    /// Description / method
    pub text: String,
    /// Minutes, at least 1
    pub cooking_time: i64,
    /// Image URL under the media prefix
    pub image: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update
    pub updated_at: DateTime<Utc>,
}

/// One ingredient line of a write payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmountInput {
    /// Ingredient id
    pub id: i64,
    /// Amount in the ingredient's measurement unit
    pub amount: i64,
}

/// Create / partial-update payload
///
/// Every field is optional on the wire; the validator decides which are required
/// for the requested operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeWriteRequest {
    /// Tag ids
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientAmountInput>>,
    /// Title
    #[serde(default)]
    pub name: Option<String>,
    /// Description / method
    #[serde(default)]
    pub text: Option<String>,
    /// Minutes
    #[serde(default)]
    pub cooking_time: Option<i64>,
    /// Base64 image, optionally as a `data:` URI
    #[serde(default)]
    pub image: Option<String>,
}

/// Ingredient line resolved through the join table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientLine {
    /// Ingredient id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Ingredient unit
    pub measurement_unit: String,
    /// Amount within this recipe
    pub amount: i64,
}

/// Full recipe projection for list and detail reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeView {
    /// Primary key
    pub id: i64,
    /// Tags
    pub tags: Vec<Tag>,
    /// Author profile
    pub author: UserProfile,
    /// Ingredient lines
    pub ingredients: Vec<RecipeIngredientLine>,
    /// Requester has this recipe in favorites
    pub is_favorited: bool,
    /// Requester has this recipe in the shopping cart
    pub is_in_shopping_cart: bool,
    /// Title
    pub name: String,
    /// Image URL
    pub image: String,
    /// Description / method
    pub text: String,
    /// Minutes
    pub cooking_time: i64,
}

/// Short recipe representation used by favorites, cart, and subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    /// Primary key
    pub id: i64,
    /// Title
    pub name: String,
    /// Image URL
    pub image: String,
    /// Minutes
    pub cooking_time: i64,
}

/// One aggregated shopping list group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,
    /// Ingredient unit
    pub measurement_unit: String,
    /// Sum of amounts across every recipe in the cart
    pub total_amount: i64,
}
