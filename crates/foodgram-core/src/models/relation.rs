// ABOUTME: Per-user recipe relation kinds (favorites and shopping cart)
// ABOUTME: One enum drives table names and user-facing messages for both toggles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use serde::{Deserialize, Serialize};

/// A (user, recipe) relation stored in its own table with a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Recipe marked as favorite
    Favorite,
    /// Recipe added to the shopping cart
    ShoppingCart,
}

impl RelationKind {
    /// Backing table
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping_carts",
        }
    }

    /// Stable name for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    /// Message for a duplicate add
    #[must_use]
    pub const fn already_present_message(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is already in favorites",
            Self::ShoppingCart => "Recipe is already in the shopping cart",
        }
    }

    /// Message for removing a relation that does not exist
    #[must_use]
    pub const fn not_present_message(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is not in your favorites",
            Self::ShoppingCart => "Recipe is not in your shopping cart",
        }
    }
}
