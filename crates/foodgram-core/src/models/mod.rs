// ABOUTME: Core data models for users, tags, ingredients, recipes, and per-user relations
// ABOUTME: Wire payloads and read projections shared by the server crate and its tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Domain models
//!
//! Entity rows (`User`, `Tag`, `Ingredient`, `Recipe`) mirror the relational schema.
//! Projection types (`RecipeView`, `RecipeSummary`, `UserProfile`, `Subscription`)
//! are what read consumers receive; none of them carry credentials.

mod recipe;
mod relation;
mod user;

pub use recipe::{
    Ingredient, IngredientAmountInput, Recipe, RecipeIngredientLine, RecipeSummary, RecipeView,
    RecipeWriteRequest, ShoppingListItem, Tag,
};
pub use relation::RelationKind;
pub use user::{AvatarResponse, NewUser, RegisterUserRequest, Subscription, User, UserProfile};
