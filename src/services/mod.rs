// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Validation, image handling, recipe orchestration, accounts, and list export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Domain service layer
//!
//! Route handlers parse the request and resolve the identity; everything
//! after that lives here so the same rules apply to the HTTP API and the
//! admin tool.

/// Tag and ingredient catalog loading
pub mod catalog;

/// Base64 image decoding and media storage
pub mod images;

/// Recipe payload validation
pub mod recipe_validator;

/// Recipe operations behind the action policy table
pub mod recipes;

/// Plain-text shopping list rendering
pub mod shopping_list;

/// Accounts, authentication flows, and follows
pub mod users;

pub use catalog::{load_ingredients, load_tags, LoadReport, TagSeed};
pub use images::{DecodedImage, ImageFormat, MediaStore};
pub use recipes::RecipeService;
pub use users::UserService;
