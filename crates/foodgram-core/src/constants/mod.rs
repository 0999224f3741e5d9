// ABOUTME: Domain constants for field limits, reserved names, and defaults
// ABOUTME: Shared by request validation, database schema checks, and the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Application constants organized by domain

/// Maximum field lengths (characters)
pub mod limits {
    /// Tag name and slug
    pub const TAG_NAME_MAX_LEN: usize = 32;
    /// Ingredient name
    pub const INGREDIENT_NAME_MAX_LEN: usize = 128;
    /// Ingredient measurement unit
    pub const MEASUREMENT_UNIT_MAX_LEN: usize = 64;
    /// Recipe name
    pub const RECIPE_NAME_MAX_LEN: usize = 256;
    /// Username, first and last name
    pub const USER_NAME_MAX_LEN: usize = 150;
    /// Email address
    pub const EMAIL_MAX_LEN: usize = 254;
    /// Minimum cooking time in minutes
    pub const MIN_COOKING_TIME: i64 = 1;
    /// Maximum cooking time in minutes
    pub const MAX_COOKING_TIME: i64 = 32_000;
    /// Minimum ingredient amount within a recipe
    pub const MIN_INGREDIENT_AMOUNT: i64 = 1;
    /// Maximum ingredient amount within a recipe; keeps shopping list sums far from overflow
    pub const MAX_INGREDIENT_AMOUNT: i64 = 32_000;
}

/// User account rules
pub mod users {
    /// Usernames that collide with routes under `/api/users/`
    pub const RESERVED_USERNAMES: &[&str] = &["me"];
    /// Allowed username characters (letters, digits and `.@+-_`)
    pub const USERNAME_PATTERN: &str = r"^[\w.@+-]+$";
}

/// Media kinds, used as sub-directories of the media root
pub mod media {
    /// Recipe images
    pub const RECIPE_IMAGES: &str = "recipes/images";
    /// User avatars
    pub const AVATARS: &str = "users";
}

/// Shopping list export
pub mod shopping_list {
    /// First line of the exported text file
    pub const HEADER: &str = "Shopping list:";
    /// Download file name
    pub const FILE_NAME: &str = "shopping_cart.txt";
}

/// Service identification
pub mod service_names {
    /// Default service name used in structured logs
    pub const FOODGRAM_SERVER: &str = "foodgram-server";
}
