// ABOUTME: User account model, registration payload, and public profile projections
// ABOUTME: Keeps password hashes out of every serializable type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecipeSummary;

/// Stored user account
///
/// Deliberately not `Serialize`: use [`UserProfile`] for anything leaving the server.
#[derive(Debug, Clone)]
pub struct User {
    /// Primary key
    pub id: i64,
    /// Login identifier, unique
    pub email: String,
    /// Public handle, unique
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Avatar URL under the media prefix
    pub avatar: Option<String>,
    /// Administrative privilege
    pub is_staff: bool,
    /// Bumped on logout; tokens carrying an older version are rejected
    pub token_version: i64,
    /// Registration time
    pub date_joined: DateTime<Utc>,
}

/// Validated data for inserting a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login identifier
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Administrative privilege
    pub is_staff: bool,
}

/// Registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Username
    #[serde(default)]
    pub username: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

/// Public user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Email address
    pub email: String,
    /// Primary key
    pub id: i64,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the requester follows this user
    pub is_subscribed: bool,
    /// Avatar URL
    pub avatar: Option<String>,
}

/// Avatar update response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    /// Avatar URL
    pub avatar: Option<String>,
}

/// A followed author together with a slice of their recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Author profile (`is_subscribed` is always true here)
    #[serde(flatten)]
    pub author: UserProfile,
    /// Author recipes, newest first, optionally truncated
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by the author, ignoring truncation
    pub recipes_count: i64,
}
