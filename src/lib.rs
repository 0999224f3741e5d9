// ABOUTME: Main library entry point for the Foodgram recipe sharing API
// ABOUTME: Recipes, tags, ingredients, favorites, shopping cart, follows, and short links
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

#![deny(unsafe_code)]

//! # Foodgram Server
//!
//! A recipe sharing backend. Users publish recipes built from a shared tag and
//! ingredient catalog, keep favorites and a shopping cart, follow authors, and
//! export an aggregated shopping list.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers resolving the request identity
//! - **Services**: validation, image handling, and the recipe action table
//! - **Database**: `SQLite` persistence and read projections
//! - **Config**: environment-driven server configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use foodgram_server::config::ServerConfig;
//! use foodgram_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Foodgram configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Token issuing, validation, and password hashing
pub mod auth;

/// Environment configuration
pub mod config;

/// Domain constants and limits
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Error types
pub mod errors;

/// Structured logging
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Domain models
pub mod models;

/// Access policy for recipe actions
pub mod permissions;

/// Shared request state
pub mod resources;

/// HTTP routes
pub mod routes;

/// Server lifecycle
pub mod server;

/// Business logic between routes and the database
pub mod services;
