// ABOUTME: Configuration module for server settings loaded from the environment
// ABOUTME: Groups database, auth, media, CORS, and HTTP settings under ServerConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Configuration for the Foodgram server
//!
//! - **Database**: connection URL and pool sizing
//! - **Environment**: everything else, read from environment variables

/// Database URL parsing and pool configuration
pub mod database;
/// Server configuration from environment variables
pub mod environment;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{AuthConfig, CorsConfig, MediaConfig, ServerConfig};
