// ABOUTME: Core types and constants for the Foodgram recipe sharing platform
// ABOUTME: Foundation crate with error handling, domain models, access policy, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

#![deny(unsafe_code)]

//! # Foodgram Core
//!
//! Foundation crate providing shared types for the Foodgram server. It holds no
//! I/O: the server crate owns persistence and HTTP, this crate owns the vocabulary.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the JSON error envelope
//! - **models**: users, tags, ingredients, recipes, and their read projections
//! - **permissions**: identities and the recipe action table
//! - **constants**: field limits, reserved names, and export settings

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models
pub mod models;

/// Identities, permission classes, and the recipe action table
pub mod permissions;

/// Application constants organized by domain
pub mod constants;
