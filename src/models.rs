// ABOUTME: Domain models re-exported from foodgram-core
// ABOUTME: Users, recipes, catalog entries, and their API projections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

pub use foodgram_core::models::*;
