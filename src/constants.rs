// ABOUTME: Domain constants re-exported from foodgram-core
// ABOUTME: Field limits, media locations, and shopping list formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

pub use foodgram_core::constants::*;
