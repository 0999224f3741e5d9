// ABOUTME: Identity and recipe action policy re-exported from foodgram-core
// ABOUTME: Handlers resolve an Identity and consult RecipeAction::policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

pub use foodgram_core::permissions::*;
