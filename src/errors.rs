// ABOUTME: Error types re-exported from foodgram-core
// ABOUTME: Gives server modules a crate-local path to AppError and ErrorCode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

pub use foodgram_core::errors::*;
