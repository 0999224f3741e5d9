// ABOUTME: Renders aggregated shopping list groups as a plain-text download
// ABOUTME: One "name - total, unit" line per group under a fixed header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::fmt::Write as _;

use crate::constants::shopping_list::HEADER;
use crate::models::ShoppingListItem;

/// Render the shopping list text
///
/// Groups are written in the order given; the database returns them sorted by
/// name, then unit.
#[must_use]
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut text = String::with_capacity(HEADER.len() + 1 + items.len() * 32);
    text.push_str(HEADER);
    text.push('\n');
    for item in items {
        // Writing into a String cannot fail
        let _ = writeln!(
            text,
            "{} - {}, {}",
            item.name, item.total_amount, item.measurement_unit
        );
    }
    text
}
