// ABOUTME: Catalog loading for tags (JSON) and ingredients (CSV)
// ABOUTME: Loads are idempotent; existing entries are left untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::time::Instant;

use serde::Deserialize;
use tracing::warn;

use crate::constants::limits::{INGREDIENT_NAME_MAX_LEN, MEASUREMENT_UNIT_MAX_LEN, TAG_NAME_MAX_LEN};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;

/// One tag entry of a tags JSON file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagSeed {
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
}

/// One parsed ingredient line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSeed {
    /// Display name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

/// Outcome of a catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries inserted
    pub created: usize,
    /// Entries already present
    pub existing: usize,
    /// Lines that could not be parsed
    pub skipped: usize,
}

/// Parse a tags file: `[{"name": ..., "slug": ...}, ...]`
///
/// # Errors
///
/// Returns `InvalidInput` if the document is not a list of tags
pub fn parse_tags_json(raw: &str) -> AppResult<Vec<TagSeed>> {
    let tags: Vec<TagSeed> = serde_json::from_str(raw)
        .map_err(|e| AppError::invalid_input(format!("Invalid tags JSON: {e}")))?;
    for tag in &tags {
        if tag.name.trim().is_empty() || tag.slug.trim().is_empty() {
            return Err(AppError::invalid_input("Tag name and slug must not be empty"));
        }
        if tag.name.chars().count() > TAG_NAME_MAX_LEN || tag.slug.chars().count() > TAG_NAME_MAX_LEN {
            return Err(AppError::invalid_input(format!(
                "Tag {} exceeds {TAG_NAME_MAX_LEN} characters",
                tag.slug
            )));
        }
    }
    Ok(tags)
}

/// Parse an ingredients file with one `name,measurement_unit` per line
///
/// The unit is taken after the last comma so names may contain commas.
/// Blank lines are ignored; malformed lines are counted and logged.
#[must_use]
pub fn parse_ingredients_csv(raw: &str) -> (Vec<IngredientSeed>, usize) {
    let mut seeds = Vec::new();
    let mut skipped = 0;
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_ingredient_line(line) {
            Some(seed) => seeds.push(seed),
            None => {
                warn!(line = number + 1, content = line, "Skipping malformed ingredient line");
                skipped += 1;
            }
        }
    }
    (seeds, skipped)
}

fn parse_ingredient_line(line: &str) -> Option<IngredientSeed> {
    let (name, unit) = line.rsplit_once(',')?;
    let name = unquote(name);
    let unit = unquote(unit);
    if name.is_empty()
        || unit.is_empty()
        || name.chars().count() > INGREDIENT_NAME_MAX_LEN
        || unit.chars().count() > MEASUREMENT_UNIT_MAX_LEN
    {
        return None;
    }
    Some(IngredientSeed {
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    })
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map_or(field, str::trim)
}

/// Insert tags that are not present yet
///
/// # Errors
///
/// Returns a database error if an insert fails
pub async fn load_tags(database: &Database, tags: &[TagSeed]) -> AppResult<LoadReport> {
    let started = Instant::now();
    let mut report = LoadReport::default();
    for tag in tags {
        if database.create_tag(tag.name.trim(), tag.slug.trim()).await? {
            report.created += 1;
        } else {
            report.existing += 1;
        }
    }
    AppLogger::log_catalog_load("tags", report.created, report.existing, 0, started.elapsed());
    Ok(report)
}

/// Insert ingredients that are not present yet
///
/// # Errors
///
/// Returns a database error if an insert fails
pub async fn load_ingredients(database: &Database, raw_csv: &str) -> AppResult<LoadReport> {
    let started = Instant::now();
    let (seeds, skipped) = parse_ingredients_csv(raw_csv);
    let mut report = LoadReport {
        skipped,
        ..LoadReport::default()
    };
    for seed in &seeds {
        if database
            .create_ingredient(&seed.name, &seed.measurement_unit)
            .await?
        {
            report.created += 1;
        } else {
            report.existing += 1;
        }
    }
    AppLogger::log_catalog_load(
        "ingredients",
        report.created,
        report.existing,
        report.skipped,
        started.elapsed(),
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_json() {
        let tags = parse_tags_json(r#"[{"name": "Breakfast", "slug": "breakfast"}]"#).unwrap();
        assert_eq!(
            tags,
            vec![TagSeed {
                name: "Breakfast".into(),
                slug: "breakfast".into()
            }]
        );
        assert!(parse_tags_json(r#"{"name": "x"}"#).is_err());
        assert!(parse_tags_json(r#"[{"name": " ", "slug": "x"}]"#).is_err());
    }

    #[test]
    fn test_parse_ingredients_csv_skips_malformed_lines() {
        let raw = "flour,g\n\nno unit here\n\"salt, sea\",pinch\n,kg\nmilk,ml\n";
        let (seeds, skipped) = parse_ingredients_csv(raw);
        assert_eq!(skipped, 2);
        let names: Vec<&str> = seeds.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "salt, sea", "milk"]);
        assert_eq!(seeds[1].measurement_unit, "pinch");
    }
}
