// ABOUTME: Validates recipe create and partial-update payloads before any write
// ABOUTME: Checks tag and ingredient sets, scalar fields, and decodes the image
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Recipe payload validation
//!
//! Pure: catalog lookups happen before the call and arrive as [`KnownIds`], so
//! a rejected payload never touches the database. Checks run in a fixed order
//! and the first failure is reported with the offending field.
//!
//! In [`WriteMode::Update`] an absent field means "leave as is"; a supplied
//! field is validated exactly as on create.

use std::collections::HashSet;

use crate::constants::limits::{
    MAX_COOKING_TIME, MAX_INGREDIENT_AMOUNT, MIN_COOKING_TIME, MIN_INGREDIENT_AMOUNT,
    RECIPE_NAME_MAX_LEN,
};
use crate::database::RecipeChanges;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{IngredientAmountInput, RecipeWriteRequest};
use crate::permissions::WriteMode;
use crate::services::images::{decode_image, DecodedImage};

/// Ids from the payload that exist in the catalog
#[derive(Debug, Clone, Default)]
pub struct KnownIds {
    /// Existing tag ids
    pub tags: HashSet<i64>,
    /// Existing ingredient ids
    pub ingredients: HashSet<i64>,
}

/// Tag and ingredient ids a payload references, for the catalog lookup
#[must_use]
pub fn referenced_ids(request: &RecipeWriteRequest) -> (Vec<i64>, Vec<i64>) {
    let tags = request.tags.clone().unwrap_or_default();
    let ingredients = request
        .ingredients
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|line| line.id)
        .collect();
    (tags, ingredients)
}

/// A payload that passed validation
#[derive(Debug)]
pub struct ValidatedRecipe {
    /// Field and set changes; `image` is filled in once the decoded image is stored
    pub changes: RecipeChanges,
    /// Decoded image, when one was supplied
    pub image: Option<DecodedImage>,
}

/// Validate a recipe payload
///
/// # Errors
///
/// Returns a field-tagged `ValidationError` for the first failing check
pub fn validate_recipe(
    request: RecipeWriteRequest,
    mode: WriteMode,
    known: &KnownIds,
) -> AppResult<ValidatedRecipe> {
    let RecipeWriteRequest {
        tags,
        ingredients,
        name,
        text,
        cooking_time,
        image,
    } = request;

    let tag_ids = required("tags", tags, mode)?
        .map(|tags| validate_tags(tags, known))
        .transpose()?;
    let ingredients = required("ingredients", ingredients, mode)?
        .map(|lines| validate_ingredients(lines, known))
        .transpose()?;
    let name = required("name", name, mode)?
        .map(validate_name)
        .transpose()?;
    let text = required("text", text, mode)?
        .map(validate_text)
        .transpose()?;
    let cooking_time = required("cooking_time", cooking_time, mode)?
        .map(validate_cooking_time)
        .transpose()?;
    let image = required("image", image, mode)?
        .map(|data| decode_image("image", &data))
        .transpose()?;

    Ok(ValidatedRecipe {
        changes: RecipeChanges {
            name,
            text,
            cooking_time,
            image: None,
            tag_ids,
            ingredients,
        },
        image,
    })
}

/// Absent fields fail on create and pass through as `None` on update
fn required<T>(field: &str, value: Option<T>, mode: WriteMode) -> AppResult<Option<T>> {
    match (value, mode) {
        (None, WriteMode::Create) => Err(AppError::field_with_code(
            ErrorCode::MissingRequiredField,
            field,
            "This field is required.",
        )),
        (value, _) => Ok(value),
    }
}

fn validate_tags(tags: Vec<i64>, known: &KnownIds) -> AppResult<Vec<i64>> {
    if tags.is_empty() {
        return Err(AppError::field("tags", "At least one tag is required."));
    }
    let mut seen = HashSet::with_capacity(tags.len());
    if !tags.iter().all(|id| seen.insert(*id)) {
        return Err(AppError::field("tags", "Tags must not repeat."));
    }
    if let Some(unknown) = tags.iter().find(|id| !known.tags.contains(id)) {
        return Err(AppError::field("tags", format!("Tag {unknown} does not exist.")));
    }
    Ok(tags)
}

fn validate_ingredients(
    lines: Vec<IngredientAmountInput>,
    known: &KnownIds,
) -> AppResult<Vec<IngredientAmountInput>> {
    if lines.is_empty() {
        return Err(AppError::field(
            "ingredients",
            "At least one ingredient is required.",
        ));
    }
    let mut seen = HashSet::with_capacity(lines.len());
    for line in &lines {
        if !known.ingredients.contains(&line.id) {
            return Err(AppError::field(
                "ingredients",
                format!("Ingredient {} does not exist.", line.id),
            ));
        }
        if !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&line.amount) {
            return Err(AppError::field_with_code(
                ErrorCode::ValueOutOfRange,
                "ingredients",
                format!(
                    "Amount must be between {MIN_INGREDIENT_AMOUNT} and {MAX_INGREDIENT_AMOUNT}."
                ),
            ));
        }
        if !seen.insert(line.id) {
            return Err(AppError::field(
                "ingredients",
                format!("Ingredient {} is listed more than once.", line.id),
            ));
        }
    }
    Ok(lines)
}

fn validate_name(name: String) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::field("name", "This field may not be blank."));
    }
    if trimmed.chars().count() > RECIPE_NAME_MAX_LEN {
        return Err(AppError::field(
            "name",
            format!("Ensure this field has no more than {RECIPE_NAME_MAX_LEN} characters."),
        ));
    }
    Ok(trimmed.to_owned())
}

fn validate_text(text: String) -> AppResult<String> {
    if text.trim().is_empty() {
        return Err(AppError::field("text", "This field may not be blank."));
    }
    Ok(text)
}

fn validate_cooking_time(minutes: i64) -> AppResult<i64> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&minutes) {
        return Err(AppError::field_with_code(
            ErrorCode::ValueOutOfRange,
            "cooking_time",
            format!("Cooking time must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME} minutes."),
        ));
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn known() -> KnownIds {
        KnownIds {
            tags: [1, 2].into_iter().collect(),
            ingredients: [10, 11].into_iter().collect(),
        }
    }

    fn line(id: i64, amount: i64) -> IngredientAmountInput {
        IngredientAmountInput { id, amount }
    }

    fn valid_request() -> RecipeWriteRequest {
        RecipeWriteRequest {
            tags: Some(vec![1, 2]),
            ingredients: Some(vec![line(10, 200), line(11, 1)]),
            name: Some("Pancakes".into()),
            text: Some("Mix and fry.".into()),
            cooking_time: Some(20),
            image: Some(PNG_PIXEL.into()),
        }
    }

    fn assert_field_error(request: RecipeWriteRequest, mode: WriteMode, field: &str) {
        let err = validate_recipe(request, mode, &known()).unwrap_err();
        assert!(err.has_field(field), "expected error on {field}, got {err:?}");
    }

    #[test]
    fn test_valid_create() {
        let validated = validate_recipe(valid_request(), WriteMode::Create, &known()).unwrap();
        assert_eq!(validated.changes.tag_ids, Some(vec![1, 2]));
        assert_eq!(validated.changes.ingredients.as_ref().map(Vec::len), Some(2));
        assert!(validated.image.is_some());
        assert!(validated.changes.image.is_none());
    }

    #[test]
    fn test_empty_and_duplicate_tags() {
        let mut request = valid_request();
        request.tags = Some(vec![]);
        assert_field_error(request, WriteMode::Create, "tags");

        let mut request = valid_request();
        request.tags = Some(vec![1, 1]);
        assert_field_error(request, WriteMode::Create, "tags");
    }

    #[test]
    fn test_unknown_tag() {
        let mut request = valid_request();
        request.tags = Some(vec![1, 99]);
        assert_field_error(request, WriteMode::Create, "tags");
    }

    #[test]
    fn test_ingredient_line_rules() {
        let mut request = valid_request();
        request.ingredients = Some(vec![]);
        assert_field_error(request, WriteMode::Create, "ingredients");

        let mut request = valid_request();
        request.ingredients = Some(vec![line(99, 1)]);
        assert_field_error(request, WriteMode::Create, "ingredients");

        for amount in [0, -5, MAX_INGREDIENT_AMOUNT + 1, i64::MAX / 2 + 1] {
            let mut request = valid_request();
            request.ingredients = Some(vec![line(10, amount)]);
            let err = validate_recipe(request, WriteMode::Create, &known()).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        }

        let mut request = valid_request();
        request.ingredients = Some(vec![line(10, 1), line(10, 2)]);
        assert_field_error(request, WriteMode::Create, "ingredients");
    }

    #[test]
    fn test_create_requires_image() {
        let mut request = valid_request();
        request.image = None;
        let err = validate_recipe(request, WriteMode::Create, &known()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert!(err.has_field("image"));

        let mut request = valid_request();
        request.image = Some(String::new());
        assert_field_error(request, WriteMode::Create, "image");
    }

    #[test]
    fn test_scalar_fields() {
        let mut request = valid_request();
        request.name = Some("   ".into());
        assert_field_error(request, WriteMode::Create, "name");

        let mut request = valid_request();
        request.name = Some("x".repeat(RECIPE_NAME_MAX_LEN + 1));
        assert_field_error(request, WriteMode::Create, "name");

        let mut request = valid_request();
        request.text = Some(String::new());
        assert_field_error(request, WriteMode::Create, "text");

        for minutes in [0, MAX_COOKING_TIME + 1] {
            let mut request = valid_request();
            request.cooking_time = Some(minutes);
            assert_field_error(request, WriteMode::Create, "cooking_time");
        }

        let mut request = valid_request();
        request.cooking_time = Some(MAX_COOKING_TIME);
        request.ingredients = Some(vec![line(10, MAX_INGREDIENT_AMOUNT)]);
        assert!(validate_recipe(request, WriteMode::Create, &known()).is_ok());
    }

    #[test]
    fn test_update_leaves_absent_fields_untouched() {
        let request = RecipeWriteRequest {
            tags: Some(vec![2]),
            ..RecipeWriteRequest::default()
        };
        let validated = validate_recipe(request, WriteMode::Update, &known()).unwrap();
        assert_eq!(validated.changes.tag_ids, Some(vec![2]));
        assert!(validated.changes.ingredients.is_none());
        assert!(validated.changes.name.is_none());
        assert!(validated.image.is_none());
    }

    #[test]
    fn test_update_still_rejects_supplied_empty_sets() {
        let request = RecipeWriteRequest {
            ingredients: Some(vec![]),
            ..RecipeWriteRequest::default()
        };
        assert_field_error(request, WriteMode::Update, "ingredients");
    }

    #[test]
    fn test_referenced_ids() {
        let (tags, ingredients) = referenced_ids(&valid_request());
        assert_eq!(tags, vec![1, 2]);
        assert_eq!(ingredients, vec![10, 11]);
    }
}
