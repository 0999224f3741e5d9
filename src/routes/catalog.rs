// ABOUTME: Tag and ingredient catalog route handlers
// ABOUTME: Read-only listing and lookup, with a name prefix filter for ingredients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::parse_id;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Query parameters for ingredient listing
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Tag and ingredient routes
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags/", get(Self::handle_list_tags))
            .route("/api/tags/:id/", get(Self::handle_get_tag))
            .route("/api/ingredients/", get(Self::handle_list_ingredients))
            .route("/api/ingredients/:id/", get(Self::handle_get_ingredient))
            .with_state(resources)
    }

    async fn handle_list_tags(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let tags = resources.database.list_tags().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    async fn handle_get_tag(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let tag_id = parse_id(&id, "Tag")?;
        let tag = resources
            .database
            .get_tag(tag_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag"))?;
        Ok((StatusCode::OK, Json(tag)).into_response())
    }

    /// Handle GET /api/ingredients/?name=<prefix>
    async fn handle_list_ingredients(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<IngredientQuery>,
    ) -> Result<Response, AppError> {
        let prefix = query.name.as_deref().filter(|s| !s.trim().is_empty());
        let ingredients = resources.database.list_ingredients(prefix).await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    async fn handle_get_ingredient(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(&id, "Ingredient")?;
        let ingredient = resources
            .database
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ingredient"))?;
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }
}
