// ABOUTME: Recipe route handlers: CRUD, favorites, shopping cart, export, and short links
// ABOUTME: Each handler resolves the identity and delegates to the recipe service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Recipe routes
//!
//! Reads are public; every other endpoint is gated through the recipe action
//! table inside the service layer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{parse_id, ApiJson};
use crate::constants::shopping_list::FILE_NAME;
use crate::database::RecipeFilter;
use crate::errors::{AppError, AppResult};
use crate::models::RecipeWriteRequest;
use crate::permissions::RecipeAction;
use crate::resources::ServerResources;

/// Response for GET /api/recipes/{id}/get-link/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    /// Absolute short URL
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Build a list filter from raw query pairs
///
/// `tags` may repeat. Relation flags accept `1` or `true`.
///
/// # Errors
///
/// Returns a field `ValidationError` for a non-numeric `author`
pub fn parse_recipe_filter(pairs: &[(String, String)]) -> AppResult<RecipeFilter> {
    let mut filter = RecipeFilter::default();
    for (key, value) in pairs {
        match key.as_str() {
            "tags" => {
                if !value.is_empty() && !filter.tags.contains(value) {
                    filter.tags.push(value.clone());
                }
            }
            "author" => {
                let author = value
                    .parse::<i64>()
                    .map_err(|_| AppError::field("author", "A valid integer is required."))?;
                filter.author = Some(author);
            }
            "is_favorited" => filter.is_favorited = is_truthy(value),
            "is_in_shopping_cart" => filter.is_in_shopping_cart = is_truthy(value),
            _ => {}
        }
    }
    Ok(filter)
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes/",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/download_shopping_cart/",
                get(Self::handle_download_shopping_cart),
            )
            .route(
                "/api/recipes/:id/",
                get(Self::handle_retrieve)
                    .patch(Self::handle_update)
                    .delete(Self::handle_destroy),
            )
            .route(
                "/api/recipes/:id/favorite/",
                post(Self::handle_add_favorite).delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart/",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .route("/api/recipes/:id/get-link/", get(Self::handle_get_link))
            .with_state(resources)
    }

    /// Handle GET /api/recipes/
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(pairs): Query<Vec<(String, String)>>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let filter = parse_recipe_filter(&pairs)?;
        let recipes = resources.recipes().list(&identity, &filter).await?;
        Ok((StatusCode::OK, Json(recipes)).into_response())
    }

    /// Handle GET /api/recipes/:id/
    async fn handle_retrieve(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        let recipe = resources.recipes().retrieve(&identity, recipe_id).await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    /// Handle POST /api/recipes/
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<RecipeWriteRequest>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let recipe = resources.recipes().create(&identity, body).await?;
        Ok((StatusCode::CREATED, Json(recipe)).into_response())
    }

    /// Handle PATCH /api/recipes/:id/
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        ApiJson(body): ApiJson<RecipeWriteRequest>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        let recipe = resources.recipes().update(&identity, recipe_id, body).await?;
        Ok((StatusCode::OK, Json(recipe)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/
    async fn handle_destroy(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        resources.recipes().destroy(&identity, recipe_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::toggle(&resources, &headers, &id, RecipeAction::AddFavorite).await
    }

    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::toggle(&resources, &headers, &id, RecipeAction::RemoveFavorite).await
    }

    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::toggle(&resources, &headers, &id, RecipeAction::AddToCart).await
    }

    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::toggle(&resources, &headers, &id, RecipeAction::RemoveFromCart).await
    }

    /// Shared body of the favorite and cart endpoints
    async fn toggle(
        resources: &ServerResources,
        headers: &HeaderMap,
        id: &str,
        action: RecipeAction,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(headers).await?;
        let recipe_id = parse_id(id, "Recipe")?;
        match resources
            .recipes()
            .toggle_relation(action, &identity, recipe_id)
            .await?
        {
            Some(summary) => Ok((StatusCode::CREATED, Json(summary)).into_response()),
            None => Ok(StatusCode::NO_CONTENT.into_response()),
        }
    }

    /// Handle GET /api/recipes/download_shopping_cart/
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let body = resources.recipes().shopping_list(&identity).await?;

        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{FILE_NAME}\""))
            .map_err(|e| AppError::internal(format!("Invalid Content-Disposition: {e}")))?;
        Ok((
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response())
    }

    /// Handle GET /api/recipes/:id/get-link/
    async fn handle_get_link(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let recipe_id = parse_id(&id, "Recipe")?;
        let short_link = resources
            .recipes()
            .short_link(&identity, recipe_id, &resources.config.public_base_url)
            .await?;
        Ok((StatusCode::OK, Json(ShortLinkResponse { short_link })).into_response())
    }
}
