// ABOUTME: Short link redirect handler
// ABOUTME: Resolves /s/{id}/ to the recipe page of the web frontend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::parse_id;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Short link routes
pub struct ShortLinkRoutes;

impl ShortLinkRoutes {
    /// Create short link routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/s/:id/", get(Self::handle_redirect))
            .with_state(resources)
    }

    /// Handle GET /s/:id/ with a 302 to the recipe page
    async fn handle_redirect(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe_id = parse_id(&id, "Recipe")?;
        if !resources.database.recipe_exists(recipe_id).await? {
            return Err(AppError::not_found("Recipe"));
        }
        let location = HeaderValue::from_str(&format!("/recipes/{recipe_id}/"))
            .map_err(|e| AppError::internal(format!("Invalid redirect location: {e}")))?;
        Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
    }
}
