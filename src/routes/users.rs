// ABOUTME: User route handlers: registration, profiles, password, avatar, and subscriptions
// ABOUTME: Thin handlers that resolve the identity and delegate to the user service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! User routes
//!
//! Registration and profile reads are public. Everything under `me`, password
//! changes, and follows require an authenticated identity.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::{parse_id, parse_recipes_limit, ApiJson};
use crate::errors::AppError;
use crate::models::RegisterUserRequest;
use crate::resources::ServerResources;

/// Request body for POST /api/users/set_password/
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetPasswordRequest {
    /// Password being replaced
    #[serde(default)]
    pub current_password: String,
    /// Replacement password
    #[serde(default)]
    pub new_password: String,
}

/// Request body for PUT /api/users/me/avatar/
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarRequest {
    /// Base64 image, optionally as a `data:` URI
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Query parameters for subscription endpoints
#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitQuery {
    /// Maximum recipe previews per author
    pub recipes_limit: Option<String>,
}

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/users/",
                get(Self::handle_list).post(Self::handle_register),
            )
            .route("/api/users/me/", get(Self::handle_me))
            .route(
                "/api/users/me/avatar/",
                put(Self::handle_set_avatar).delete(Self::handle_delete_avatar),
            )
            .route("/api/users/set_password/", post(Self::handle_set_password))
            .route("/api/users/subscriptions/", get(Self::handle_subscriptions))
            .route("/api/users/:id/", get(Self::handle_profile))
            .route(
                "/api/users/:id/subscribe/",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(resources)
    }

    /// Handle GET /api/users/
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let users = resources.users().list(&identity).await?;
        Ok((StatusCode::OK, Json(users)).into_response())
    }

    /// Handle POST /api/users/
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(body): ApiJson<RegisterUserRequest>,
    ) -> Result<Response, AppError> {
        let user = resources.users().register(body).await?;
        Ok((StatusCode::CREATED, Json(user)).into_response())
    }

    /// Handle GET /api/users/me/
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let user = resources.users().me(&identity).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle GET /api/users/:id/
    async fn handle_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let user_id = parse_id(&id, "User")?;
        let user = resources.users().profile(&identity, user_id).await?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }

    /// Handle POST /api/users/set_password/
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        resources
            .users()
            .set_password(&identity, &body.current_password, &body.new_password)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle PUT /api/users/me/avatar/
    async fn handle_set_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        ApiJson(body): ApiJson<AvatarRequest>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let avatar = resources
            .users()
            .set_avatar(&identity, body.avatar.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(avatar)).into_response())
    }

    /// Handle DELETE /api/users/me/avatar/
    async fn handle_delete_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        resources.users().delete_avatar(&identity).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/subscriptions/
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<RecipesLimitQuery>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
        let subscriptions = resources.users().subscriptions(&identity, limit).await?;
        Ok((StatusCode::OK, Json(subscriptions)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe/
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<RecipesLimitQuery>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let author_id = parse_id(&id, "User")?;
        let limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
        let subscription = resources
            .users()
            .subscribe(&identity, author_id, limit)
            .await?;
        Ok((StatusCode::CREATED, Json(subscription)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe/
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        let author_id = parse_id(&id, "User")?;
        resources.users().unsubscribe(&identity, author_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
