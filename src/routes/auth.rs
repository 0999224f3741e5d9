// ABOUTME: Token login and logout route handlers
// ABOUTME: Exchanges email and password for a signed token and revokes tokens on logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Login request payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Plain password
    #[serde(default)]
    pub password: String,
}

/// Login response with token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed token for the `Authorization: Token <...>` header
    pub auth_token: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/token/login/", post(Self::handle_login))
            .route("/api/auth/token/logout/", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle POST /api/auth/token/login/
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(body): ApiJson<LoginRequest>,
    ) -> Result<Response, AppError> {
        let auth_token = resources.users().login(&body.email, &body.password).await?;
        Ok((StatusCode::OK, Json(LoginResponse { auth_token })).into_response())
    }

    /// Handle POST /api/auth/token/logout/
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let identity = resources.identity(&headers).await?;
        resources.users().logout(&identity).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
