// ABOUTME: Route module organization for the Foodgram HTTP API
// ABOUTME: Assembles every domain router and the shared middleware stack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Route module for the Foodgram API
//!
//! Each domain module contains route definitions and thin handlers that
//! resolve the request identity and delegate to the service layer.

/// Token login and logout
pub mod auth;
/// Tags and ingredients
pub mod catalog;
/// Health check and readiness
pub mod health;
/// Recipes, favorites, shopping cart, and short links
pub mod recipes;
/// Short link redirects
pub mod short_links;
/// Accounts, profiles, avatars, and subscriptions
pub mod users;

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequest, Request},
    http::StatusCode,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use auth::AuthRoutes;
pub use catalog::CatalogRoutes;
pub use health::HealthRoutes;
pub use recipes::RecipeRoutes;
pub use short_links::ShortLinkRoutes;
pub use users::UserRoutes;

use crate::errors::{AppError, AppResult};
use crate::middleware::{create_request_span, setup_cors};
use crate::resources::ServerResources;

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let config = Arc::clone(&resources.config);

    let mut router = Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(UserRoutes::routes(Arc::clone(&resources)))
        .merge(CatalogRoutes::routes(Arc::clone(&resources)))
        .merge(RecipeRoutes::routes(Arc::clone(&resources)))
        .merge(ShortLinkRoutes::routes(Arc::clone(&resources)));

    // Nesting needs a non-root mount point; absolute media URLs are served elsewhere
    let mount = config.media.url.trim_end_matches('/');
    if mount.starts_with('/') && mount.len() > 1 {
        router = router.nest_service(mount, ServeDir::new(resources.media.root()));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(setup_cors(&config.cors))
            .layer(DefaultBodyLimit::max(config.max_body_bytes)),
    )
}

/// JSON body extractor whose rejections use the API error envelope
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::payload_too_large(rejection.body_text())
                } else {
                    AppError::invalid_input(rejection.body_text())
                }
            })?;
        Ok(Self(value))
    }
}

/// Parse a numeric path segment
///
/// Non-numeric ids can never match a row, so they are reported as not found.
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found(resource.to_owned()))
}

/// Parse the optional `recipes_limit` query parameter
pub(crate) fn parse_recipes_limit(raw: Option<&str>) -> AppResult<Option<i64>> {
    raw.map(|value| {
        value
            .parse::<i64>()
            .ok()
            .filter(|limit| *limit >= 0)
            .ok_or_else(|| {
                AppError::field("recipes_limit", "Must be a non-negative integer.")
            })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "Recipe").unwrap(), 42);
        let err = parse_id("abc", "Recipe").unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }

    #[test]
    fn test_parse_recipes_limit() {
        assert_eq!(parse_recipes_limit(None).unwrap(), None);
        assert_eq!(parse_recipes_limit(Some("3")).unwrap(), Some(3));
        assert_eq!(parse_recipes_limit(Some("0")).unwrap(), Some(0));
        assert!(parse_recipes_limit(Some("-1")).unwrap_err().has_field("recipes_limit"));
        assert!(parse_recipes_limit(Some("x")).is_err());
    }
}
