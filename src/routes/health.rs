// ABOUTME: Liveness and readiness checks for load balancers and orchestrators
// ABOUTME: Readiness reflects whether the database pool can serve a query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::constants::service_names::FOODGRAM_SERVER;
use crate::resources::ServerResources;

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// `healthy`, `ready`, or `not_ready`
    pub status: &'static str,
    /// Service name, liveness only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'static str>,
    /// Crate version, liveness only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
    /// Check time
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    fn bare(status: &'static str) -> Self {
        Self {
            status,
            service: None,
            version: None,
            timestamp: Utc::now(),
        }
    }
}

/// `/health` and `/ready`
pub struct HealthRoutes;

impl HealthRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(resources)
    }

    async fn liveness() -> Json<HealthStatus> {
        Json(HealthStatus {
            service: Some(FOODGRAM_SERVER),
            version: Some(env!("CARGO_PKG_VERSION")),
            ..HealthStatus::bare("healthy")
        })
    }

    async fn readiness(State(resources): State<Arc<ServerResources>>) -> Response {
        if let Err(e) = resources.database.ping().await {
            warn!(error = %e, "Database unreachable, reporting not ready");
            return (StatusCode::SERVICE_UNAVAILABLE, Json(HealthStatus::bare("not_ready")))
                .into_response();
        }
        Json(HealthStatus::bare("ready")).into_response()
    }
}
