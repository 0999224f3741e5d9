// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Resolves the request identity from the Authorization header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::auth::{extract_token, AuthManager};
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::permissions::Identity;
use crate::services::{MediaStore, RecipeService, UserService};

/// Everything a request handler needs
#[derive(Debug, Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Token and password handling
    pub auth_manager: AuthManager,
    /// Uploaded image storage
    pub media: MediaStore,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle resources
    #[must_use]
    pub const fn new(
        database: Database,
        auth_manager: AuthManager,
        media: MediaStore,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            database,
            auth_manager,
            media,
            config,
        }
    }

    /// Build resources from configuration: connect, migrate, and set up auth and media
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database).await?;
        database.migrate().await?;
        let auth_manager = AuthManager::from_config(&config.auth);
        let media = MediaStore::from_config(&config.media);
        Ok(Self::new(database, auth_manager, media, Arc::new(config)))
    }

    /// Recipe operations
    #[must_use]
    pub const fn recipes(&self) -> RecipeService<'_> {
        RecipeService::new(&self.database, &self.media)
    }

    /// Account operations
    #[must_use]
    pub const fn users(&self) -> UserService<'_> {
        UserService::new(&self.database, &self.auth_manager, &self.media)
    }

    /// Resolve who is making the request
    ///
    /// No `Authorization` header means anonymous. A header that is present but
    /// unusable, or a token for a missing user or revoked session, is rejected.
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for a bad header or token
    pub async fn identity(&self, headers: &HeaderMap) -> AppResult<Identity> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(Identity::Anonymous);
        };
        let token = value
            .to_str()
            .ok()
            .and_then(extract_token)
            .ok_or_else(|| AppError::auth_invalid("Invalid authorization header"))?;

        let claims = self.auth_manager.validate_token(token).map_err(|e| {
            AppLogger::log_security_event("token_rejected", &e.to_string(), None);
            AppError::from(e)
        })?;
        let user_id = claims.user_id()?;
        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User for token no longer exists"))?;

        if user.token_version != claims.ver {
            AppLogger::log_security_event("token_revoked", "token version mismatch", Some(user_id));
            return Err(AppError::auth_invalid("Token has been revoked"));
        }

        Ok(Identity::User {
            id: user.id,
            is_staff: user.is_staff,
        })
    }
}
