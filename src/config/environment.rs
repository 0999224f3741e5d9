// ABOUTME: Server configuration loaded from environment variables
// ABOUTME: Covers HTTP, auth tokens, media storage, CORS, and request body limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use super::database::DatabaseConfig;
use crate::errors::{AppError, AppResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Uploaded image storage
    pub media: MediaConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Absolute origin used when building short links
    pub public_base_url: String,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

/// Token and password settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret; generated per process when unset
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

/// Uploaded image storage
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory images are written under
    pub root: PathBuf,
    /// URL prefix images are served from
    pub url: String,
}

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated origins or `*`
    pub allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8000,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            media: MediaConfig::default(),
            cors: CorsConfig::default(),
            public_base_url: "http://localhost:8000".into(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./media"),
            url: "/media/".into(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".into(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if jwt_secret.is_none() {
            warn!("JWT_SECRET not set; generating a per-process secret, tokens will not survive restarts");
        }

        let config = Self {
            http_port: env_parse("HTTP_PORT", defaults.http_port)?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", defaults.auth.jwt_expiry_hours)?,
                bcrypt_cost: env_parse("BCRYPT_COST", defaults.auth.bcrypt_cost)?,
            },
            media: MediaConfig {
                root: PathBuf::from(env_var_or("MEDIA_ROOT", "./media")),
                url: normalize_media_url(&env_var_or("MEDIA_URL", &defaults.media.url)),
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", &defaults.cors.allowed_origins),
            },
            public_base_url: env_var_or("PUBLIC_BASE_URL", &defaults.public_base_url)
                .trim_end_matches('/')
                .to_owned(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", defaults.max_body_bytes)?,
        };

        if config.auth.jwt_expiry_hours <= 0 {
            return Err(AppError::config("JWT_EXPIRY_HOURS must be positive"));
        }

        info!("{}", config.summary());
        Ok(config)
    }

    /// Human-readable configuration summary, without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Foodgram Server Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - Media: {} served at {}\n\
             - Public URL: {}\n\
             - CORS Origins: {}\n\
             - Token Expiry: {}h",
            self.http_port,
            self.database.url,
            self.media.root.display(),
            self.media.url,
            self.public_base_url,
            self.cors.allowed_origins,
            self.auth.jwt_expiry_hours,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

/// Media URL always starts and ends with `/`
fn normalize_media_url(url: &str) -> String {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_normalize_media_url() {
        assert_eq!(normalize_media_url("/media/"), "/media/");
        assert_eq!(normalize_media_url("media"), "/media/");
        assert_eq!(normalize_media_url("/static/media"), "/static/media/");
        assert_eq!(normalize_media_url(""), "/");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        for key in [
            "HTTP_PORT",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "JWT_SECRET",
            "JWT_EXPIRY_HOURS",
            "MEDIA_URL",
            "PUBLIC_BASE_URL",
            "MAX_BODY_BYTES",
        ] {
            env::remove_var(key);
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.database.url.to_string(), "sqlite:./data/foodgram.db");
        assert_eq!(config.database.pool_size(), 5);
        assert_eq!(config.auth.jwt_expiry_hours, 24);
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(config.media.url, "/media/");
        assert_eq!(config.public_base_url, "http://localhost:8000");
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        env::set_var("HTTP_PORT", "not-a-port");
        let result = ServerConfig::from_env();
        env::remove_var("HTTP_PORT");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_public_base_url_trailing_slash_trimmed() {
        env::set_var("PUBLIC_BASE_URL", "https://foodgram.example/");
        let config = ServerConfig::from_env();
        env::remove_var("PUBLIC_BASE_URL");
        assert_eq!(config.unwrap().public_base_url, "https://foodgram.example");
    }
}
