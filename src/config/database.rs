// ABOUTME: DATABASE_URL parsing and connection pool sizing
// ABOUTME: Accepts sqlite: URLs, bare file paths, and the in-memory form used by tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::convert::Infallible;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Used when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_PATH: &str = "./data/foodgram.db";

const DEFAULT_POOL_SIZE: u32 = 5;

/// Where the `SQLite` database lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// On-disk database, created with its parent directory when missing
    File {
        /// Database file
        path: PathBuf,
    },
    /// Private in-memory database, gone when the pool closes
    Memory,
}

impl FromStr for DatabaseUrl {
    type Err = Infallible;

    /// `sqlite::memory:` selects memory; `sqlite:`/`sqlite://` prefixes are stripped
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let location = ["sqlite://", "sqlite:"]
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix))
            .unwrap_or(raw);
        Ok(if location == ":memory:" {
            Self::Memory
        } else {
            Self::File {
                path: location.into(),
            }
        })
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::File {
            path: DEFAULT_DATABASE_PATH.into(),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "sqlite:{}", path.display()),
            Self::Memory => f.write_str("sqlite::memory:"),
        }
    }
}

impl DatabaseUrl {
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// Pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: DatabaseUrl,
    /// Ignored for in-memory databases, which must share one connection
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            max_connections: DEFAULT_POOL_SIZE,
        }
    }
}

impl DatabaseConfig {
    /// Read `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`
    ///
    /// # Errors
    ///
    /// Config error when the pool size is not a positive integer
    pub fn from_env() -> AppResult<Self> {
        let url = env::var("DATABASE_URL")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                AppError::config(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_POOL_SIZE,
        };
        Ok(Self {
            url,
            max_connections,
        })
    }

    /// Connections the pool may open
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        match self.url {
            DatabaseUrl::Memory => 1,
            DatabaseUrl::File { .. } => self.max_connections,
        }
    }
}
