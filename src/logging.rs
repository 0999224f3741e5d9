// ABOUTME: Tracing subscriber setup and structured domain events for the Foodgram server
// ABOUTME: Output shape (json, pretty, compact) and extra fields are driven by environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Structured logging
//!
//! `LOG_FORMAT` picks the formatter, `RUST_LOG` the filter. Production
//! deployments (`ENVIRONMENT=production`) always emit source locations and
//! thread names so log aggregation can group by origin.

use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Dependencies whose chatter is capped regardless of `RUST_LOG`
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "sqlx=warn", "tower_http=info"];

/// Formatter selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-field human readable lines
    #[default]
    Pretty,
    /// Single line, no target
    Compact,
}

impl LogFormat {
    fn from_name(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("compact") => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default directive when `RUST_LOG` is unset
    pub level: String,
    /// Output formatter
    pub format: LogFormat,
    /// Source file, line number, and thread name on every event
    pub verbose_fields: bool,
    /// Emit span open/close events for request spans
    pub span_events: bool,
    /// Reported on the startup event
    pub service_name: String,
    /// Deployment name (development, staging, production)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::default(),
            verbose_fields: false,
            span_events: false,
            service_name: service_names::FOODGRAM_SERVER.into(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `LOG_VERBOSE`, `LOG_SPANS`, `SERVICE_NAME`, and `ENVIRONMENT`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        Self {
            level: env::var("RUST_LOG").unwrap_or(defaults.level),
            format: LogFormat::from_name(env::var("LOG_FORMAT").ok().as_deref()),
            verbose_fields: environment == "production" || env::var("LOG_VERBOSE").is_ok(),
            span_events: env::var("LOG_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            environment,
        }
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(&self.level);
        for directive in QUIET_TARGETS {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    fn formatter(&self) -> BoxedLayer {
        let spans = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer()
            .with_file(self.verbose_fields)
            .with_line_number(self.verbose_fields)
            .with_thread_names(self.verbose_fields)
            .with_span_events(spans)
            .with_writer(std::io::stdout);

        match self.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Pretty => base.boxed(),
            LogFormat::Compact => base.compact().with_target(false).boxed(),
        }
    }

    /// Install the global subscriber and emit the startup event
    ///
    /// # Errors
    ///
    /// Fails when a global subscriber is already set
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.formatter().with_filter(self.filter()))
            .try_init()?;

        info!(
            service = %self.service_name,
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            level = %self.level,
            format = ?self.format,
            verbose = self.verbose_fields,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Install the subscriber configured by the environment
///
/// # Errors
///
/// Fails when a global subscriber is already set
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Named structured events shared by services and the request pipeline
pub struct AppLogger;

impl AppLogger {
    /// Login, logout, or password change outcome
    pub fn log_auth_event(user_id: Option<i64>, event: &str, success: bool) {
        info!(
            user.id = user_id.unwrap_or_default(),
            auth.event = %event,
            auth.success = success,
            "Auth event"
        );
    }

    /// Credential rejected before reaching a handler
    pub fn log_security_event(event_type: &str, details: &str, user_id: Option<i64>) {
        warn!(
            security.event = %event_type,
            security.details = %details,
            user.id = user_id.unwrap_or_default(),
            "Credential rejected"
        );
    }

    /// Result of a bulk catalog import
    pub fn log_catalog_load(table: &str, created: usize, existing: usize, skipped: usize, took: Duration) {
        info!(
            catalog.table = %table,
            catalog.created = created,
            catalog.existing = existing,
            catalog.skipped = skipped,
            catalog.duration_ms = took.as_millis() as u64,
            "Catalog loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_name(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_name(Some("compact")), LogFormat::Compact);
        assert_eq!(LogFormat::from_name(Some("xml")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name(None), LogFormat::Pretty);
    }

    #[test]
    fn test_defaults_are_quiet() {
        let config = LoggingConfig::default();
        assert_eq!(config.service_name, "foodgram-server");
        assert!(!config.verbose_fields);
        assert!(!config.span_events);
    }
}
