// ABOUTME: Administrative command-line tool for catalog loading and superuser creation
// ABOUTME: Works directly against the configured database, no running server required
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Usage:
//! ```bash
//! # Load tags from a JSON list of {"name", "slug"}
//! cargo run --bin foodgram-admin -- load-tags data/tags.json
//!
//! # Load ingredients from name,measurement_unit lines
//! cargo run --bin foodgram-admin -- load-ingredients data/ingredients.csv
//!
//! # Create an administrator
//! cargo run --bin foodgram-admin -- create-superuser --email admin@example.com \
//!     --username admin --password secret
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foodgram_server::{
    config::ServerConfig,
    logging,
    models::RegisterUserRequest,
    resources::ServerResources,
    services::{catalog::parse_tags_json, load_ingredients, load_tags},
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "foodgram-admin",
    about = "Foodgram administration",
    long_about = "Load the tag and ingredient catalogs and create administrator accounts."
)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Load tags from a JSON file
    LoadTags {
        /// Path to a JSON list of {"name", "slug"}
        path: PathBuf,
    },
    /// Load ingredients from a CSV file
    LoadIngredients {
        /// Path to a file of name,measurement_unit lines
        path: PathBuf,
    },
    /// Create an administrator account
    CreateSuperuser {
        /// Email address
        #[arg(long)]
        email: String,
        /// Username
        #[arg(long)]
        username: String,
        /// Password
        #[arg(long)]
        password: String,
        /// First name
        #[arg(long, default_value = "Admin")]
        first_name: String,
        /// Last name
        #[arg(long, default_value = "Admin")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database.url = url.parse()?;
    }
    let resources = ServerResources::from_config(config).await?;

    match args.command {
        AdminCommand::LoadTags { path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let tags = parse_tags_json(&raw)?;
            let report = load_tags(&resources.database, &tags).await?;
            info!(
                "Tags: {} created, {} already present",
                report.created, report.existing
            );
        }
        AdminCommand::LoadIngredients { path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let report = load_ingredients(&resources.database, &raw).await?;
            info!(
                "Ingredients: {} created, {} already present, {} skipped",
                report.created, report.existing, report.skipped
            );
        }
        AdminCommand::CreateSuperuser {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let profile = resources
                .users()
                .create_superuser(RegisterUserRequest {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                })
                .await?;
            info!("Superuser {} created with id {}", profile.username, profile.id);
        }
    }

    Ok(())
}
