// ABOUTME: Foodgram API server binary
// ABOUTME: Loads configuration from the environment, migrates the database, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! # Foodgram API Server Binary

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use foodgram_server::{
    config::ServerConfig, logging, resources::ServerResources, server::FoodgramServer,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram - recipe sharing API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Foodgram API");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::from_config(config).await?);
    info!("Database ready: {}", resources.config.database.url);

    display_available_endpoints(port);

    let server = FoodgramServer::new(resources);
    if let Err(e) = server.run(port).await {
        error!("Server error: {e}");
        return Err(e);
    }
    Ok(())
}

/// Log the endpoint map at start-up
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(port: u16) {
    info!("=== Available API Endpoints ===");
    info!("Auth:          POST http://localhost:{port}/api/auth/token/login/");
    info!("Users:         GET  http://localhost:{port}/api/users/");
    info!("Tags:          GET  http://localhost:{port}/api/tags/");
    info!("Ingredients:   GET  http://localhost:{port}/api/ingredients/");
    info!("Recipes:       GET  http://localhost:{port}/api/recipes/");
    info!("Short links:   GET  http://localhost:{port}/s/{{id}}/");
    info!("Health:        GET  http://localhost:{port}/health");
    info!("=== End of Endpoint List ===");
}
