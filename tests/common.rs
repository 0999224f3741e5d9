// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, server resources, users, and catalog seeds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `foodgram_server`

use std::path::Path;
use std::sync::{Arc, Once};

use anyhow::Result;
use foodgram_server::{
    config::{DatabaseConfig, DatabaseUrl, ServerConfig},
    database::Database,
    models::{Ingredient, IngredientAmountInput, NewUser, RecipeWriteRequest, Tag, User},
    permissions::Identity,
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// 1x1 transparent PNG
pub const PNG_PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Password every test user is created with
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Image payload as the web client sends it
pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{PNG_PIXEL}")
}

/// Migrated in-memory database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new(&DatabaseConfig {
        url: DatabaseUrl::Memory,
        ..DatabaseConfig::default()
    })
    .await?;
    database.migrate().await?;
    Ok(database)
}

/// Configuration for an in-memory server writing media under `media_root`
pub fn test_config(media_root: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.database.url = DatabaseUrl::Memory;
    config.auth.jwt_secret = Some("test-secret-key-for-foodgram-integration-tests".into());
    // Lowest cost bcrypt accepts
    config.auth.bcrypt_cost = 4;
    config.media.root = media_root.to_path_buf();
    config.public_base_url = "http://testserver".into();
    config
}

/// Fully wired resources over an in-memory database
pub async fn create_test_resources(media_root: &Path) -> Result<Arc<ServerResources>> {
    init_test_logging();
    Ok(Arc::new(
        ServerResources::from_config(test_config(media_root)).await?,
    ))
}

/// Insert a user with [`TEST_PASSWORD`]
pub async fn create_test_user(resources: &ServerResources, username: &str) -> Result<User> {
    create_user_with_role(resources, username, false).await
}

/// Insert an administrator with [`TEST_PASSWORD`]
pub async fn create_test_admin(resources: &ServerResources, username: &str) -> Result<User> {
    create_user_with_role(resources, username, true).await
}

async fn create_user_with_role(
    resources: &ServerResources,
    username: &str,
    is_staff: bool,
) -> Result<User> {
    let password_hash = resources.auth_manager.hash_password(TEST_PASSWORD).await?;
    let user = resources
        .database
        .create_user(&NewUser {
            email: format!("{username}@example.com"),
            username: username.to_owned(),
            first_name: "Test".into(),
            last_name: username.to_owned(),
            password_hash,
            is_staff,
        })
        .await?;
    Ok(user)
}

/// Identity the request layer would resolve for `user`
pub const fn identity_of(user: &User) -> Identity {
    Identity::User {
        id: user.id,
        is_staff: user.is_staff,
    }
}

/// Signed token for `user`
pub fn token_for(resources: &ServerResources, user: &User) -> Result<String> {
    Ok(resources.auth_manager.generate_token(user)?)
}

/// Seed tags (breakfast, dinner, lunch) and ingredients (flour/g, milk/ml, sugar/g)
pub async fn seed_catalog(database: &Database) -> Result<(Vec<Tag>, Vec<Ingredient>)> {
    for (name, slug) in [("Breakfast", "breakfast"), ("Lunch", "lunch"), ("Dinner", "dinner")] {
        database.create_tag(name, slug).await?;
    }
    for (name, unit) in [("flour", "g"), ("milk", "ml"), ("sugar", "g")] {
        database.create_ingredient(name, unit).await?;
    }
    Ok((
        database.list_tags().await?,
        database.list_ingredients(None).await?,
    ))
}

/// Find a seeded tag by slug
pub fn tag<'a>(tags: &'a [Tag], slug: &str) -> &'a Tag {
    tags.iter()
        .find(|t| t.slug == slug)
        .unwrap_or_else(|| panic!("tag {slug} not seeded"))
}

/// Find a seeded ingredient by name
pub fn ingredient<'a>(ingredients: &'a [Ingredient], name: &str) -> &'a Ingredient {
    ingredients
        .iter()
        .find(|i| i.name == name)
        .unwrap_or_else(|| panic!("ingredient {name} not seeded"))
}

/// A complete, valid create payload
pub fn recipe_request(
    name: &str,
    tag_ids: Vec<i64>,
    ingredients: Vec<(i64, i64)>,
) -> RecipeWriteRequest {
    RecipeWriteRequest {
        tags: Some(tag_ids),
        ingredients: Some(
            ingredients
                .into_iter()
                .map(|(id, amount)| IngredientAmountInput { id, amount })
                .collect(),
        ),
        name: Some(name.to_owned()),
        text: Some(format!("How to cook {name}")),
        cooking_time: Some(15),
        image: Some(png_data_uri()),
    }
}

/// Count rows of a table
pub async fn count_rows(database: &Database, table: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(database.pool())
        .await?;
    Ok(count)
}
