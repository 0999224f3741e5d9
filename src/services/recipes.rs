// ABOUTME: Recipe operations driven by the RecipeAction policy table
// ABOUTME: Authorizes, validates, stores images, and persists in a fixed sequence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Recipe service
//!
//! Handlers never decide permissions or validation themselves: every entry
//! point looks up its [`RecipeAction::policy`] and runs the checks it names,
//! in this order: request permission, recipe lookup (404), object permission,
//! payload validation, persistence.

use tracing::info;

use crate::constants::media::RECIPE_IMAGES;
use crate::database::{Database, RecipeFilter};
use crate::errors::{AppError, AppResult};
use crate::models::{RecipeSummary, RecipeView, RecipeWriteRequest};
use crate::permissions::{Identity, Persistence, RecipeAction};
use crate::services::images::MediaStore;
use crate::services::recipe_validator::{referenced_ids, validate_recipe, KnownIds};
use crate::services::shopping_list::render_shopping_list;

/// Recipe operations over the database and media store
pub struct RecipeService<'a> {
    database: &'a Database,
    media: &'a MediaStore,
}

impl<'a> RecipeService<'a> {
    /// Create a service borrowing the shared resources
    #[must_use]
    pub const fn new(database: &'a Database, media: &'a MediaStore) -> Self {
        Self { database, media }
    }

    /// Filtered recipe list
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, identity: &Identity, filter: &RecipeFilter) -> AppResult<Vec<RecipeView>> {
        RecipeAction::List.authorize(identity)?;
        self.database.list_recipes(filter, identity.user_id()).await
    }

    /// One recipe
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe does not exist
    pub async fn retrieve(&self, identity: &Identity, recipe_id: i64) -> AppResult<RecipeView> {
        RecipeAction::Retrieve.authorize(identity)?;
        self.view(recipe_id, identity).await
    }

    /// Create a recipe
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters or a field `ValidationError`
    pub async fn create(&self, identity: &Identity, request: RecipeWriteRequest) -> AppResult<RecipeView> {
        self.save(RecipeAction::Create, identity, None, request).await
    }

    /// Partially update a recipe
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PermissionDenied`, or a field `ValidationError`
    pub async fn update(
        &self,
        identity: &Identity,
        recipe_id: i64,
        request: RecipeWriteRequest,
    ) -> AppResult<RecipeView> {
        self.save(RecipeAction::PartialUpdate, identity, Some(recipe_id), request)
            .await
    }

    async fn save(
        &self,
        action: RecipeAction,
        identity: &Identity,
        target: Option<i64>,
        request: RecipeWriteRequest,
    ) -> AppResult<RecipeView> {
        let policy = action.policy();
        action.authorize(identity)?;
        let user_id = identity.require_user()?;

        if let Some(recipe_id) = target {
            self.authorize_recipe(action, identity, recipe_id).await?;
        }

        let mode = policy
            .validation
            .ok_or_else(|| AppError::internal(format!("{action:?} does not take a payload")))?;
        let (tag_ids, ingredient_ids) = referenced_ids(&request);
        let known = KnownIds {
            tags: self.database.existing_tag_ids(&tag_ids).await?,
            ingredients: self.database.existing_ingredient_ids(&ingredient_ids).await?,
        };
        let validated = validate_recipe(request, mode, &known)?;

        let mut changes = validated.changes;
        if let Some(image) = &validated.image {
            changes.image = Some(self.media.save(RECIPE_IMAGES, image).await?);
        }
        let stored_image = changes.image.clone();

        let persisted = match (policy.persistence, target) {
            (Persistence::InsertRecipe, None) => {
                let record = changes.into_record()?;
                self.database
                    .create_recipe(user_id, &record)
                    .await
                    .map(|recipe_id| (recipe_id, None))
            }
            (Persistence::UpdateRecipe, Some(recipe_id)) => self
                .database
                .update_recipe(recipe_id, &changes)
                .await
                .map(|replaced| (recipe_id, replaced)),
            (persistence, _) => Err(AppError::internal(format!(
                "{action:?} cannot persist as {persistence:?}"
            ))),
        };

        let (recipe_id, replaced_image) = match persisted {
            Ok(done) => done,
            Err(e) => {
                if let Some(url) = &stored_image {
                    self.media.remove(url).await;
                }
                return Err(e);
            }
        };
        if let Some(url) = replaced_image {
            self.media.remove(&url).await;
        }

        info!(user.id = user_id, recipe.id = recipe_id, action = ?action, "Recipe saved");
        self.view(recipe_id, identity).await
    }

    /// Delete a recipe
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `PermissionDenied`
    pub async fn destroy(&self, identity: &Identity, recipe_id: i64) -> AppResult<()> {
        let action = RecipeAction::Destroy;
        action.authorize(identity)?;
        self.authorize_recipe(action, identity, recipe_id).await?;

        let image = self.database.delete_recipe(recipe_id).await?;
        self.media.remove(&image).await;
        info!(user.id = identity.user_id(), recipe.id = recipe_id, "Recipe deleted");
        Ok(())
    }

    /// Add or remove a favorite or cart entry, as named by the action
    ///
    /// Adding returns the recipe summary; removing returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe does not exist, `Conflict` for a
    /// duplicate add, and `NotPresent` for removing a missing relation
    pub async fn toggle_relation(
        &self,
        action: RecipeAction,
        identity: &Identity,
        recipe_id: i64,
    ) -> AppResult<Option<RecipeSummary>> {
        action.authorize(identity)?;
        let user_id = identity.require_user()?;
        let summary = self
            .database
            .get_recipe_summary(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        match action.policy().persistence {
            Persistence::AddRelation(kind) => {
                self.database.add_relation(kind, user_id, recipe_id).await?;
                info!(user.id = user_id, recipe.id = recipe_id, relation = kind.as_str(), "Relation added");
                Ok(Some(summary))
            }
            Persistence::RemoveRelation(kind) => {
                self.database.remove_relation(kind, user_id, recipe_id).await?;
                info!(user.id = user_id, recipe.id = recipe_id, relation = kind.as_str(), "Relation removed");
                Ok(None)
            }
            other => Err(AppError::internal(format!(
                "{action:?} is not a relation toggle ({other:?})"
            ))),
        }
    }

    /// Plain-text shopping list for the requester's cart
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub async fn shopping_list(&self, identity: &Identity) -> AppResult<String> {
        RecipeAction::DownloadShoppingCart.authorize(identity)?;
        let user_id = identity.require_user()?;
        let items = self.database.shopping_list(user_id).await?;
        info!(user.id = user_id, groups = items.len(), "Shopping list exported");
        Ok(render_shopping_list(&items))
    }

    /// Absolute short link for a recipe
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the recipe does not exist
    pub async fn short_link(&self, identity: &Identity, recipe_id: i64, base_url: &str) -> AppResult<String> {
        RecipeAction::GetLink.authorize(identity)?;
        if !self.database.recipe_exists(recipe_id).await? {
            return Err(AppError::not_found("Recipe"));
        }
        Ok(format!("{}/s/{recipe_id}/", base_url.trim_end_matches('/')))
    }

    async fn authorize_recipe(
        &self,
        action: RecipeAction,
        identity: &Identity,
        recipe_id: i64,
    ) -> AppResult<()> {
        let recipe = self
            .database
            .get_recipe(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        action.authorize_object(identity, recipe.author_id)
    }

    async fn view(&self, recipe_id: i64, identity: &Identity) -> AppResult<RecipeView> {
        self.database
            .get_recipe_view(recipe_id, identity.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))
    }
}
