// ABOUTME: Access control for recipe operations: identities, permissions, and the action table
// ABOUTME: Maps each recipe action to its permission check, payload validation, and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Access policy
//!
//! Reads are open to everyone. Mutations need an authenticated identity, and
//! mutations of an existing recipe additionally need the requester to be its
//! author or an administrator.
//!
//! Every recipe endpoint resolves its behaviour through [`RecipeAction::policy`],
//! a single table keyed by the action instead of per-handler conditionals.

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::RelationKind;

/// Who is making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// No credentials were supplied
    #[default]
    Anonymous,
    /// Verified user
    User {
        /// User id
        id: i64,
        /// Administrative privilege
        is_staff: bool,
    },
}

impl Identity {
    /// Authenticated user id, if any
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    /// Whether credentials were supplied and verified
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Whether the requester holds administrative privilege
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::User { is_staff: true, .. })
    }

    /// Authenticated user id or `AuthRequired`
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub fn require_user(&self) -> AppResult<i64> {
        self.user_id().ok_or_else(AppError::auth_required)
    }
}

/// Permission class attached to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Anyone, including anonymous requesters
    AllowAny,
    /// Any authenticated user
    Authenticated,
    /// Authenticated, and the recipe author or an administrator
    AuthorOrAdmin,
}

impl Permission {
    /// Request-level check, before any object is loaded
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` if the permission needs an identity and none was given
    pub fn check_request(self, identity: &Identity) -> AppResult<()> {
        match self {
            Self::AllowAny => Ok(()),
            Self::Authenticated | Self::AuthorOrAdmin => identity.require_user().map(|_| ()),
        }
    }

    /// Object-level check against the recipe author
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters and `PermissionDenied`
    /// when the requester is neither the author nor an administrator
    pub fn check_object(self, identity: &Identity, author_id: i64) -> AppResult<()> {
        self.check_request(identity)?;
        match (self, identity) {
            (Self::AuthorOrAdmin, Identity::User { id, is_staff }) => {
                if *is_staff || *id == author_id {
                    Ok(())
                } else {
                    Err(AppError::permission_denied(
                        "Only the author or an administrator can modify this recipe",
                    ))
                }
            }
            _ => Ok(()),
        }
    }
}

/// How a recipe write payload is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Every field is required, including the image
    Create,
    /// Only supplied fields are validated and written
    Update,
}

/// What an action writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// No writes
    ReadOnly,
    /// Insert a recipe with its tag and ingredient sets
    InsertRecipe,
    /// Replace supplied fields and sets of an existing recipe
    UpdateRecipe,
    /// Delete a recipe (join and relation rows cascade)
    DeleteRecipe,
    /// Insert a (user, recipe) relation row
    AddRelation(RelationKind),
    /// Delete a (user, recipe) relation row that must exist
    RemoveRelation(RelationKind),
}

/// Permission check, payload validation, and persistence for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    /// Who may run the action
    pub permission: Permission,
    /// How the payload is validated, for actions that take one
    pub validation: Option<WriteMode>,
    /// What is written
    pub persistence: Persistence,
}

/// Every operation exposed under `/api/recipes/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeAction {
    /// `GET /api/recipes/`
    List,
    /// `GET /api/recipes/{id}/`
    Retrieve,
    /// `POST /api/recipes/`
    Create,
    /// `PATCH /api/recipes/{id}/`
    PartialUpdate,
    /// `DELETE /api/recipes/{id}/`
    Destroy,
    /// `POST /api/recipes/{id}/favorite/`
    AddFavorite,
    /// `DELETE /api/recipes/{id}/favorite/`
    RemoveFavorite,
    /// `POST /api/recipes/{id}/shopping_cart/`
    AddToCart,
    /// `DELETE /api/recipes/{id}/shopping_cart/`
    RemoveFromCart,
    /// `GET /api/recipes/download_shopping_cart/`
    DownloadShoppingCart,
    /// `GET /api/recipes/{id}/get-link/`
    GetLink,
}

impl RecipeAction {
    /// All actions, in routing order
    pub const ALL: [Self; 11] = [
        Self::List,
        Self::Retrieve,
        Self::Create,
        Self::PartialUpdate,
        Self::Destroy,
        Self::AddFavorite,
        Self::RemoveFavorite,
        Self::AddToCart,
        Self::RemoveFromCart,
        Self::DownloadShoppingCart,
        Self::GetLink,
    ];

    /// Look up the policy for this action
    #[must_use]
    pub const fn policy(self) -> ActionPolicy {
        const fn entry(
            permission: Permission,
            validation: Option<WriteMode>,
            persistence: Persistence,
        ) -> ActionPolicy {
            ActionPolicy {
                permission,
                validation,
                persistence,
            }
        }

        match self {
            Self::List | Self::Retrieve | Self::GetLink => {
                entry(Permission::AllowAny, None, Persistence::ReadOnly)
            }
            Self::Create => entry(
                Permission::Authenticated,
                Some(WriteMode::Create),
                Persistence::InsertRecipe,
            ),
            Self::PartialUpdate => entry(
                Permission::AuthorOrAdmin,
                Some(WriteMode::Update),
                Persistence::UpdateRecipe,
            ),
            Self::Destroy => entry(Permission::AuthorOrAdmin, None, Persistence::DeleteRecipe),
            Self::AddFavorite => entry(
                Permission::Authenticated,
                None,
                Persistence::AddRelation(RelationKind::Favorite),
            ),
            Self::RemoveFavorite => entry(
                Permission::Authenticated,
                None,
                Persistence::RemoveRelation(RelationKind::Favorite),
            ),
            Self::AddToCart => entry(
                Permission::Authenticated,
                None,
                Persistence::AddRelation(RelationKind::ShoppingCart),
            ),
            Self::RemoveFromCart => entry(
                Permission::Authenticated,
                None,
                Persistence::RemoveRelation(RelationKind::ShoppingCart),
            ),
            Self::DownloadShoppingCart => {
                entry(Permission::Authenticated, None, Persistence::ReadOnly)
            }
        }
    }

    /// Request-level authorization for this action
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the action needs an identity and none was given
    pub fn authorize(self, identity: &Identity) -> AppResult<()> {
        self.policy().permission.check_request(identity)
    }

    /// Object-level authorization for this action against a recipe author
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` or `PermissionDenied`
    pub fn authorize_object(self, identity: &Identity, author_id: i64) -> AppResult<()> {
        self.policy().permission.check_object(identity, author_id)
    }
}
