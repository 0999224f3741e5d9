// ABOUTME: Account registration, login, password and avatar changes, and follows
// ABOUTME: Registration input is validated before hashing or touching the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::auth::AuthManager;
use crate::constants::limits::{EMAIL_MAX_LEN, USER_NAME_MAX_LEN};
use crate::constants::media::AVATARS;
use crate::constants::users::{RESERVED_USERNAMES, USERNAME_PATTERN};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{AvatarResponse, NewUser, RegisterUserRequest, Subscription, User, UserProfile};
use crate::permissions::Identity;
use crate::services::images::{decode_image, MediaStore};

static USERNAME_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(USERNAME_PATTERN).ok());

/// Check a registration payload
///
/// # Errors
///
/// Returns a field-tagged `ValidationError` for the first invalid field
pub fn validate_registration(request: &RegisterUserRequest) -> AppResult<()> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(AppError::field("email", "This field is required."));
    }
    if email.chars().count() > EMAIL_MAX_LEN || !looks_like_email(email) {
        return Err(AppError::field("email", "Enter a valid email address."));
    }

    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::field("username", "This field is required."));
    }
    if username.chars().count() > USER_NAME_MAX_LEN {
        return Err(AppError::field(
            "username",
            format!("Ensure this field has no more than {USER_NAME_MAX_LEN} characters."),
        ));
    }
    let pattern_ok = USERNAME_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(username));
    if !pattern_ok {
        return Err(AppError::field(
            "username",
            "Username may contain only letters, digits and @/./+/-/_ characters.",
        ));
    }
    if RESERVED_USERNAMES.contains(&username) {
        return Err(AppError::field(
            "username",
            format!("Username \"{username}\" is reserved."),
        ));
    }

    for (field, value) in [
        ("first_name", &request.first_name),
        ("last_name", &request.last_name),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::field(field, "This field is required."));
        }
        if value.chars().count() > USER_NAME_MAX_LEN {
            return Err(AppError::field(
                field,
                format!("Ensure this field has no more than {USER_NAME_MAX_LEN} characters."),
            ));
        }
    }

    if request.password.is_empty() {
        return Err(AppError::field("password", "This field is required."));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
    })
}

/// Account and follow operations
pub struct UserService<'a> {
    database: &'a Database,
    auth: &'a AuthManager,
    media: &'a MediaStore,
}

impl<'a> UserService<'a> {
    /// Create a service borrowing the shared resources
    #[must_use]
    pub const fn new(database: &'a Database, auth: &'a AuthManager, media: &'a MediaStore) -> Self {
        Self {
            database,
            auth,
            media,
        }
    }

    /// Register an account
    ///
    /// # Errors
    ///
    /// Returns a field `ValidationError`, including for a taken email or username
    pub async fn register(&self, request: RegisterUserRequest) -> AppResult<UserProfile> {
        let user = self.create_account(request, false).await?;
        info!(user.id = user.id, "User registered");
        Ok(own_profile(&user))
    }

    /// Create an administrator account
    ///
    /// # Errors
    ///
    /// Same rules as [`Self::register`]
    pub async fn create_superuser(&self, request: RegisterUserRequest) -> AppResult<UserProfile> {
        let user = self.create_account(request, true).await?;
        info!(user.id = user.id, "Superuser created");
        Ok(own_profile(&user))
    }

    async fn create_account(&self, request: RegisterUserRequest, is_staff: bool) -> AppResult<User> {
        validate_registration(&request)?;
        let email = request.email.trim().to_owned();
        let username = request.username.trim().to_owned();

        if self.database.email_exists(&email).await? {
            return Err(AppError::field("email", "A user with that email already exists."));
        }
        if self.database.username_exists(&username).await? {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let password_hash = self.auth.hash_password(&request.password).await?;
        self.database
            .create_user(&NewUser {
                email,
                username,
                first_name: request.first_name.trim().to_owned(),
                last_name: request.last_name.trim().to_owned(),
                password_hash,
                is_staff,
            })
            .await
    }

    /// Exchange credentials for a token
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the email or password is wrong
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let invalid = || AppError::invalid_input("Unable to log in with provided credentials.");

        let Some(user) = self.database.get_user_by_email(email.trim()).await? else {
            AppLogger::log_auth_event(None, "login", false);
            return Err(invalid());
        };
        if !self.auth.verify_password(password, &user.password_hash).await? {
            AppLogger::log_auth_event(Some(user.id), "login", false);
            return Err(invalid());
        }

        AppLogger::log_auth_event(Some(user.id), "login", true);
        self.auth.generate_token(&user)
    }

    /// Revoke every token the requester holds
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub async fn logout(&self, identity: &Identity) -> AppResult<()> {
        let user_id = identity.require_user()?;
        self.database.bump_token_version(user_id).await?;
        AppLogger::log_auth_event(Some(user_id), "logout", true);
        Ok(())
    }

    /// Change the requester's password
    ///
    /// # Errors
    ///
    /// Returns a field `ValidationError` if a password is missing or the current one is wrong
    pub async fn set_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.current_user(identity).await?;
        if current_password.is_empty() {
            return Err(AppError::field("current_password", "This field is required."));
        }
        if new_password.is_empty() {
            return Err(AppError::field("new_password", "This field is required."));
        }
        if !self
            .auth
            .verify_password(current_password, &user.password_hash)
            .await?
        {
            return Err(AppError::field("current_password", "Current password is incorrect."));
        }

        let hash = self.auth.hash_password(new_password).await?;
        self.database.update_password(user.id, &hash).await?;
        AppLogger::log_auth_event(Some(user.id), "set_password", true);
        Ok(())
    }

    /// Replace the requester's avatar
    ///
    /// # Errors
    ///
    /// Returns a field `ValidationError` on `avatar` for missing or bad image data
    pub async fn set_avatar(&self, identity: &Identity, avatar: Option<&str>) -> AppResult<AvatarResponse> {
        let user_id = identity.require_user()?;
        let data = avatar.ok_or_else(|| AppError::field("avatar", "This field is required."))?;
        let image = decode_image("avatar", data)?;

        let url = self.media.save(AVATARS, &image).await?;
        match self.database.set_avatar(user_id, Some(&url)).await {
            Ok(previous) => {
                if let Some(previous) = previous {
                    self.media.remove(&previous).await;
                }
                Ok(AvatarResponse { avatar: Some(url) })
            }
            Err(e) => {
                self.media.remove(&url).await;
                Err(e)
            }
        }
    }

    /// Clear the requester's avatar
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub async fn delete_avatar(&self, identity: &Identity) -> AppResult<()> {
        let user_id = identity.require_user()?;
        if let Some(previous) = self.database.set_avatar(user_id, None).await? {
            self.media.remove(&previous).await;
        }
        Ok(())
    }

    /// The requester's own profile
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub async fn me(&self, identity: &Identity) -> AppResult<UserProfile> {
        let user_id = identity.require_user()?;
        self.profile(identity, user_id).await
    }

    /// One user's public profile
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist
    pub async fn profile(&self, identity: &Identity, user_id: i64) -> AppResult<UserProfile> {
        self.database
            .get_profile(user_id, identity.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Every public profile
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list(&self, identity: &Identity) -> AppResult<Vec<UserProfile>> {
        self.database.list_profiles(identity.user_id()).await
    }

    /// Follow an author
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown author, `InvalidInput` for a self-follow,
    /// and `Conflict` if already following
    pub async fn subscribe(
        &self,
        identity: &Identity,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> AppResult<Subscription> {
        let user_id = identity.require_user()?;
        self.require_author(author_id).await?;
        self.database.follow(user_id, author_id).await?;
        info!(user.id = user_id, author.id = author_id, "Subscribed");
        self.database
            .subscription_for(author_id, user_id, recipes_limit)
            .await
    }

    /// Stop following an author
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown author and `NotPresent` if not following
    pub async fn unsubscribe(&self, identity: &Identity, author_id: i64) -> AppResult<()> {
        let user_id = identity.require_user()?;
        self.require_author(author_id).await?;
        self.database.unfollow(user_id, author_id).await?;
        info!(user.id = user_id, author.id = author_id, "Unsubscribed");
        Ok(())
    }

    /// Authors the requester follows
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` for anonymous requesters
    pub async fn subscriptions(
        &self,
        identity: &Identity,
        recipes_limit: Option<i64>,
    ) -> AppResult<Vec<Subscription>> {
        let user_id = identity.require_user()?;
        self.database.subscriptions(user_id, recipes_limit).await
    }

    async fn current_user(&self, identity: &Identity) -> AppResult<User> {
        let user_id = identity.require_user()?;
        self.database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn require_author(&self, author_id: i64) -> AppResult<()> {
        if self.database.get_user(author_id).await?.is_none() {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }
}

/// Profile of a freshly registered user, who follows nobody
fn own_profile(user: &User) -> UserProfile {
    UserProfile {
        email: user.email.clone(),
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed: false,
        avatar: user.avatar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterUserRequest {
        RegisterUserRequest {
            email: "cook@example.com".into(),
            username: "cook.42".into(),
            first_name: "Ann".into(),
            last_name: "Cook".into(),
            password: "s3cret-pass".into(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn test_reserved_username() {
        let mut req = request();
        req.username = "me".into();
        assert!(validate_registration(&req).unwrap_err().has_field("username"));
    }

    #[test]
    fn test_username_pattern() {
        let mut req = request();
        req.username = "bad name!".into();
        assert!(validate_registration(&req).unwrap_err().has_field("username"));

        req.username = "повар_1".into();
        assert!(validate_registration(&req).is_ok());
    }

    #[test]
    fn test_email_and_password_required() {
        let mut req = request();
        req.email = "not-an-email".into();
        assert!(validate_registration(&req).unwrap_err().has_field("email"));

        let mut req = request();
        req.password = String::new();
        assert!(validate_registration(&req).unwrap_err().has_field("password"));
    }

    #[test]
    fn test_name_length_limit() {
        let mut req = request();
        req.first_name = "a".repeat(USER_NAME_MAX_LEN + 1);
        assert!(validate_registration(&req).unwrap_err().has_field("first_name"));
    }
}
