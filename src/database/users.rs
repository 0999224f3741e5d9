// ABOUTME: User account storage and public profile projection
// ABOUTME: Profiles carry the viewer's is_subscribed flag computed in the same query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::{push_id_list, Database};
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use crate::models::{NewUser, User, UserProfile};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, avatar, \
                            is_staff, token_version, date_joined";

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                username TEXT NOT NULL UNIQUE CHECK (username <> 'me'),
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                avatar TEXT,
                is_staff INTEGER NOT NULL DEFAULT 0,
                token_version INTEGER NOT NULL DEFAULT 0,
                date_joined TEXT NOT NULL
            )
            ",
        ])
        .await
    }

    /// Insert a user
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email or username is taken
    pub async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let id = sqlx::query(
            r"
            INSERT INTO users (email, username, first_name, last_name, password_hash, is_staff, date_joined)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .db_context("Failed to create user")?
        .last_insert_rowid();

        self.get_user(id)
            .await?
            .ok_or_else(|| AppError::internal("Created user could not be read back"))
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get user")?;
        Ok(row.as_ref().map(row_to_user))
    }

    /// Get a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get user by email")?;
        Ok(row.as_ref().map(row_to_user))
    }

    /// Whether an email is registered
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .db_context("Failed to check email")
    }

    /// Whether a username is registered
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .db_context("Failed to check username")
    }

    /// Every user's public profile, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_profiles(&self, viewer: Option<i64>) -> AppResult<Vec<UserProfile>> {
        let mut builder = profile_query(viewer);
        builder.push(" ORDER BY u.id");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to list users")?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    /// One user's public profile
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_profile(&self, user_id: i64, viewer: Option<i64>) -> AppResult<Option<UserProfile>> {
        let mut builder = profile_query(viewer);
        builder.push(" WHERE u.id = ").push_bind(user_id);
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to get user profile")?;
        Ok(row.as_ref().map(row_to_profile))
    }

    /// Profiles for a set of users, keyed by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn profiles_by_ids(
        &self,
        ids: &[i64],
        viewer: Option<i64>,
    ) -> AppResult<HashMap<i64, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder = profile_query(viewer);
        builder.push(" WHERE u.id IN ");
        push_id_list(&mut builder, ids);
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .db_context("Failed to load authors")?;
        Ok(rows
            .iter()
            .map(row_to_profile)
            .map(|profile| (profile.id, profile))
            .collect())
    }

    /// Replace a password hash
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist
    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .db_context("Failed to update password")?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Set or clear the avatar, returning the previous one
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist
    pub async fn set_avatar(&self, user_id: i64, avatar: Option<&str>) -> AppResult<Option<String>> {
        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT avatar FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .db_context("Failed to read avatar")?;
        let previous = previous.ok_or_else(|| AppError::not_found("User"))?;

        sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
            .bind(avatar)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .db_context("Failed to update avatar")?;
        Ok(previous)
    }

    /// Invalidate every token issued so far
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn bump_token_version(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET token_version = token_version + 1 WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .db_context("Failed to revoke tokens")?;
        Ok(())
    }
}

/// `SELECT` of profile columns with the viewer's subscription flag
///
/// Anonymous viewers get a constant `0` instead of an existence subquery.
pub(super) fn profile_query<'a>(viewer: Option<i64>) -> QueryBuilder<'a, Sqlite> {
    let mut builder =
        QueryBuilder::new("SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, ");
    push_subscribed_flag(&mut builder, viewer);
    builder.push(" FROM users u");
    builder
}

pub(super) fn push_subscribed_flag(builder: &mut QueryBuilder<'_, Sqlite>, viewer: Option<i64>) {
    match viewer {
        Some(viewer_id) => {
            builder
                .push("EXISTS(SELECT 1 FROM follows f WHERE f.user_id = ")
                .push_bind(viewer_id)
                .push(" AND f.author_id = u.id) AS is_subscribed");
        }
        None => {
            builder.push("0 AS is_subscribed");
        }
    }
}

pub(super) fn row_to_profile(row: &SqliteRow) -> UserProfile {
    UserProfile {
        email: row.get("email"),
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_subscribed: row.get("is_subscribed"),
        avatar: row.get("avatar"),
    }
}

fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        avatar: row.get("avatar"),
        is_staff: row.get("is_staff"),
        token_version: row.get("token_version"),
        date_joined: row.get("date_joined"),
    }
}
