// ABOUTME: Integration tests for accounts, authentication, avatars, and follows
// ABOUTME: Exercises the user service against an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    count_rows, create_test_resources, create_test_user, identity_of, ingredient, png_data_uri,
    recipe_request, seed_catalog, tag, TEST_PASSWORD,
};
use foodgram_server::errors::ErrorCode;
use foodgram_server::models::RegisterUserRequest;
use foodgram_server::permissions::Identity;

fn registration(email: &str, username: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        email: email.into(),
        username: username.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        password: "s3cret-pass".into(),
    }
}

#[tokio::test]
async fn test_register_and_login() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let users = resources.users();

    let profile = users
        .register(registration("ada@example.com", "ada"))
        .await
        .unwrap();
    assert_eq!(profile.username, "ada");
    assert!(!profile.is_subscribed);
    assert!(profile.avatar.is_none());

    let token = users.login("ada@example.com", "s3cret-pass").await.unwrap();
    let claims = resources.auth_manager.validate_token(&token).unwrap();
    assert_eq!(claims.user_id().unwrap(), profile.id);

    let err = users.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    let err = users.login("nobody@example.com", "s3cret-pass").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_registration_rejects_duplicates_and_reserved_names() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let users = resources.users();
    users
        .register(registration("ada@example.com", "ada"))
        .await
        .unwrap();

    let err = users
        .register(registration("ADA@example.com", "other"))
        .await
        .unwrap_err();
    assert!(err.has_field("email"));

    let err = users
        .register(registration("new@example.com", "ada"))
        .await
        .unwrap_err();
    assert!(err.has_field("username"));

    let err = users
        .register(registration("me@example.com", "me"))
        .await
        .unwrap_err();
    assert!(err.has_field("username"));

    let err = users
        .register(registration("not-an-email", "ok"))
        .await
        .unwrap_err();
    assert!(err.has_field("email"));

    assert_eq!(count_rows(&resources.database, "users").await.unwrap(), 1);
}

#[tokio::test]
async fn test_set_password() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let user = create_test_user(&resources, "cook").await.unwrap();
    let users = resources.users();
    let identity = identity_of(&user);

    let err = users
        .set_password(&identity, "wrong", "fresh-password")
        .await
        .unwrap_err();
    assert!(err.has_field("current_password"));

    users
        .set_password(&identity, TEST_PASSWORD, "fresh-password")
        .await
        .unwrap();
    assert!(users.login(&user.email, TEST_PASSWORD).await.is_err());
    assert!(users.login(&user.email, "fresh-password").await.is_ok());
}

#[tokio::test]
async fn test_avatar_lifecycle() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let user = create_test_user(&resources, "cook").await.unwrap();
    let users = resources.users();
    let identity = identity_of(&user);

    let err = users.set_avatar(&identity, None).await.unwrap_err();
    assert!(err.has_field("avatar"));
    let err = users
        .set_avatar(&identity, Some("data:image/png;base64,!!!"))
        .await
        .unwrap_err();
    assert!(err.has_field("avatar"));

    let first = users
        .set_avatar(&identity, Some(&png_data_uri()))
        .await
        .unwrap()
        .avatar
        .unwrap();
    let first_path = resources.media.path_for(&first).unwrap();
    assert!(first_path.exists());

    let second = users
        .set_avatar(&identity, Some(&png_data_uri()))
        .await
        .unwrap()
        .avatar
        .unwrap();
    assert!(!first_path.exists(), "previous avatar should be removed");
    assert_eq!(users.me(&identity).await.unwrap().avatar, Some(second.clone()));

    users.delete_avatar(&identity).await.unwrap();
    assert!(users.me(&identity).await.unwrap().avatar.is_none());
    assert!(!resources.media.path_for(&second).unwrap().exists());
}

#[tokio::test]
async fn test_follow_rules() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let reader = create_test_user(&resources, "reader").await.unwrap();
    let author = create_test_user(&resources, "author").await.unwrap();
    let users = resources.users();
    let identity = identity_of(&reader);

    let err = users
        .subscribe(&identity, reader.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let subscription = users.subscribe(&identity, author.id, None).await.unwrap();
    assert_eq!(subscription.author.id, author.id);
    assert!(subscription.author.is_subscribed);
    assert_eq!(subscription.recipes_count, 0);

    let err = users
        .subscribe(&identity, author.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    let err = users
        .subscribe(&identity, author.id + 100, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = users
        .subscribe(&Identity::Anonymous, author.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);

    users.unsubscribe(&identity, author.id).await.unwrap();
    let err = users.unsubscribe(&identity, author.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RelationNotPresent);
    assert_eq!(count_rows(&resources.database, "follows").await.unwrap(), 0);
}

#[tokio::test]
async fn test_subscriptions_respect_recipes_limit() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let (tags, ingredients) = seed_catalog(&resources.database).await.unwrap();
    let reader = create_test_user(&resources, "reader").await.unwrap();
    let prolific = create_test_user(&resources, "prolific").await.unwrap();
    let quiet = create_test_user(&resources, "quiet").await.unwrap();
    let lunch = tag(&tags, "lunch").id;
    let milk = ingredient(&ingredients, "milk").id;

    for name in ["One", "Two", "Three"] {
        resources
            .recipes()
            .create(
                &identity_of(&prolific),
                recipe_request(name, vec![lunch], vec![(milk, 1)]),
            )
            .await
            .unwrap();
    }

    let users = resources.users();
    let identity = identity_of(&reader);
    users.subscribe(&identity, prolific.id, None).await.unwrap();
    users.subscribe(&identity, quiet.id, None).await.unwrap();

    let limited = users.subscriptions(&identity, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].author.id, prolific.id);
    assert_eq!(limited[0].recipes_count, 3);
    let names: Vec<&str> = limited[0].recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Three", "Two"]);
    assert_eq!(limited[1].author.id, quiet.id);
    assert!(limited[1].recipes.is_empty());
    assert_eq!(limited[1].recipes_count, 0);

    let unlimited = users.subscriptions(&identity, None).await.unwrap();
    assert_eq!(unlimited[0].recipes.len(), 3);

    let none = users.subscriptions(&identity, Some(0)).await.unwrap();
    assert!(none[0].recipes.is_empty());
    assert_eq!(none[0].recipes_count, 3);
}
