// ABOUTME: Integration tests for recipe list and detail projections
// ABOUTME: Covers per-viewer flags, list filters, ordering, and shopping list aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_test_resources, create_test_user, identity_of, ingredient, recipe_request,
    seed_catalog, tag,
};
use foodgram_server::database::RecipeFilter;
use foodgram_server::errors::ErrorCode;
use foodgram_server::permissions::{Identity, RecipeAction};

#[tokio::test]
async fn test_flags_are_computed_per_viewer() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let (tags, ingredients) = seed_catalog(&resources.database).await.unwrap();
    let author = create_test_user(&resources, "author").await.unwrap();
    let reader = create_test_user(&resources, "reader").await.unwrap();
    let other = create_test_user(&resources, "other").await.unwrap();
    let recipes = resources.recipes();

    let created = recipes
        .create(
            &identity_of(&author),
            recipe_request(
                "Porridge",
                vec![tag(&tags, "breakfast").id],
                vec![(ingredient(&ingredients, "milk").id, 250)],
            ),
        )
        .await
        .unwrap();

    recipes
        .toggle_relation(RecipeAction::AddFavorite, &identity_of(&reader), created.id)
        .await
        .unwrap();
    resources
        .users()
        .subscribe(&identity_of(&reader), author.id, None)
        .await
        .unwrap();

    let for_reader = recipes
        .retrieve(&identity_of(&reader), created.id)
        .await
        .unwrap();
    assert!(for_reader.is_favorited);
    assert!(!for_reader.is_in_shopping_cart);
    assert!(for_reader.author.is_subscribed);

    let for_other = recipes
        .retrieve(&identity_of(&other), created.id)
        .await
        .unwrap();
    assert!(!for_other.is_favorited);
    assert!(!for_other.author.is_subscribed);

    let anonymous = recipes
        .list(&Identity::Anonymous, &RecipeFilter::default())
        .await
        .unwrap();
    assert_eq!(anonymous.len(), 1);
    assert!(!anonymous[0].is_favorited);
    assert!(!anonymous[0].is_in_shopping_cart);
    assert!(!anonymous[0].author.is_subscribed);
}

#[tokio::test]
async fn test_list_filters_and_ordering() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let (tags, ingredients) = seed_catalog(&resources.database).await.unwrap();
    let alice = create_test_user(&resources, "alice").await.unwrap();
    let bob = create_test_user(&resources, "bob").await.unwrap();
    let recipes = resources.recipes();
    let flour = ingredient(&ingredients, "flour").id;

    let mut ids = Vec::new();
    for (owner, name, slug) in [
        (&alice, "Omelette", "breakfast"),
        (&alice, "Stew", "dinner"),
        (&bob, "Sandwich", "lunch"),
        (&bob, "Pie", "dinner"),
    ] {
        let view = recipes
            .create(
                &identity_of(owner),
                recipe_request(name, vec![tag(&tags, slug).id], vec![(flour, 10)]),
            )
            .await
            .unwrap();
        ids.push(view.id);
    }

    let names = |views: &[foodgram_server::models::RecipeView]| -> Vec<String> {
        views.iter().map(|v| v.name.clone()).collect()
    };

    let all = recipes
        .list(&Identity::Anonymous, &RecipeFilter::default())
        .await
        .unwrap();
    assert_eq!(names(&all), vec!["Pie", "Sandwich", "Stew", "Omelette"]);

    let by_tags = recipes
        .list(
            &Identity::Anonymous,
            &RecipeFilter {
                tags: vec!["breakfast".into(), "lunch".into()],
                ..RecipeFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(names(&by_tags), vec!["Sandwich", "Omelette"]);

    let unknown_tag = recipes
        .list(
            &Identity::Anonymous,
            &RecipeFilter {
                tags: vec!["brunch".into()],
                ..RecipeFilter::default()
            },
        )
        .await
        .unwrap();
    assert!(unknown_tag.is_empty());

    let by_author = recipes
        .list(
            &Identity::Anonymous,
            &RecipeFilter {
                author: Some(alice.id),
                tags: vec!["dinner".into()],
                ..RecipeFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(names(&by_author), vec!["Stew"]);

    recipes
        .toggle_relation(RecipeAction::AddToCart, &identity_of(&alice), ids[3])
        .await
        .unwrap();
    let cart_filter = RecipeFilter {
        is_in_shopping_cart: true,
        ..RecipeFilter::default()
    };
    let in_cart = recipes
        .list(&identity_of(&alice), &cart_filter)
        .await
        .unwrap();
    assert_eq!(names(&in_cart), vec!["Pie"]);
    assert!(in_cart[0].is_in_shopping_cart);

    // Relation filters do not apply to anonymous viewers
    let anonymous_cart = recipes
        .list(&Identity::Anonymous, &cart_filter)
        .await
        .unwrap();
    assert_eq!(anonymous_cart.len(), 4);

    let favorites = recipes
        .list(
            &identity_of(&bob),
            &RecipeFilter {
                is_favorited: true,
                ..RecipeFilter::default()
            },
        )
        .await
        .unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_relation_toggle_conflicts_and_absence() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let (tags, ingredients) = seed_catalog(&resources.database).await.unwrap();
    let user = create_test_user(&resources, "cook").await.unwrap();
    let identity = identity_of(&user);
    let recipes = resources.recipes();

    let created = recipes
        .create(
            &identity,
            recipe_request(
                "Bread",
                vec![tag(&tags, "dinner").id],
                vec![(ingredient(&ingredients, "flour").id, 500)],
            ),
        )
        .await
        .unwrap();

    let summary = recipes
        .toggle_relation(RecipeAction::AddFavorite, &identity, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.id, created.id);
    assert_eq!(summary.name, "Bread");
    assert_eq!(summary.cooking_time, 15);

    let err = recipes
        .toggle_relation(RecipeAction::AddFavorite, &identity, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    // Favorites and cart are independent relations
    assert!(recipes
        .toggle_relation(RecipeAction::AddToCart, &identity, created.id)
        .await
        .unwrap()
        .is_some());

    assert!(recipes
        .toggle_relation(RecipeAction::RemoveFavorite, &identity, created.id)
        .await
        .unwrap()
        .is_none());
    let err = recipes
        .toggle_relation(RecipeAction::RemoveFavorite, &identity, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RelationNotPresent);

    let err = recipes
        .toggle_relation(RecipeAction::AddToCart, &identity, created.id + 1000)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = recipes
        .toggle_relation(RecipeAction::AddToCart, &Identity::Anonymous, created.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);
}

#[tokio::test]
async fn test_shopping_list_sums_across_cart() {
    let media = tempfile::tempdir().unwrap();
    let resources = create_test_resources(media.path()).await.unwrap();
    let (tags, ingredients) = seed_catalog(&resources.database).await.unwrap();
    let user = create_test_user(&resources, "shopper").await.unwrap();
    let identity = identity_of(&user);
    let recipes = resources.recipes();
    let flour = ingredient(&ingredients, "flour").id;
    let milk = ingredient(&ingredients, "milk").id;
    let dinner = tag(&tags, "dinner").id;

    let first = recipes
        .create(&identity, recipe_request("Bread", vec![dinner], vec![(flour, 200)]))
        .await
        .unwrap();
    let second = recipes
        .create(
            &identity,
            recipe_request("Pancakes", vec![dinner], vec![(flour, 300), (milk, 100)]),
        )
        .await
        .unwrap();
    // Not in the cart
    recipes
        .create(&identity, recipe_request("Roux", vec![dinner], vec![(flour, 50)]))
        .await
        .unwrap();

    assert_eq!(
        recipes.shopping_list(&identity).await.unwrap(),
        "Shopping list:\n"
    );

    for recipe_id in [first.id, second.id] {
        recipes
            .toggle_relation(RecipeAction::AddToCart, &identity, recipe_id)
            .await
            .unwrap();
    }

    let text = recipes.shopping_list(&identity).await.unwrap();
    assert_eq!(text, "Shopping list:\nflour - 500, g\nmilk - 100, ml\n");

    let err = recipes
        .shopping_list(&Identity::Anonymous)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);
}
