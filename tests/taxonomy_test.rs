//! Tag taxonomy and preference tests against Postgres

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use tripbuddy::models::{CreateTagRequest, TagKind};
use tripbuddy::{ErrorKind, TripBuddyError};
use uuid::Uuid;

fn unique_code(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

#[tokio::test]
#[serial]
async fn test_food_preference_scenario() {
    let Some(ctx) = TestContext::new().await else { return };
    let taxonomy = &ctx.services.taxonomy_service;
    let user = create_test_user(ctx.db()).await;

    let err = taxonomy.update_food_preference(user.id, "martian_cuisine", 2).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let pref = taxonomy.update_food_preference(user.id, "japanese", 2).await.unwrap();
    assert_eq!(pref.code, "japanese");
    assert_eq!(pref.level, 2);

    taxonomy.update_food_preference(user.id, "japanese", 3).await.unwrap();
    let prefs = taxonomy.get_food_preferences(user.id).await.unwrap();
    assert_eq!(prefs.len(), 1);
    assert_eq!(prefs[0].level, 3);

    for level in [0, 4] {
        let err = taxonomy.update_food_preference(user.id, "italian", level).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert!(taxonomy.remove_food_preference(user.id, "japanese").await.unwrap());
    assert!(!taxonomy.remove_food_preference(user.id, "japanese").await.unwrap());
    assert!(taxonomy.get_food_preferences(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_set_user_tags_replaces_one_kind() {
    let Some(ctx) = TestContext::new().await else { return };
    let taxonomy = &ctx.services.taxonomy_service;
    let user = create_test_user(ctx.db()).await;

    let hiking = seeded_tag_id(ctx.db(), TagKind::Interest, "hiking").await;
    let museums = seeded_tag_id(ctx.db(), TagKind::Interest, "museums").await;
    let backpacking = seeded_tag_id(ctx.db(), TagKind::TravelStyle, "backpacking").await;

    taxonomy.set_user_tags(user.id, TagKind::TravelStyle, &[backpacking]).await.unwrap();
    taxonomy.set_user_tags(user.id, TagKind::Interest, &[hiking, museums, hiking]).await.unwrap();
    let interests = taxonomy.set_user_tags(user.id, TagKind::Interest, &[museums]).await.unwrap();
    assert_eq!(interests.len(), 1);
    assert_eq!(interests[0].tag_id, museums);
    assert_eq!(interests[0].level, 1);

    // Other kinds are untouched
    assert_eq!(taxonomy.get_user_tags(user.id, TagKind::TravelStyle).await.unwrap().len(), 1);

    let wrong_kind = taxonomy.set_user_tags(user.id, TagKind::Interest, &[backpacking]).await.unwrap_err();
    assert_eq!(wrong_kind.kind(), ErrorKind::Validation);
    let food = taxonomy.set_user_tags(user.id, TagKind::Food, &[]).await.unwrap_err();
    assert_eq!(food.kind(), ErrorKind::Validation);

    let cleared = taxonomy.set_user_tags(user.id, TagKind::Interest, &[]).await.unwrap();
    assert!(cleared.is_empty());
}

#[tokio::test]
#[serial]
async fn test_tag_administration() {
    let Some(ctx) = TestContext::new().await else { return };
    let taxonomy = &ctx.services.taxonomy_service;
    let code = unique_code("kayaking");

    let tag = taxonomy
        .create_tag(CreateTagRequest {
            kind: TagKind::Interest,
            code: code.clone(),
            name: "  Sea   kayaking ".to_string(),
            icon: None,
            sort_order: 999,
        })
        .await
        .unwrap();
    assert_eq!(tag.name, "Sea kayaking");
    assert!(tag.is_active);

    let interests = taxonomy.list_tags(Some(TagKind::Interest)).await.unwrap();
    assert_eq!(interests.last().map(|t| t.id), Some(tag.id));
    assert!(interests.windows(2).all(|pair| pair[0].sort_order <= pair[1].sort_order));

    let duplicate = taxonomy
        .create_tag(CreateTagRequest {
            kind: TagKind::Interest,
            code: code.clone(),
            name: "Again".to_string(),
            icon: None,
            sort_order: 0,
        })
        .await
        .unwrap_err();
    assert_matches!(duplicate, TripBuddyError::DuplicateTag { .. });
    assert_eq!(duplicate.kind(), ErrorKind::Conflict);

    let invalid = taxonomy
        .create_tag(CreateTagRequest {
            kind: TagKind::Generic,
            code: "Not Valid".to_string(),
            name: "x".to_string(),
            icon: None,
            sort_order: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(invalid.kind(), ErrorKind::Validation);

    let inactive = taxonomy.set_tag_active(tag.id, false).await.unwrap();
    assert!(!inactive.is_active);
    assert!(taxonomy.resolve_active(&[tag.id]).await.unwrap().is_empty());
    assert!(!taxonomy.list_tags(None).await.unwrap().iter().any(|t| t.id == tag.id));

    assert_matches!(taxonomy.set_tag_active(i64::MAX, true).await, Err(TripBuddyError::TagNotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_inactive_tags_drop_out_of_selections() {
    let Some(ctx) = TestContext::new().await else { return };
    let taxonomy = &ctx.services.taxonomy_service;
    let user = create_test_user(ctx.db()).await;

    let tag = taxonomy
        .create_tag(CreateTagRequest {
            kind: TagKind::Generic,
            code: unique_code("night_owl"),
            name: "Night owl".to_string(),
            icon: None,
            sort_order: 50,
        })
        .await
        .unwrap();

    taxonomy.set_user_tags(user.id, TagKind::Generic, &[tag.id]).await.unwrap();
    taxonomy.set_tag_active(tag.id, false).await.unwrap();

    assert!(taxonomy.get_user_tags(user.id, TagKind::Generic).await.unwrap().is_empty());
    let err = taxonomy.set_user_tags(user.id, TagKind::Generic, &[tag.id]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
