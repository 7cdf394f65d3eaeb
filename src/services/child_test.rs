use super::*;

#[test]
fn child_row_serializes_all_fields() {
    let child = ChildRow { id: 3, parent_id: 1, full_name: "Test Child".into(), age: 7 };
    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["parent_id"], 1);
    assert_eq!(json["full_name"], "Test Child");
    assert_eq!(json["age"], 7);
}

#[test]
fn child_error_messages_name_the_id() {
    assert_eq!(ChildError::NotFound(9).to_string(), "child not found: 9");
    assert_eq!(ChildError::ParentNotFound(4).to_string(), "parent not found: 4");
}

// =============================================================================
// Live DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::test_support::{integration_pool, seed_parent};

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn add_list_and_remove_children() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let parent_id = seed_parent(&pool, "child_parent", "child_parent@example.com").await;

        let first = add_child(&pool, &events, parent_id, "First Child", 5).await.unwrap();
        let second = add_child(&pool, &events, parent_id, "Second Child", 9).await.unwrap();

        let listed = children_of_parent(&pool, parent_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);

        let found = find_child_by_id(&pool, first.id).await.unwrap();
        assert_eq!(found.full_name, "First Child");
        assert_eq!(found.age, 5);

        remove_child(&pool, first.id).await.unwrap();
        let listed = children_of_parent(&pool, parent_id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn add_child_for_missing_parent_fails() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let result = add_child(&pool, &events, 999_999, "Orphan", 3).await;
        assert!(matches!(result, Err(ChildError::ParentNotFound(999_999))));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn remove_missing_child_is_not_found() {
        let pool = integration_pool().await;
        let result = remove_child(&pool, 999_999).await;
        assert!(matches!(result, Err(ChildError::NotFound(999_999))));
    }
}
