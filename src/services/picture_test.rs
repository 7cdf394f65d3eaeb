use super::*;

#[test]
fn picture_row_serializes() {
    let row = PictureRow { id: 1, url: "www.TestUrl.com".into(), public_id: Some("abc123".into()) };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["url"], "www.TestUrl.com");
    assert_eq!(json["public_id"], "abc123");
}

// =============================================================================
// Live DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::parent;
    use crate::services::test_support::{integration_pool, seed_parent};

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn set_replaces_previous_picture() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let parent_id = seed_parent(&pool, "pic_parent", "pic_parent@example.com").await;

        let first = set_parent_picture(&pool, &events, parent_id, "https://img.example/a.jpg", None)
            .await
            .unwrap();
        let second = set_parent_picture(&pool, &events, parent_id, "https://img.example/b.jpg", Some("b"))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let current = picture_of_parent(&pool, parent_id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.url, "https://img.example/b.jpg");

        // Replaced picture row is gone, not orphaned.
        let orphan: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pictures WHERE id = $1)")
            .bind(first.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!orphan);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn picture_url_feeds_parent_lookup() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let parent_id = seed_parent(&pool, "pic_lookup", "pic_lookup@example.com").await;

        set_parent_picture(&pool, &events, parent_id, "www.TestUrl.com", None).await.unwrap();

        let url = parent::find_parent_pic_by_username(&pool, "pic_lookup").await.unwrap();
        assert_eq!(url, "www.TestUrl.com");
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn clear_removes_picture_and_is_idempotent() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let parent_id = seed_parent(&pool, "pic_clear", "pic_clear@example.com").await;

        set_parent_picture(&pool, &events, parent_id, "https://img.example/c.jpg", None)
            .await
            .unwrap();
        clear_parent_picture(&pool, parent_id).await.unwrap();
        assert!(picture_of_parent(&pool, parent_id).await.unwrap().is_none());

        // Clearing again is a no-op.
        clear_parent_picture(&pool, parent_id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn missing_parent_is_an_error() {
        let pool = integration_pool().await;
        let events = EventBus::new();
        let result = set_parent_picture(&pool, &events, 999_999, "x", None).await;
        assert!(matches!(result, Err(PictureError::ParentNotFound(999_999))));
    }
}
