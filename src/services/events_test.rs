use super::*;
use tokio::time::{Duration, timeout};

#[tokio::test]
async fn publish_reaches_subscriber() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    bus.publish(DomainEvent::ParentRegistered { parent_id: 1, username: "TestUsername".into() });

    let envelope = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("receive timed out")
        .expect("channel closed");
    assert!(matches!(
        envelope.event,
        DomainEvent::ParentRegistered { parent_id: 1, ref username } if username == "TestUsername"
    ));
}

#[tokio::test]
async fn publish_without_subscribers_does_not_panic() {
    let bus = EventBus::new();
    bus.publish(DomainEvent::ParentDeleted { parent_id: 42 });
}

#[tokio::test]
async fn clones_share_the_same_channel() {
    let bus = EventBus::new();
    let cloned = bus.clone();
    let mut rx = bus.subscribe();

    cloned.publish(DomainEvent::ChildAdded { parent_id: 1, child_id: 2 });

    let envelope = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("receive timed out")
        .expect("channel closed");
    assert!(matches!(envelope.event, DomainEvent::ChildAdded { parent_id: 1, child_id: 2 }));
}

#[tokio::test]
async fn envelopes_carry_unique_ids() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    bus.publish(DomainEvent::ParentDeleted { parent_id: 1 });
    bus.publish(DomainEvent::ParentDeleted { parent_id: 1 });

    let a = rx.recv().await.unwrap();
    let b = rx.recv().await.unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn envelope_serializes_with_kind_tag() {
    let envelope = EventEnvelope {
        id: Uuid::nil(),
        event: DomainEvent::ActivityCreated { activity_id: 7, name: "Swimming".into() },
    };
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["event"]["kind"], "activity_created");
    assert_eq!(json["event"]["name"], "Swimming");
}
