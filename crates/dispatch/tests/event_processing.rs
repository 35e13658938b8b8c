//! Database-backed factory tests.
//!
//! These need a running Postgres reachable through `DATABASE_URL` and
//! are ignored by default; run them with `cargo test -- --ignored`.

use chrono::Utc;
use herald_core::channel::Channel;
use herald_db::models::event::CreateEvent;
use herald_db::models::rule::CreateRule;
use herald_db::models::template::CreateTemplate;
use herald_db::repositories::{EventRepo, RuleRepo, TemplateRepo};
use herald_db::DbPool;
use herald_dispatch::NotificationFactory;

async fn test_pool() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = herald_db::create_pool(&url).await.expect("connect");
    herald_db::run_migrations(&pool).await.expect("migrate");
    pool
}

/// Event types are unique per invocation so runs do not see each other's
/// rules.
fn unique_event_type(prefix: &str) -> String {
    format!(
        "{prefix}_{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
#[ignore = "needs a Postgres database via DATABASE_URL"]
async fn processing_an_event_twice_creates_nothing_new() {
    let pool = test_pool().await;
    let event_type = unique_event_type("order_placed");

    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            name: "order-confirmation".into(),
            notification_type: Channel::Email,
            subject: Some("Order {{order_id}}".into()),
            body: "Thanks {{user_name}}".into(),
            variables: serde_json::json!({}),
        },
    )
    .await
    .unwrap();

    RuleRepo::create(
        &pool,
        &CreateRule {
            name: "confirm-order".into(),
            event_type: event_type.clone(),
            notification_type: Channel::Email,
            template_id: Some(template.id),
            conditions: serde_json::json!({}),
            is_active: Some(true),
            priority: Some(1),
        },
    )
    .await
    .unwrap();

    let event = EventRepo::create(
        &pool,
        &CreateEvent {
            event_type,
            user_id: None,
            payload: serde_json::json!({
                "email": "buyer@example.com",
                "user_name": "Ada",
                "order_id": 7,
            }),
        },
    )
    .await
    .unwrap();

    let first = NotificationFactory::process_event(&pool, event.id).await.unwrap();
    let second = NotificationFactory::process_event(&pool, event.id).await.unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 0, "reprocessing a processed event must be a no-op");
}

#[tokio::test]
#[ignore = "needs a Postgres database via DATABASE_URL"]
async fn stranded_event_is_surfaced_until_processed() {
    let pool = test_pool().await;
    let event_type = unique_event_type("signup");

    let event = EventRepo::create(
        &pool,
        &CreateEvent {
            event_type,
            user_id: Some("u1".into()),
            payload: serde_json::json!({"email": "new@example.com"}),
        },
    )
    .await
    .unwrap();

    // Grace window of zero: the fresh event counts as stranded.
    let stranded = EventRepo::list_unprocessed(&pool, 0, 100).await.unwrap();
    assert!(stranded.iter().any(|e| e.id == event.id));

    NotificationFactory::process_event(&pool, event.id).await.unwrap();

    let stranded = EventRepo::list_unprocessed(&pool, 0, 100).await.unwrap();
    assert!(!stranded.iter().any(|e| e.id == event.id));
}
