//! Database-backed lifecycle tests.
//!
//! These need a running Postgres reachable through `DATABASE_URL` and
//! are ignored by default; run them with `cargo test -- --ignored`.

use chrono::Utc;
use herald_core::channel::Channel;
use herald_core::types::DbId;
use herald_db::models::notification::NewNotification;
use herald_db::models::status::NotificationStatus;
use herald_db::repositories::NotificationRepo;
use herald_db::DbPool;

async fn test_pool() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = herald_db::create_pool(&url).await.expect("connect");
    herald_db::run_migrations(&pool).await.expect("migrate");
    pool
}

async fn insert_pending(pool: &DbPool) -> DbId {
    NotificationRepo::create(
        pool,
        &NewNotification {
            rule_id: 0,
            recipient: "lifecycle@example.com".into(),
            channel: Channel::Email,
            subject: None,
            body: "lifecycle test".into(),
            max_retries: 3,
            scheduled_at: Utc::now(),
            metadata: serde_json::json!({}),
        },
    )
    .await
    .expect("insert notification")
}

#[tokio::test]
#[ignore = "needs a Postgres database via DATABASE_URL"]
async fn concurrent_claims_yield_exactly_one_winner() {
    let pool = test_pool().await;
    let id = insert_pending(&pool).await;

    let (a, b) = tokio::join!(
        NotificationRepo::try_claim(&pool, id),
        NotificationRepo::try_claim(&pool, id),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(a ^ b, "expected one winner and one no-op, got {a} and {b}");

    let row = NotificationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status(), Some(NotificationStatus::Processing));
}

#[tokio::test]
#[ignore = "needs a Postgres database via DATABASE_URL"]
async fn replayed_retrying_write_does_not_double_count() {
    let pool = test_pool().await;
    let id = insert_pending(&pool).await;
    assert!(NotificationRepo::try_claim(&pool, id).await.unwrap());

    let scheduled_at = Utc::now();
    // The same outcome written twice, as after a lost ack.
    NotificationRepo::mark_retrying(&pool, id, 1, "smtp unreachable", scheduled_at)
        .await
        .unwrap();
    NotificationRepo::mark_retrying(&pool, id, 1, "smtp unreachable", scheduled_at)
        .await
        .unwrap();

    let row = NotificationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.retry_count, 1);
    assert_eq!(row.status(), Some(NotificationStatus::Retrying));
}

#[tokio::test]
#[ignore = "needs a Postgres database via DATABASE_URL"]
async fn permanent_failure_lands_at_max_retries() {
    let pool = test_pool().await;
    let id = insert_pending(&pool).await;
    assert!(NotificationRepo::try_claim(&pool, id).await.unwrap());

    // First-attempt configuration error: count 1, but the row must still
    // read as exhausted.
    NotificationRepo::mark_failed(&pool, id, 1, "bad sender address")
        .await
        .unwrap();

    let row = NotificationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status(), Some(NotificationStatus::Failed));
    assert!(row.retry_count >= row.max_retries);
}
