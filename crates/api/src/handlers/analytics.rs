//! Delivery analytics, computed live with GROUP BY queries.

use axum::extract::State;
use axum::Json;
use herald_db::models::status::NotificationStatus;
use herald_db::repositories::NotificationRepo;
use serde_json::Map;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/analytics/notifications
///
/// Counts by delivery status and by channel. Statuses with no rows are
/// reported as zero so dashboards get a stable shape.
pub async fn notification_summary(
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let status_counts = NotificationRepo::status_counts(&state.pool).await?;
    let type_counts = NotificationRepo::counts_by_type(&state.pool).await?;

    let mut by_status = Map::new();
    for status in [
        NotificationStatus::Pending,
        NotificationStatus::Processing,
        NotificationStatus::Sent,
        NotificationStatus::Retrying,
        NotificationStatus::Failed,
    ] {
        by_status.insert(status.name().to_string(), 0i64.into());
    }
    let mut total = 0i64;
    for (status_id, count) in status_counts {
        total += count;
        if let Some(status) = NotificationStatus::from_id(status_id) {
            by_status.insert(status.name().to_string(), count.into());
        }
    }

    let mut by_type = Map::new();
    for (channel, count) in type_counts {
        by_type.insert(channel, count.into());
    }

    Ok(Json(serde_json::json!({
        "data": {
            "total": total,
            "by_status": by_status,
            "by_type": by_type,
        }
    })))
}
