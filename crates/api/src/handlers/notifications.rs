//! Handlers for the `/notifications` resource.
//!
//! Notifications are created by the dispatch pipeline, never through the
//! API; this surface is read-only apart from the operator retry action.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::DbId;
use herald_core::CoreError;
use herald_db::models::status::NotificationStatus;
use herald_db::repositories::NotificationRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for notification listing.
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let status = match params.status.as_deref() {
        Some(name) => Some(NotificationStatus::from_name(name).ok_or_else(|| {
            AppError::BadRequest(format!("unknown status '{name}'"))
        })?),
        None => None,
    };
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let notifications = NotificationRepo::list(&state.pool, status, limit, offset).await?;
    Ok(Json(serde_json::json!({ "data": notifications })))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let notification = NotificationRepo::find_by_id(&state.pool, notification_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }))?;
    Ok(Json(serde_json::json!({ "data": notification })))
}

/// POST /api/v1/notifications/{id}/retry
///
/// Requeue a terminally failed notification. Only rows in the failed
/// state are eligible; anything else is a conflict.
pub async fn retry_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let notification = NotificationRepo::find_by_id(&state.pool, notification_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }))?;

    let requeued = NotificationRepo::requeue_failed(&state.pool, notification_id).await?;
    if !requeued {
        let current = notification
            .status()
            .map(NotificationStatus::name)
            .unwrap_or("unknown");
        return Err(AppError::Core(CoreError::Conflict(format!(
            "notification {notification_id} is '{current}', only failed notifications can be retried"
        ))));
    }

    tracing::info!(notification_id, "Notification requeued by operator");
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "data": { "id": notification_id, "status": "pending" } })),
    ))
}
