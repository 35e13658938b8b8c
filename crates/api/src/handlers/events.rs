//! Handlers for the `/events` resource.
//!
//! Event ingestion is the entry point of the pipeline: a created event is
//! handed to the notification factory on a background task so the HTTP
//! response does not wait for rule matching.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::DbId;
use herald_core::CoreError;
use herald_db::models::event::CreateEvent;
use herald_db::repositories::EventRepo;
use herald_dispatch::NotificationFactory;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Maximum page size for event listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for event listing.
const DEFAULT_LIMIT: i64 = 50;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255))]
    pub event_type: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/events
///
/// Ingest an event and trigger notification processing asynchronously.
pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    body.validate()?;

    if !body.payload.is_object() {
        return Err(AppError::BadRequest("payload must be a JSON object".into()));
    }

    let event = EventRepo::create(
        &state.pool,
        &CreateEvent {
            event_type: body.event_type,
            user_id: body.user_id,
            payload: body.payload,
        },
    )
    .await?;

    // Hand off to the factory; the response does not wait for matching.
    let pool = state.pool.clone();
    let event_id = event.id;
    tokio::spawn(async move {
        if let Err(e) = NotificationFactory::process_event(&pool, event_id).await {
            tracing::error!(event_id, error = %e, "Event processing failed");
        }
    });

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "data": event }))))
}

/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let events = EventRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(serde_json::json!({ "data": events })))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    Ok(Json(serde_json::json!({ "data": event })))
}
