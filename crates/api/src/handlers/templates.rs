//! Handlers for the `/templates` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::DbId;
use herald_core::CoreError;
use herald_db::models::template::CreateTemplate;
use herald_db::repositories::TemplateRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::events::ListQuery;
use crate::state::AppState;

/// POST /api/v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<CreateTemplate>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if body.body.trim().is_empty() {
        return Err(AppError::BadRequest("body must not be empty".into()));
    }

    let template = TemplateRepo::create(&state.pool, &body).await?;
    tracing::info!(template_id = template.id, "Template created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": template })),
    ))
}

/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);
    let templates = TemplateRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(serde_json::json!({ "data": templates })))
}

/// GET /api/v1/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let template = TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: template_id,
        }))?;
    Ok(Json(serde_json::json!({ "data": template })))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = TemplateRepo::delete(&state.pool, template_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: template_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
