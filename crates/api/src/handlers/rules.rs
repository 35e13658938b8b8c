//! Handlers for the `/rules` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::types::DbId;
use herald_core::CoreError;
use herald_db::models::rule::{CreateRule, UpdateRule};
use herald_db::repositories::{RuleRepo, TemplateRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::events::ListQuery;
use crate::state::AppState;

/// Verify a referenced template exists and serves the rule's channel.
async fn check_template_ref(
    state: &AppState,
    template_id: Option<DbId>,
    notification_type: Option<&str>,
) -> Result<(), AppError> {
    let Some(template_id) = template_id else {
        return Ok(());
    };
    let template = TemplateRepo::find_by_id(&state.pool, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: template_id,
        }))?;
    if let Some(channel) = notification_type {
        if template.notification_type != channel {
            return Err(AppError::BadRequest(format!(
                "template {template_id} is for channel '{}', rule is '{channel}'",
                template.notification_type
            )));
        }
    }
    Ok(())
}

/// POST /api/v1/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(body): Json<CreateRule>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if body.event_type.trim().is_empty() {
        return Err(AppError::BadRequest("event_type must not be empty".into()));
    }
    if !body.conditions.is_object() {
        return Err(AppError::BadRequest(
            "conditions must be a JSON object".into(),
        ));
    }
    check_template_ref(&state, body.template_id, Some(body.notification_type.as_str())).await?;

    let rule = RuleRepo::create(&state.pool, &body).await?;
    tracing::info!(rule_id = rule.id, event_type = %rule.event_type, "Rule created");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "data": rule }))))
}

/// GET /api/v1/rules
pub async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);
    let rules = RuleRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(serde_json::json!({ "data": rules })))
}

/// GET /api/v1/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let rule = RuleRepo::find_by_id(&state.pool, rule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Rule",
            id: rule_id,
        }))?;
    Ok(Json(serde_json::json!({ "data": rule })))
}

/// PATCH /api/v1/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
    Json(body): Json<UpdateRule>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(conditions) = &body.conditions {
        if !conditions.is_object() {
            return Err(AppError::BadRequest(
                "conditions must be a JSON object".into(),
            ));
        }
    }
    check_template_ref(&state, body.template_id, None).await?;

    let rule = RuleRepo::update(&state.pool, rule_id, &body)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Rule",
            id: rule_id,
        }))?;
    Ok(Json(serde_json::json!({ "data": rule })))
}

/// DELETE /api/v1/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = RuleRepo::delete(&state.pool, rule_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Rule",
            id: rule_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
