//! Repository for the `templates` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateTemplate, Template};

/// Column list for `templates` queries.
const COLUMNS: &str = "id, name, notification_type, subject, body, variables, created_at";

/// Provides CRUD operations for notification templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (name, notification_type, subject, body, variables) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(input.notification_type.as_str())
            .bind(&input.subject)
            .bind(&input.body)
            .bind(&input.variables)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all templates.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Template>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete a template. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
