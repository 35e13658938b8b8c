//! Repository for the `rules` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::rule::{CreateRule, Rule, UpdateRule};

/// Column list for `rules` queries.
const COLUMNS: &str = "\
    id, name, event_type, notification_type, template_id, conditions, \
    is_active, priority, created_at, updated_at";

/// Provides CRUD operations for notification rules.
pub struct RuleRepo;

impl RuleRepo {
    /// Insert a new rule, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateRule) -> Result<Rule, sqlx::Error> {
        let query = format!(
            "INSERT INTO rules \
                 (name, event_type, notification_type, template_id, conditions, is_active, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rule>(&query)
            .bind(&input.name)
            .bind(&input.event_type)
            .bind(input.notification_type.as_str())
            .bind(input.template_id)
            .bind(&input.conditions)
            .bind(input.is_active.unwrap_or(true))
            .bind(input.priority.unwrap_or(1))
            .fetch_one(pool)
            .await
    }

    /// Find a rule by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rules WHERE id = $1");
        sqlx::query_as::<_, Rule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active rules for an event type.
    ///
    /// Ordered by priority descending with rule ID ascending as the tie
    /// breaker, so repeated invocations on unchanged data return the same
    /// sequence.
    pub async fn list_active_for_event(
        pool: &PgPool,
        event_type: &str,
    ) -> Result<Vec<Rule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rules \
             WHERE event_type = $1 AND is_active = true \
             ORDER BY priority DESC, id ASC"
        );
        sqlx::query_as::<_, Rule>(&query)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }

    /// List all rules.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Rule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rules ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Rule>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Patch a rule. Fields left `None` keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRule,
    ) -> Result<Option<Rule>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET \
                 name = COALESCE($2, name), \
                 template_id = COALESCE($3, template_id), \
                 conditions = COALESCE($4, conditions), \
                 is_active = COALESCE($5, is_active), \
                 priority = COALESCE($6, priority), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rule>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.template_id)
            .bind(&input.conditions)
            .bind(input.is_active)
            .bind(input.priority)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
