//! `SQLite` implementation of [`RuleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use worklog_app::ports::{RuleFilter, RuleRepository};
use worklog_domain::error::{NotFoundError, ValidationError, WorklogError};
use worklog_domain::id::{RuleId, UserId};
use worklog_domain::rule::{Rule, TriggerType};
use worklog_domain::time::parse_rfc3339;

use crate::error::{StorageError, is_unique_violation};
use crate::{decode_error, format_timestamp};

struct Wrapper(Rule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Rule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let owner_id: String = row.try_get("owner_id")?;
        let trigger_type: String = row.try_get("trigger_type")?;
        let conditions_json: String = row.try_get("conditions")?;
        let actions_json: String = row.try_get("actions")?;
        let constants_json: String = row.try_get("constants")?;
        let priority: i32 = row.try_get("priority")?;
        let enabled: bool = row.try_get("enabled")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Rule {
            id: RuleId::from_str(&id).map_err(decode_error)?,
            name,
            owner_id: UserId::new(owner_id),
            trigger_type: TriggerType::from_str(&trigger_type).map_err(decode_error)?,
            conditions: serde_json::from_str(&conditions_json).map_err(decode_error)?,
            actions: serde_json::from_str(&actions_json).map_err(decode_error)?,
            constants: serde_json::from_str(&constants_json).map_err(decode_error)?,
            priority,
            enabled,
            created_at: parse_rfc3339(&created_at).map_err(decode_error)?,
            updated_at: parse_rfc3339(&updated_at).map_err(decode_error)?,
        }))
    }
}

/// Decode every row, skipping (and logging) those that no longer parse.
fn decode_all(rows: &[SqliteRow]) -> Vec<Rule> {
    rows.iter()
        .filter_map(|row| match Wrapper::from_row(row) {
            Ok(wrapper) => Some(wrapper.0),
            Err(err) => {
                let id: Option<String> = row.try_get("id").ok();
                tracing::warn!(rule_id = ?id, error = %err, "skipping undecodable rule");
                None
            }
        })
        .collect()
}

fn map_write_error(err: sqlx::Error, rule: &Rule) -> WorklogError {
    if is_unique_violation(&err) {
        ValidationError::DuplicateName {
            owner_id: rule.owner_id.to_string(),
            name: rule.name.clone(),
        }
        .into()
    } else {
        StorageError::from(err).into()
    }
}

/// `SQLite`-backed rule repository.
#[derive(Clone)]
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: Rule) -> Result<Rule, WorklogError> {
        let conditions_json = serde_json::to_string(&rule.conditions).map_err(StorageError::from)?;
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;
        let constants_json = serde_json::to_string(&rule.constants).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO rules (id, name, owner_id, trigger_type, conditions, actions, constants, priority, enabled, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rule.id.to_string())
        .bind(&rule.name)
        .bind(rule.owner_id.as_str())
        .bind(rule.trigger_type.as_str())
        .bind(&conditions_json)
        .bind(&actions_json)
        .bind(&constants_json)
        .bind(rule.priority)
        .bind(rule.enabled)
        .bind(format_timestamp(rule.created_at))
        .bind(format_timestamp(rule.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &rule))?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<Rule>, WorklogError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM rules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list(&self, filter: RuleFilter) -> Result<Vec<Rule>, WorklogError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM rules WHERE 1 = 1");
        if let Some(trigger_type) = filter.trigger_type {
            query.push(" AND trigger_type = ").push_bind(trigger_type.as_str());
        }
        if let Some(owner_id) = filter.owner_id {
            query.push(" AND owner_id = ").push_bind(owner_id.to_string());
        }
        query.push(" ORDER BY created_at, id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_all(&rows))
    }

    async fn find_enabled_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> Result<Vec<Rule>, WorklogError> {
        let rows = sqlx::query("SELECT * FROM rules WHERE enabled = 1 AND trigger_type = ?")
            .bind(trigger_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_all(&rows))
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: &UserId,
        name: &str,
    ) -> Result<Option<Rule>, WorklogError> {
        let row: Option<Wrapper> =
            sqlx::query_as("SELECT * FROM rules WHERE owner_id = ? AND name = ?")
                .bind(owner_id.as_str())
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn update(&self, rule: Rule) -> Result<Rule, WorklogError> {
        let conditions_json = serde_json::to_string(&rule.conditions).map_err(StorageError::from)?;
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;
        let constants_json = serde_json::to_string(&rule.constants).map_err(StorageError::from)?;

        let result = sqlx::query(
            "UPDATE rules SET name = ?, owner_id = ?, trigger_type = ?, conditions = ?, actions = ?, constants = ?, priority = ?, enabled = ?, created_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&rule.name)
        .bind(rule.owner_id.as_str())
        .bind(rule.trigger_type.as_str())
        .bind(&conditions_json)
        .bind(&actions_json)
        .bind(&constants_json)
        .bind(rule.priority)
        .bind(rule.enabled)
        .bind(format_timestamp(rule.created_at))
        .bind(format_timestamp(rule.updated_at))
        .bind(rule.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &rule))?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into());
        }
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), WorklogError> {
        sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
