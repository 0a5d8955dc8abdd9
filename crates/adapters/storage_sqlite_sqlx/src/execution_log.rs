//! `SQLite` implementation of [`ExecutionLog`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use worklog_app::ports::ExecutionLog;
use worklog_domain::error::WorklogError;
use worklog_domain::execution::Execution;
use worklog_domain::id::{ExecutionId, RuleId};
use worklog_domain::rule::TriggerType;
use worklog_domain::time::parse_rfc3339;

use crate::error::StorageError;
use crate::{decode_error, format_timestamp};

struct Wrapper(Execution);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let rule_id: String = row.try_get("rule_id")?;
        let rule_name: String = row.try_get("rule_name")?;
        let trigger_type: String = row.try_get("trigger_type")?;
        let executed_at: String = row.try_get("executed_at")?;
        let success: bool = row.try_get("success")?;
        let results_json: String = row.try_get("results")?;

        Ok(Self(Execution {
            id: ExecutionId::from_str(&id).map_err(decode_error)?,
            rule_id: RuleId::from_str(&rule_id).map_err(decode_error)?,
            rule_name,
            trigger_type: TriggerType::from_str(&trigger_type).map_err(decode_error)?,
            executed_at: parse_rfc3339(&executed_at).map_err(decode_error)?,
            success,
            results: serde_json::from_str(&results_json).map_err(decode_error)?,
        }))
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// `SQLite`-backed, append-only execution log.
#[derive(Clone)]
pub struct SqliteExecutionLog {
    pool: SqlitePool,
}

impl SqliteExecutionLog {
    /// Create a new log backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ExecutionLog for SqliteExecutionLog {
    async fn record(&self, execution: Execution) -> Result<Execution, WorklogError> {
        let results_json = serde_json::to_string(&execution.results).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO executions (id, rule_id, rule_name, trigger_type, executed_at, success, results) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(execution.id.to_string())
        .bind(execution.rule_id.to_string())
        .bind(&execution.rule_name)
        .bind(execution.trigger_type.as_str())
        .bind(format_timestamp(execution.executed_at))
        .bind(execution.success)
        .bind(&results_json)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(execution)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Execution>, WorklogError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM executions ORDER BY executed_at DESC, rowid DESC LIMIT ?",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn for_rule(&self, rule_id: RuleId, limit: usize) -> Result<Vec<Execution>, WorklogError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM executions WHERE rule_id = ? ORDER BY executed_at DESC, rowid DESC LIMIT ?",
        )
        .bind(rule_id.to_string())
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
