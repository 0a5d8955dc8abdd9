//! Execution service: read-side queries over the execution log.

use worklog_domain::error::WorklogError;
use worklog_domain::execution::Execution;
use worklog_domain::id::RuleId;

use crate::ports::ExecutionLog;

/// Limit used when the caller gives none.
pub const DEFAULT_LIMIT: usize = 50;
/// Upper bound on any single query.
pub const MAX_LIMIT: usize = 500;

/// Application service for execution history.
pub struct ExecutionService<L> {
    log: L,
}

impl<L: ExecutionLog> ExecutionService<L> {
    pub fn new(log: L) -> Self {
        Self { log }
    }

    /// Most recent executions, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<Execution>, WorklogError> {
        self.log.recent(clamp(limit)).await
    }

    /// Most recent executions of one rule, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn for_rule(
        &self,
        rule_id: RuleId,
        limit: Option<usize>,
    ) -> Result<Vec<Execution>, WorklogError> {
        self.log.for_rule(rule_id, clamp(limit)).await
    }
}

fn clamp(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
