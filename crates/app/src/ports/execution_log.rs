//! Execution log port: append-only audit trail of rule executions.

use std::future::Future;
use std::sync::Arc;

use worklog_domain::error::WorklogError;
use worklog_domain::execution::Execution;
use worklog_domain::id::RuleId;

/// Append and query [`Execution`] records.
pub trait ExecutionLog {
    /// Persist one execution record.
    fn record(
        &self,
        execution: Execution,
    ) -> impl Future<Output = Result<Execution, WorklogError>> + Send;

    /// Most recent executions across all rules, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send;

    /// Most recent executions of one rule, newest first.
    fn for_rule(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send;
}

impl<T: ExecutionLog + Send + Sync> ExecutionLog for Arc<T> {
    fn record(
        &self,
        execution: Execution,
    ) -> impl Future<Output = Result<Execution, WorklogError>> + Send {
        (**self).record(execution)
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send {
        (**self).recent(limit)
    }

    fn for_rule(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send {
        (**self).for_rule(rule_id, limit)
    }
}
