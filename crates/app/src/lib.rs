//! # worklog-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository`: CRUD for rules
//!   - `ExecutionLog`: append & query execution records
//!   - `NotificationService`, `TimeEntryService`, `TaskService`,
//!     `ProjectService`: the host collaborators actions call into
//!   - `DeadlineProvider`, `BudgetProvider`: data feeding the periodic scanner
//!   - `EventPublisher`: hand events to the engine asynchronously
//! - Provide the engine itself:
//!   - `ActionRegistry` / `ActionExecutor`: pluggable action kinds
//!   - `RuleEngine`: load, order, evaluate, execute, record
//!   - `EventDispatcher`: the never-failing entry point (sync + detached)
//!   - `Scanner`: periodic deadline / budget checks
//! - Define **driving/inbound** use-cases: `RuleService`, `ExecutionService`
//!
//! ## Dependency rule
//! Depends on `worklog-domain` only (plus `tokio` for timers, tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod actions;
pub mod background;
pub mod dispatcher;
pub mod event_bus;
pub mod ports;
pub mod rule_engine;
pub mod scanner;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
