//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`WorklogError`] via `#[from]`.

/// Top-level error returned by use-cases and ports.
#[derive(Debug, thiserror::Error)]
pub enum WorklogError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected when writing a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("owner must not be empty")]
    EmptyOwner,

    #[error("unknown trigger type `{0}`")]
    UnknownTriggerType(String),

    #[error("a rule named `{name}` already exists for owner `{owner_id}`")]
    DuplicateName { owner_id: String, name: String },

    #[error("condition #{index} has an empty field path")]
    EmptyConditionField { index: usize },

    #[error("condition #{index} uses unsupported operator `{operator}`")]
    UnsupportedOperator { index: usize, operator: String },

    #[error("condition #{index}: operator `in` expects a list value")]
    ExpectedList { index: usize },

    #[error("action #{index} has an empty kind")]
    EmptyActionKind { index: usize },

    #[error("action #{index} uses unknown kind `{kind}`")]
    UnknownActionKind { index: usize, kind: String },

    #[error("invalid identifier `{0}`")]
    InvalidId(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
