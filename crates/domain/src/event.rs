//! Event: something that happened in the host application.
//!
//! Events are produced by the host (task lifecycle, time entries) or by
//! the periodic scanners (deadlines, budgets). The engine imposes no schema
//! on the payload beyond "path-addressable nested map".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::path;
use crate::rule::TriggerType;
use crate::time::{Timestamp, now};

/// A typed event handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub trigger_type: TriggerType,
    pub payload: Value,
    pub occurred_at: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(trigger_type: TriggerType, payload: Value) -> Self {
        Self {
            trigger_type,
            payload,
            occurred_at: now(),
        }
    }

    /// Look up a field for condition evaluation.
    ///
    /// The path is first resolved from the payload root. If that fails it is
    /// resolved again under the event's subject object, so that a clause on
    /// `estimated_hours` finds `task.estimated_hours` on a task event.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&Value> {
        path::resolve(&self.payload, field).or_else(|| {
            let subject = self.payload.get(self.trigger_type.subject())?;
            path::resolve(subject, field)
        })
    }
}

/// The untyped `{type, payload}` shape events arrive in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(serde_json::Map::new())
}

impl EventEnvelope {
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

impl TryFrom<EventEnvelope> for Event {
    type Error = ValidationError;

    fn try_from(envelope: EventEnvelope) -> Result<Self, Self::Error> {
        let trigger_type = envelope.kind.parse()?;
        Ok(Self::new(trigger_type, envelope.payload))
    }
}
