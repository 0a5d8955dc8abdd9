//! Event bus port: hand events to the engine without waiting for it.

use std::future::Future;

use worklog_domain::error::WorklogError;
use worklog_domain::event::EventEnvelope;

/// Publishes host events to whoever feeds the dispatcher.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        envelope: EventEnvelope,
    ) -> impl Future<Output = Result<(), WorklogError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        envelope: EventEnvelope,
    ) -> impl Future<Output = Result<(), WorklogError>> + Send {
        (**self).publish(envelope)
    }
}
