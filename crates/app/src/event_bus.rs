//! In-process event queue backed by a bounded tokio mpsc channel.
//!
//! Host code that does not want to wait for rule processing publishes
//! envelopes here; a single listener forwards each one through the detached
//! dispatch path. A full queue makes publishers wait rather than drop
//! events, and a stopped listener still dispatches what was already queued.

use std::future::Future;

use tokio::sync::mpsc;

use worklog_domain::error::WorklogError;
use worklog_domain::event::EventEnvelope;

use crate::background::BackgroundTask;
use crate::dispatcher::EventDispatcher;
use crate::ports::{EventPublisher, ExecutionLog, RuleRepository};

/// Publishing half of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InProcessEventBus {
    sender: mpsc::Sender<EventEnvelope>,
}

/// Consuming half of the queue, turned into a listener by [`EventQueue::listen`].
#[derive(Debug)]
pub struct EventQueue {
    receiver: mpsc::Receiver<EventEnvelope>,
}

impl InProcessEventBus {
    /// Create a queue holding at most `capacity` undelivered envelopes.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, EventQueue) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, EventQueue { receiver })
    }
}

impl EventQueue {
    /// Forward every published envelope to `dispatcher`, detached.
    ///
    /// On stop, the queue is closed and envelopes already accepted are
    /// still dispatched before the task returns.
    pub fn listen<RR, EL>(self, dispatcher: EventDispatcher<RR, EL>) -> BackgroundTask
    where
        RR: RuleRepository + Send + Sync + 'static,
        EL: ExecutionLog + Send + Sync + 'static,
    {
        let mut receiver = self.receiver;
        BackgroundTask::spawn("event-listener", move |mut stopped| async move {
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    received = receiver.recv() => match received {
                        Some(envelope) => dispatcher.dispatch_envelope_detached(envelope),
                        None => return,
                    },
                }
            }

            receiver.close();
            let mut flushed = 0_usize;
            while let Some(envelope) = receiver.recv().await {
                dispatcher.dispatch_envelope_detached(envelope);
                flushed += 1;
            }
            if flushed > 0 {
                tracing::info!(flushed, "dispatched queued events on stop");
            }
        })
    }
}

impl EventPublisher for InProcessEventBus {
    /// Waits for room when the queue is full. Fails only once the listener
    /// has stopped.
    fn publish(
        &self,
        envelope: EventEnvelope,
    ) -> impl Future<Output = Result<(), WorklogError>> + Send {
        let sender = self.sender.clone();
        async move {
            sender.send(envelope).await.map_err(|_| {
                tracing::warn!("event published after the queue was closed");
                WorklogError::Storage("event queue is closed".into())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::actions::ActionExecutor;
    use crate::rule_engine::RuleEngine;
    use crate::testing::{InMemoryExecutionLog, InMemoryRuleRepo, SpyWorkspace, builtin_registry};
    use serde_json::json;
    use worklog_domain::rule::{Rule, TriggerType};

    type Dispatcher = EventDispatcher<InMemoryRuleRepo, Arc<InMemoryExecutionLog>>;

    fn on_create() -> (Dispatcher, Arc<InMemoryExecutionLog>) {
        let rule = Rule::builder()
            .name("on create")
            .owner("7")
            .trigger(TriggerType::TaskCreated)
            .build()
            .unwrap();
        let spy = Arc::new(SpyWorkspace::default());
        let log = Arc::new(InMemoryExecutionLog::default());
        let dispatcher = EventDispatcher::new(RuleEngine::new(
            InMemoryRuleRepo::with(vec![rule]),
            log.clone(),
            ActionExecutor::new(builtin_registry(&spy)),
        ));
        (dispatcher, log)
    }

    fn created(n: usize) -> EventEnvelope {
        EventEnvelope::new("task_created", json!({"task": {"id": n}}))
    }

    #[tokio::test]
    async fn should_forward_published_events_to_dispatcher() {
        let (dispatcher, log) = on_create();
        let (bus, queue) = InProcessEventBus::channel(16);
        let listener = queue.listen(dispatcher.clone());

        bus.publish(created(1)).await.unwrap();
        bus.publish(EventEnvelope::new("unknown", json!({})))
            .await
            .unwrap();
        for _ in 0..50 {
            if dispatcher.in_flight_count() > 0 || !log.all().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        listener.stop().await;
        dispatcher.drain().await;

        assert_eq!(log.all().len(), 1);
    }

    #[tokio::test]
    async fn should_execute_every_event_of_a_burst_larger_than_capacity() {
        let (dispatcher, log) = on_create();
        let (bus, queue) = InProcessEventBus::channel(8);
        let listener = queue.listen(dispatcher.clone());

        for n in 0..300 {
            bus.publish(created(n)).await.unwrap();
        }
        listener.stop().await;
        dispatcher.drain().await;

        assert_eq!(log.all().len(), 300);
    }

    #[tokio::test]
    async fn should_dispatch_events_queued_before_stop() {
        let (dispatcher, log) = on_create();
        let (bus, queue) = InProcessEventBus::channel(16);
        for n in 0..5 {
            bus.publish(created(n)).await.unwrap();
        }

        queue.listen(dispatcher.clone()).stop().await;
        dispatcher.drain().await;

        assert_eq!(log.all().len(), 5);
    }

    #[tokio::test]
    async fn should_fail_publish_once_listener_is_gone() {
        let (bus, queue) = InProcessEventBus::channel(4);
        drop(queue);

        let result = bus.publish(created(1)).await;

        assert!(matches!(result, Err(WorklogError::Storage(_))));
    }
}
