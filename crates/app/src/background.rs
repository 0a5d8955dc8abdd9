//! Handle for a long-running background loop with an explicit stop.

use std::future::Future;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A spawned loop that runs until [`BackgroundTask::stop`] is called.
pub struct BackgroundTask {
    name: &'static str,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Spawn `run`, handing it the receiver that resolves on stop.
    ///
    /// The loop must return once the receiver resolves; it also resolves
    /// if the handle is dropped without calling `stop`.
    pub fn spawn<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(run(stopped));
        tracing::debug!(task = name, "background task started");
        Self { name, stop, handle }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal the loop and wait for it to return.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.handle.await {
            tracing::warn!(task = self.name, error = %err, "background task ended abnormally");
        } else {
            tracing::debug!(task = self.name, "background task stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn should_run_until_stopped() {
        let exited = Arc::new(AtomicBool::new(false));
        let flag = exited.clone();
        let task = BackgroundTask::spawn("test", move |stopped| async move {
            let _ = stopped.await;
            flag.store(true, Ordering::SeqCst);
        });

        assert_eq!(task.name(), "test");
        tokio::task::yield_now().await;
        assert!(!exited.load(Ordering::SeqCst));

        task.stop().await;
        assert!(exited.load(Ordering::SeqCst));
    }
}
