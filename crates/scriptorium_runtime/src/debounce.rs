//! Debounced auto-run-on-edit.
//!
//! Each submitted edit waits out a quiet window before executing. A newer
//! edit arriving inside the window cancels the pending execution and
//! restarts the window, so only the most recent edit in a quiet period is
//! ever executed.

use crate::dispatcher::{DispatchError, Dispatcher};
use scriptorium_core::{ExecutionRequest, ExecutionResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a debounced execution.
///
/// Resolves to the execution result once the quiet window elapses and the
/// run completes, or to [`DispatchError::Superseded`] if a newer edit
/// cancelled it.
pub struct PendingRun {
    rx: oneshot::Receiver<ExecutionResult>,
}

impl PendingRun {
    /// Wait for the outcome of this edit's execution.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` if a newer edit arrived before the quiet
    /// window elapsed.
    pub async fn result(self) -> Result<ExecutionResult, DispatchError> {
        self.rx.await.map_err(|_| DispatchError::Superseded)
    }
}

/// Debouncer in front of a dispatcher.
pub struct Debouncer {
    dispatcher: Arc<Dispatcher>,
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, window: Duration) -> Self {
        Self {
            dispatcher,
            window,
            pending: Mutex::new(None),
        }
    }

    /// The configured quiet window
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Submit an edit for debounced execution.
    ///
    /// Cancels any pending execution and restarts the quiet window.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: ExecutionRequest, timeout: Duration) -> PendingRun {
        let (tx, rx) = oneshot::channel();
        let dispatcher = Arc::clone(&self.dispatcher);
        let window = self.window;

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let result = dispatcher.execute(request, timeout).await;
            // The receiver may have been dropped; nothing to do then
            let _ = tx.send(result);
        });

        let mut pending = self.pending.lock().expect("debouncer lock poisoned");
        if let Some(previous) = pending.replace(task) {
            debug!("superseding pending execution");
            previous.abort();
        }
        PendingRun { rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptorium_core::Language;

    const RUN_TIMEOUT: Duration = Duration::from_secs(5);

    fn debouncer(window_ms: u64) -> Debouncer {
        Debouncer::new(
            Arc::new(Dispatcher::with_defaults()),
            Duration::from_millis(window_ms),
        )
    }

    #[tokio::test]
    async fn test_single_edit_executes_after_window() {
        let debouncer = debouncer(10);
        let pending = debouncer.submit(
            ExecutionRequest::new("print(1);", Language::EcmaScript),
            RUN_TIMEOUT,
        );

        let result = pending.result().await.unwrap();
        assert_eq!(result.output, "1\n");
    }

    #[tokio::test]
    async fn test_newer_edit_supersedes_pending() {
        let debouncer = debouncer(50);
        let first = debouncer.submit(
            ExecutionRequest::new("print(\"old\");", Language::EcmaScript),
            RUN_TIMEOUT,
        );
        let second = debouncer.submit(
            ExecutionRequest::new("print(\"new\");", Language::EcmaScript),
            RUN_TIMEOUT,
        );

        assert_eq!(first.result().await.unwrap_err(), DispatchError::Superseded);
        let result = second.result().await.unwrap();
        assert_eq!(result.output, "new\n");
    }

    #[tokio::test]
    async fn test_burst_of_edits_runs_only_last() {
        let debouncer = debouncer(20);
        let mut earlier = Vec::new();
        for i in 0..5 {
            earlier.push(debouncer.submit(
                ExecutionRequest::new(format!("print({});", i), Language::EcmaScript),
                RUN_TIMEOUT,
            ));
        }
        let last = debouncer.submit(
            ExecutionRequest::new("print(\"final\");", Language::EcmaScript),
            RUN_TIMEOUT,
        );

        for pending in earlier {
            assert!(pending.result().await.is_err());
        }
        assert_eq!(last.result().await.unwrap().output, "final\n");
    }

    #[tokio::test]
    async fn test_quiet_edits_both_execute() {
        let debouncer = debouncer(10);
        let first = debouncer.submit(
            ExecutionRequest::new("print(\"a\");", Language::EcmaScript),
            RUN_TIMEOUT,
        );
        let first = first.result().await.unwrap();

        let second = debouncer.submit(
            ExecutionRequest::new("print(\"b\");", Language::EcmaScript),
            RUN_TIMEOUT,
        );
        let second = second.result().await.unwrap();

        assert_eq!(first.output, "a\n");
        assert_eq!(second.output, "b\n");
    }
}
