//! Execution dispatcher.
//!
//! Stateless: every call looks up the engine, runs it on the blocking
//! pool, and measures wall-clock duration. Concurrent calls for
//! independent requests are safe; engines share no mutable state.

use scriptorium_core::{CoreError, ExecutionRequest, ExecutionResult, RequestId};
use scriptorium_engine::EngineRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Dispatch-level error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A newer edit superseded this execution before it ran
    #[error("execution superseded by a newer edit")]
    Superseded,
}

/// Routes a (code, language) pair to the matching engine.
pub struct Dispatcher {
    registry: Arc<EngineRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    #[must_use]
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    /// Create a dispatcher over the five stock engines
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(EngineRegistry::with_defaults()))
    }

    /// The registry this dispatcher routes through
    #[must_use]
    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Execute a request under a timeout guard.
    ///
    /// Never returns an error and never panics: an unregistered language,
    /// an engine failure, an engine panic, and an elapsed timeout all come
    /// back as an [`ExecutionResult`] carrying diagnostic text. On
    /// timeout the in-flight engine task is abandoned and its partial
    /// output discarded; the caller sees at most one outcome per request.
    pub async fn execute(&self, request: ExecutionRequest, timeout: Duration) -> ExecutionResult {
        let Ok(engine) = self.registry.get(request.language) else {
            warn!(language = %request.language, "no engine registered");
            return ExecutionResult::unsupported_language();
        };

        let request_id = RequestId::new();
        debug!(%request_id, language = %request.language, bytes = request.code.len(), "dispatching");
        let started = Instant::now();
        let code = request.code;
        let handle = tokio::task::spawn_blocking(move || engine.run(&code));
        let abort = handle.abort_handle();

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(output))) => {
                let elapsed = elapsed_ms(started);
                match output.error {
                    None => ExecutionResult::success(output.output, elapsed),
                    Some(error) => ExecutionResult::failure(error, elapsed),
                }
            }
            Ok(Ok(Err(engine_error))) => {
                // Malformed input and other engine-level errors become data
                ExecutionResult::failure(engine_error.to_string(), elapsed_ms(started))
            }
            Ok(Err(join_error)) => {
                warn!(%join_error, "engine task died");
                let error = CoreError::EngineFailure {
                    message: join_error.to_string(),
                };
                ExecutionResult::failure(error.to_string(), elapsed_ms(started))
            }
            Err(_) => {
                // A blocking engine cannot be interrupted mid-run; dropping
                // the aborted handle discards whatever it produces.
                abort.abort();
                debug!(%request_id, "execution timed out");
                ExecutionResult::timed_out(elapsed_ms(started))
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
