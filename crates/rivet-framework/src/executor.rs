//! Handler execution.
//!
//! [`Executor::invoke`] is the single entry point for running a routed
//! handler. The strategy follows the handler's [`ExecutionMode`]:
//!
//! - async handlers are awaited on the request task;
//! - sync handlers are offloaded to the blocking pool, gated by a semaphore
//!   sized at startup so at most `worker_threads` run at once.
//!
//! Both paths share one timeout and convert panics into handler faults, so a
//! misbehaving handler can never take the process down.
//!
//! [`ExecutionMode`]: crate::handler::ExecutionMode

use std::any::Any;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rivet_core::{DispatchError, DispatchResult};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::check::{Check, run_checks};
use crate::context::InteractionContext;
use crate::handler::BoxedHandler;
use crate::reply::Reply;

/// Default per-invocation budget, below the platform's 3 second window.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(2500);

/// Default number of concurrently running sync handlers.
pub const DEFAULT_WORKER_THREADS: usize = 8;

/// Runs handlers under a timeout and a bounded worker pool.
#[derive(Debug, Clone)]
pub struct Executor {
    workers: Arc<Semaphore>,
    worker_threads: usize,
    timeout: Duration,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_THREADS, DEFAULT_RESPONSE_TIMEOUT)
    }
}

impl Executor {
    /// Creates an executor. A pool size of zero is raised to one.
    pub fn new(worker_threads: usize, timeout: Duration) -> Self {
        let worker_threads = worker_threads.max(1);
        Self {
            workers: Arc::new(Semaphore::new(worker_threads)),
            worker_threads,
            timeout,
        }
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of sync handlers that could start right now.
    pub fn idle_workers(&self) -> usize {
        self.workers.available_permits()
    }

    /// Runs `handler` with `ctx`.
    ///
    /// Handler errors, panics and timeouts are all returned as errors; this
    /// method never panics itself. If the returned future is dropped, a sync
    /// handler that already started keeps running and its result is
    /// discarded.
    pub async fn invoke(
        &self,
        handler: &BoxedHandler,
        ctx: InteractionContext,
    ) -> DispatchResult<Reply> {
        self.invoke_within(handler, ctx, self.timeout).await
    }

    /// Like [`invoke`](Self::invoke), with an explicit budget.
    ///
    /// Used for error handlers, which only get what is left of the
    /// request's budget.
    pub async fn invoke_within(
        &self,
        handler: &BoxedHandler,
        ctx: InteractionContext,
        budget: Duration,
    ) -> DispatchResult<Reply> {
        let run = async {
            match handler {
                BoxedHandler::Async(f) => {
                    let fut = f(Arc::new(ctx));
                    AssertUnwindSafe(fut)
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| Err(panic_fault(panic.as_ref())))
                }
                BoxedHandler::Sync(f) => self.run_blocking(f.clone(), ctx).await,
            }
        };

        match tokio::time::timeout(budget, run).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout { budget }),
        }
    }

    /// Runs a check pipeline inline, catching panics.
    pub fn check(
        &self,
        checks: &[Check],
        ctx: &InteractionContext,
    ) -> DispatchResult<ControlFlow<Reply>> {
        std::panic::catch_unwind(AssertUnwindSafe(|| run_checks(checks, ctx)))
            .map_err(|panic| panic_fault(panic.as_ref()))
    }

    async fn run_blocking(
        &self,
        f: Arc<dyn Fn(&InteractionContext) -> DispatchResult<Reply> + Send + Sync>,
        ctx: InteractionContext,
    ) -> DispatchResult<Reply> {
        let permit = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DispatchError::fault("worker pool is closed"))?;
        debug!(idle = self.workers.available_permits(), "Worker acquired");

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f(&ctx)
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(panic_fault(e.into_panic().as_ref())),
            Err(e) => Err(DispatchError::fault(format!("worker task failed: {e}"))),
        }
    }
}

fn panic_fault(panic: &(dyn Any + Send)) -> DispatchError {
    let message = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    error!(panic = message, "Handler panicked");
    DispatchError::fault(format!("handler panicked: {message}"))
}
