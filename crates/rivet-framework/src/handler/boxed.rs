use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use rivet_core::DispatchResult;

use super::{Handler, SyncHandler};
use crate::context::InteractionContext;
use crate::reply::Reply;

type AsyncFn =
    Arc<dyn Fn(Arc<InteractionContext>) -> BoxFuture<'static, DispatchResult<Reply>> + Send + Sync>;
type SyncFn = Arc<dyn Fn(&InteractionContext) -> DispatchResult<Reply> + Send + Sync>;

/// How a handler must be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Awaited on the request task.
    Async,
    /// Offloaded to the worker pool.
    Sync,
}

/// A type-erased handler stored in definitions.
///
/// Cloning is cheap; the underlying function is shared.
#[derive(Clone)]
pub enum BoxedHandler {
    Async(AsyncFn),
    Sync(SyncFn),
}

impl BoxedHandler {
    /// Erases an async handler.
    pub fn from_async<H, T>(handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        Self::Async(Arc::new(move |ctx| <H as Handler<T>>::call(handler.clone(), ctx)))
    }

    /// Erases a blocking handler.
    pub fn from_sync<H, T>(handler: H) -> Self
    where
        H: SyncHandler<T>,
        T: 'static,
    {
        Self::Sync(Arc::new(move |ctx: &InteractionContext| {
            <H as SyncHandler<T>>::call(handler.clone(), ctx)
        }))
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Async(_) => ExecutionMode::Async,
            Self::Sync(_) => ExecutionMode::Sync,
        }
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedHandler").field(&self.mode()).finish()
    }
}
