//! Handler system for the Rivet framework.
//!
//! Handlers are plain functions whose parameters implement
//! [`FromContext`] and whose return value implements [`IntoReply`], in the
//! style of Axum's handlers. Two flavours exist:
//!
//! - [`Handler`]: `async fn`s, awaited on the request task;
//! - [`SyncHandler`]: blocking `fn`s, run on the bounded worker pool.
//!
//! Both are erased into a [`BoxedHandler`] at registration time, which
//! records the [`ExecutionMode`] so the executor can pick a strategy.
//!
//! # Example
//!
//! ```rust,ignore
//! // Async: awaited directly
//! async fn echo(args: Arguments) -> String {
//!     args.get("message").unwrap_or_default()
//! }
//!
//! // Sync: offloaded to a worker thread
//! fn checksum(args: Arguments) -> String {
//!     expensive_hash(&args.get::<String>("input").unwrap_or_default())
//! }
//!
//! CommandDefinition::new("echo").handler(echo);
//! CommandDefinition::new("checksum").sync_handler(checksum);
//! ```

mod boxed;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use rivet_core::DispatchResult;

use crate::context::InteractionContext;
use crate::extractor::FromContext;
use crate::reply::{IntoReply, Reply};

pub use boxed::{BoxedHandler, ExecutionMode};

// ============================================================================
// Handler Traits
// ============================================================================

/// An asynchronous handler.
///
/// Implemented for `async fn`s taking 0-16 [`FromContext`] parameters and
/// returning an [`IntoReply`] type.
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    fn call(self, ctx: Arc<InteractionContext>) -> BoxFuture<'static, DispatchResult<Reply>>;
}

/// A blocking handler.
///
/// Implemented for plain `fn`s taking 0-16 [`FromContext`] parameters and
/// returning an [`IntoReply`] type. Runs on a worker thread, so it may block.
pub trait SyncHandler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    fn call(self, ctx: &InteractionContext) -> DispatchResult<Reply>;
}

// ============================================================================
// Implementations for functions (Axum-style)
// ============================================================================

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoReply + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            fn call(self, ctx: Arc<InteractionContext>) -> BoxFuture<'static, DispatchResult<Reply>> {
                Box::pin(async move {
                    $(
                        let $ty = $ty::from_context(&ctx)?;
                    )*
                    (self)($($ty,)*).await.into_reply()
                })
            }
        }

        #[allow(non_snake_case, unused_variables)]
        impl<F, Res, $($ty,)*> SyncHandler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Res + Clone + Send + Sync + 'static,
            Res: IntoReply + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            fn call(self, ctx: &InteractionContext) -> DispatchResult<Reply> {
                $(
                    let $ty = $ty::from_context(ctx)?;
                )*
                (self)($($ty,)*).into_reply()
            }
        }
    };
}

// Generate implementations for 0-16 parameters
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15
);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16
);
