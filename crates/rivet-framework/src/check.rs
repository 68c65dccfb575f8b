//! Pre-invoke checks for commands.
//!
//! A [`Check`] inspects the routed [`InteractionContext`] before the command
//! handler runs. Returning [`ControlFlow::Break`] with a [`Reply`] aborts the
//! invocation and answers with that reply instead:
//!
//! ```rust,ignore
//! CommandDefinition::new("ban")
//!     .check(Check::guild_only("This command only works in servers."))
//!     .check(Check::new(|ctx| {
//!         if ctx.arguments().contains("reason") {
//!             ControlFlow::Continue(())
//!         } else {
//!             ControlFlow::Break(Reply::ephemeral("Give a reason."))
//!         }
//!     }))
//!     .handler(ban);
//! ```
//!
//! Checks run in registration order on the request task, after argument
//! coercion. They should be cheap; blocking work belongs in a sync handler.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::context::InteractionContext;
use crate::reply::Reply;

type CheckFn = Arc<dyn Fn(&InteractionContext) -> ControlFlow<Reply> + Send + Sync>;

/// A single step of a command's check pipeline.
#[derive(Clone)]
pub struct Check(CheckFn);

impl Check {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&InteractionContext) -> ControlFlow<Reply> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Rejects invocations outside a guild with an ephemeral `message`.
    pub fn guild_only(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |ctx| match ctx.interaction().guild_id {
            Some(_) => ControlFlow::Continue(()),
            None => ControlFlow::Break(Reply::ephemeral(message.clone())),
        })
    }

    pub fn run(&self, ctx: &InteractionContext) -> ControlFlow<Reply> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Check")
    }
}

/// Runs `checks` in order, stopping at the first one that breaks.
pub fn run_checks(checks: &[Check], ctx: &InteractionContext) -> ControlFlow<Reply> {
    for check in checks {
        check.run(ctx)?;
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_core::decode_interaction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx(payload: &str) -> InteractionContext {
        InteractionContext::new(Arc::new(decode_interaction(payload.as_bytes()).unwrap()))
    }

    #[test]
    fn test_guild_only() {
        let check = Check::guild_only("servers only");
        let dm = ctx(r#"{"type":2,"data":{"name":"x"}}"#);
        assert_eq!(
            check.run(&dm),
            ControlFlow::Break(Reply::ephemeral("servers only"))
        );

        let guild = ctx(r#"{"type":2,"guild_id":"9","data":{"name":"x"}}"#);
        assert_eq!(check.run(&guild), ControlFlow::Continue(()));
    }

    #[test]
    fn test_pipeline_stops_at_first_break() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = calls.clone();
            Check::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            })
        };
        let deny = Check::new(|_| ControlFlow::Break(Reply::ephemeral("no")));

        let checks = [counted.clone(), deny, counted];
        let flow = run_checks(&checks, &ctx(r#"{"type":2,"data":{"name":"x"}}"#));
        assert_eq!(flow, ControlFlow::Break(Reply::ephemeral("no")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
