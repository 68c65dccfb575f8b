//! Interaction dispatcher for the Rivet framework.
//!
//! The [`Dispatcher`] ties routing, execution and response building
//! together. Every decoded interaction yields exactly one
//! [`InteractionResponse`]: failures after decoding are reported to the
//! invoking user as an ephemeral message (or an empty choice list for
//! autocomplete), never as a transport error.
//!
//! Between routing and execution the command's checks run; a check that
//! breaks answers in place of the handler. When the handler fails and its
//! definition has an error handler, that handler's reply replaces the
//! generic notice.
//!
//! ```rust,ignore
//! let registry = RegistryBuilder::new()
//!     .command(CommandDefinition::new("echo").param(ParameterSpec::string("message")).handler(echo))
//!     .build()?;
//! let dispatcher = Dispatcher::new(registry, Executor::default());
//!
//! let response = dispatcher.dispatch(interaction).await;
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;

use rivet_core::{
    DispatchError, DispatchResult, ErrorCategory, Interaction, InteractionResponse,
    InteractionType,
};
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, error, field, info_span, warn};

use crate::context::InteractionContext;
use crate::executor::Executor;
use crate::handler::BoxedHandler;
use crate::registry::Registry;
use crate::reply::Reply;
use crate::response::build_response;
use crate::router::Router;

/// Routes, runs and answers interactions.
///
/// Cheap to clone; all state is shared and read-only.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    executor: Executor,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, executor: Executor) -> Self {
        Self {
            router: Router::new(registry),
            executor,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Answers one interaction. Never fails.
    pub async fn dispatch(&self, interaction: Interaction) -> InteractionResponse {
        let kind = interaction.interaction_type();
        let span = info_span!(
            "interaction",
            id = %interaction.id,
            kind = ?kind,
            guild = ?interaction.guild_id,
            route = field::Empty,
        );

        async move {
            match self.try_dispatch(interaction).await {
                Ok(response) => {
                    debug!(response = ?response.kind, "Interaction answered");
                    response
                }
                Err(err) => error_response(kind, &err),
            }
        }
        .instrument(span)
        .await
    }

    /// Answers one interaction, returning errors instead of converting them.
    pub async fn try_dispatch(&self, interaction: Interaction) -> DispatchResult<InteractionResponse> {
        let started = Instant::now();
        let kind = interaction.interaction_type();
        if kind == InteractionType::Ping {
            return Ok(InteractionResponse::pong());
        }

        let mut route = self.router.route(&interaction)?;
        Span::current().record("route", route.label.as_str());

        let handler = route.handler.clone();
        let checks = std::mem::take(&mut route.checks);
        let on_error = route.on_error.take();
        let ctx = route.into_context(Arc::new(interaction));

        let result = match self.executor.check(&checks, &ctx) {
            Ok(ControlFlow::Break(reply)) => {
                debug!(reply = reply.kind_name(), "Check stopped invocation");
                Ok(reply)
            }
            Ok(ControlFlow::Continue(())) => self.executor.invoke(&handler, ctx.clone()).await,
            Err(err) => Err(err),
        };
        let result = result.and_then(|reply| respond(kind, reply));

        match (result, on_error) {
            (Err(err), Some(on_error)) if err.category() == ErrorCategory::HandlerFault => {
                self.recover(kind, &on_error, ctx, err, started).await
            }
            (result, _) => result,
        }
    }

    /// Runs the error handler with what is left of the response budget.
    ///
    /// If it fails too, the original error is returned.
    async fn recover(
        &self,
        kind: InteractionType,
        on_error: &BoxedHandler,
        ctx: InteractionContext,
        err: DispatchError,
        started: Instant,
    ) -> DispatchResult<InteractionResponse> {
        warn!(error = %err, "Handler failed, running its error handler");
        let budget = self.executor.timeout().saturating_sub(started.elapsed());
        let recovered = self
            .executor
            .invoke_within(on_error, ctx.with_error(err.clone()), budget)
            .await
            .and_then(|reply| respond(kind, reply));

        recovered.map_err(|e| {
            error!(error = %e, "Error handler failed");
            err
        })
    }
}

fn respond(kind: InteractionType, reply: Reply) -> DispatchResult<InteractionResponse> {
    build_response(kind, reply).map_err(|e| {
        error!(error = %e, "Handler produced an invalid reply");
        DispatchError::from(e)
    })
}

/// The response sent when dispatch fails.
fn error_response(kind: InteractionType, err: &DispatchError) -> InteractionResponse {
    match err.category() {
        ErrorCategory::HandlerFault => error!(error = %err, "Handler failed"),
        _ => warn!(error = %err, "Interaction rejected"),
    }

    if kind == InteractionType::Autocomplete {
        InteractionResponse::autocomplete(Vec::new())
    } else {
        InteractionResponse::ephemeral_notice(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Check;
    use crate::coerce::{Arguments, ParameterSpec};
    use crate::command::CommandDefinition;
    use crate::component::ComponentDefinition;
    use crate::context::FocusedOption;
    use crate::extractor::State;
    use crate::registry::RegistryBuilder;
    use crate::reply::Reply;
    use crate::state::encode_state;
    use rivet_core::model::{ResponseData, ResponseType};
    use rivet_core::{ButtonStyle, Component, Message, decode_interaction};
    use serde_json::json;
    use std::time::Duration;

    async fn echo(args: Arguments) -> String {
        args.get::<String>("message").unwrap_or_default()
    }

    async fn increment(State((count,)): State<(i64,)>) -> Result<Reply, crate::error::CodecError> {
        let next = count + 1;
        let id = encode_state("ctr", (next,))?;
        Ok(Reply::update(
            Message::new(format!("Count: {next}"))
                .row(Component::button(ButtonStyle::Primary, "+1", id)),
        ))
    }

    async fn suggest(focused: FocusedOption) -> Reply {
        let typed = focused.text();
        Reply::autocomplete(
            ["apple", "apricot", "banana"]
                .into_iter()
                .filter(|f| f.starts_with(&typed)),
        )
    }

    async fn broken() -> Result<String, String> {
        Err("database down".to_string())
    }

    async fn bad_reply() -> Reply {
        Reply::update("not allowed here")
    }

    async fn inside() -> &'static str {
        "inside"
    }

    async fn apologise(err: DispatchError) -> Reply {
        let timed_out = matches!(err, DispatchError::Timeout { .. });
        Reply::ephemeral(format!("Sorry, that failed (timeout: {timed_out})."))
    }

    fn apologise_blocking(_: DispatchError) -> Reply {
        Reply::ephemeral("Sorry, from a worker.")
    }

    fn dispatcher() -> Dispatcher {
        let registry = RegistryBuilder::new()
            .command(
                CommandDefinition::new("echo")
                    .param(ParameterSpec::string("message"))
                    .handler(echo),
            )
            .command(
                CommandDefinition::new("fruit")
                    .param(ParameterSpec::string("name"))
                    .handler(echo)
                    .autocomplete("name", suggest),
            )
            .command(CommandDefinition::new("broken").handler(broken))
            .command(CommandDefinition::new("bad").handler(bad_reply))
            .command(
                CommandDefinition::new("guarded")
                    .check(Check::guild_only("servers only"))
                    .handler(inside),
            )
            .command(CommandDefinition::new("fragile").handler(broken).on_error(apologise))
            .command(
                CommandDefinition::new("fragile_sync")
                    .handler(broken)
                    .sync_on_error(apologise_blocking),
            )
            .command(CommandDefinition::new("hopeless").handler(broken).on_error(broken))
            .command(
                CommandDefinition::new("rejected")
                    .check(Check::new(|_| panic!("check exploded")))
                    .handler(inside)
                    .on_error(apologise),
            )
            .component(ComponentDefinition::new::<(i64,)>("ctr").handler(increment))
            .component(ComponentDefinition::new::<()>("flaky").handler(broken).on_error(apologise))
            .build()
            .unwrap();
        Dispatcher::new(registry, Executor::new(2, Duration::from_millis(500)))
    }

    fn decode(value: serde_json::Value) -> Interaction {
        decode_interaction(value.to_string().as_bytes()).unwrap()
    }

    fn content(response: &InteractionResponse) -> Option<&str> {
        match &response.data {
            Some(ResponseData::Message(m)) => m.content.as_deref(),
            _ => None,
        }
    }

    fn is_ephemeral(response: &InteractionResponse) -> bool {
        matches!(&response.data, Some(ResponseData::Message(m)) if m.is_ephemeral())
    }

    #[tokio::test]
    async fn test_ping() {
        let response = dispatcher().dispatch(decode(json!({"type": 1}))).await;
        assert_eq!(response, InteractionResponse::pong());
    }

    #[tokio::test]
    async fn test_echo() {
        let response = dispatcher()
            .dispatch(decode(json!({
                "type": 2,
                "data": {"name": "echo", "options": [{"name": "message", "type": 3, "value": "hi"}]}
            })))
            .await;
        assert_eq!(response.kind, ResponseType::ChannelMessage);
        assert_eq!(content(&response), Some("hi"));
        assert!(!is_ephemeral(&response));
    }

    #[tokio::test]
    async fn test_counter_button() {
        let id = encode_state("ctr", (5_i64,)).unwrap();
        let response = dispatcher()
            .dispatch(decode(json!({
                "type": 3,
                "data": {"custom_id": id, "component_type": 2}
            })))
            .await;
        assert_eq!(response.kind, ResponseType::UpdateMessage);
        assert_eq!(content(&response), Some("Count: 6"));

        let Some(ResponseData::Message(message)) = &response.data else {
            panic!("expected message data");
        };
        let rows = message.components.as_ref().unwrap();
        let next_id = rows[0].components[0].custom_id.as_deref().unwrap();
        assert_eq!(crate::state::decode_state::<(i64,)>("ctr", next_id), Ok((6,)));
    }

    #[tokio::test]
    async fn test_autocomplete() {
        let response = dispatcher()
            .dispatch(decode(json!({
                "type": 4,
                "data": {"name": "fruit", "options": [{"name": "name", "type": 3, "value": "ap", "focused": true}]}
            })))
            .await;
        assert_eq!(response.kind, ResponseType::AutocompleteResult);
        let Some(ResponseData::Autocomplete(data)) = &response.data else {
            panic!("expected choices");
        };
        let names: Vec<_> = data.choices.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["apple", "apricot"]);
    }

    #[tokio::test]
    async fn test_failed_autocomplete_returns_no_choices() {
        let response = dispatcher()
            .dispatch(decode(json!({"type": 4, "data": {"name": "missing"}})))
            .await;
        assert_eq!(response, InteractionResponse::autocomplete(Vec::new()));
    }

    #[tokio::test]
    async fn test_errors_become_ephemeral_notices() {
        let dispatcher = dispatcher();

        let unknown = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "nope"}})))
            .await;
        assert!(is_ephemeral(&unknown));

        let missing_arg = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "echo"}})))
            .await;
        assert!(is_ephemeral(&missing_arg));
        assert!(content(&missing_arg).unwrap().contains("message"));

        let fault = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "broken"}})))
            .await;
        assert!(is_ephemeral(&fault));
        assert!(!content(&fault).unwrap().contains("database"));

        let stale = dispatcher
            .dispatch(decode(json!({
                "type": 3,
                "data": {"custom_id": "ctr:garbage", "component_type": 2}
            })))
            .await;
        assert!(is_ephemeral(&stale));
    }

    #[tokio::test]
    async fn test_invalid_reply_is_fault() {
        let err = dispatcher()
            .try_dispatch(decode(json!({"type": 2, "data": {"name": "bad"}})))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::HandlerFault);
    }

    #[tokio::test]
    async fn test_check_rejects_before_handler() {
        let response = dispatcher()
            .dispatch(decode(json!({"type": 2, "data": {"name": "guarded"}})))
            .await;
        assert!(is_ephemeral(&response));
        assert_eq!(content(&response), Some("servers only"));
    }

    #[tokio::test]
    async fn test_check_passes_to_handler() {
        let response = dispatcher()
            .dispatch(decode(json!({"type": 2, "guild_id": "7", "data": {"name": "guarded"}})))
            .await;
        assert_eq!(content(&response), Some("inside"));
        assert!(!is_ephemeral(&response));
    }

    #[tokio::test]
    async fn test_error_handler_replaces_notice() {
        let dispatcher = dispatcher();

        let response = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "fragile"}})))
            .await;
        assert_eq!(content(&response), Some("Sorry, that failed (timeout: false)."));
        assert!(is_ephemeral(&response));

        let response = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "fragile_sync"}})))
            .await;
        assert_eq!(content(&response), Some("Sorry, from a worker."));

        let response = dispatcher
            .dispatch(decode(json!({"type": 3, "data": {"custom_id": "flaky", "component_type": 2}})))
            .await;
        assert_eq!(content(&response), Some("Sorry, that failed (timeout: false)."));

        let response = dispatcher
            .dispatch(decode(json!({"type": 2, "data": {"name": "rejected"}})))
            .await;
        assert_eq!(content(&response), Some("Sorry, that failed (timeout: false)."));
    }

    #[tokio::test]
    async fn test_failing_error_handler_falls_back() {
        let response = dispatcher()
            .dispatch(decode(json!({"type": 2, "data": {"name": "hopeless"}})))
            .await;
        assert!(is_ephemeral(&response));
        assert!(!content(&response).unwrap().contains("database"));
        assert!(!content(&response).unwrap().contains("Sorry"));
    }

    #[tokio::test]
    async fn test_error_handler_skipped_for_unknown_state() {
        let response = dispatcher()
            .dispatch(decode(json!({
                "type": 3,
                "data": {"custom_id": "flaky:garbage", "component_type": 2}
            })))
            .await;
        assert!(is_ephemeral(&response));
        assert!(!content(&response).unwrap().contains("Sorry"));
    }
}
