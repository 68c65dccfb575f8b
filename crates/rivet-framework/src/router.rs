//! Maps a decoded interaction to a handler and its inputs.
//!
//! The router is the only place that looks into the registry. It resolves
//! the subcommand path from the option tree, coerces arguments, finds the
//! focused option for autocomplete and decodes component state, producing a
//! [`Route`] that the executor can run without further lookups. The route
//! also carries the definition's checks and error handler.

use std::sync::Arc;

use rivet_core::{
    CommandData, CommandDataOption, DispatchError, DispatchResult, Interaction, InteractionKind,
    OptionType,
};
use serde_json::Value;
use tracing::debug;

use crate::check::Check;
use crate::coerce::{Arguments, coerce, coerce_lenient};
use crate::command::CommandDefinition;
use crate::context::{FocusedOption, InteractionContext};
use crate::handler::BoxedHandler;
use crate::registry::Registry;
use crate::state::{StateValue, decode};

/// Maximum nesting of the option tree: group, then subcommand.
const MAX_PATH_DEPTH: usize = 2;

/// A resolved handler with everything it needs to run.
#[derive(Debug, Clone)]
pub struct Route {
    pub handler: BoxedHandler,
    /// Qualified command name or component prefix, for logs.
    pub label: String,
    pub arguments: Arguments,
    pub state: Option<Vec<StateValue>>,
    pub focused: Option<FocusedOption>,
    /// Run in order before the handler.
    pub checks: Vec<Check>,
    /// Consulted when the handler fails.
    pub on_error: Option<BoxedHandler>,
}

impl Route {
    fn new(handler: &BoxedHandler, label: String) -> Self {
        Self {
            handler: handler.clone(),
            label,
            arguments: Arguments::default(),
            state: None,
            focused: None,
            checks: Vec::new(),
            on_error: None,
        }
    }

    /// Builds the handler context for this route.
    pub fn into_context(self, interaction: Arc<Interaction>) -> InteractionContext {
        let mut ctx = InteractionContext::new(interaction).with_arguments(self.arguments);
        if let Some(state) = self.state {
            ctx = ctx.with_state(state);
        }
        if let Some(focused) = self.focused {
            ctx = ctx.with_focused(focused);
        }
        ctx
    }
}

/// Routes interactions against a frozen [`Registry`].
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolves the handler for `interaction`.
    ///
    /// Pings are answered before routing and are rejected here.
    pub fn route(&self, interaction: &Interaction) -> DispatchResult<Route> {
        match &interaction.kind {
            InteractionKind::Ping => Err(DispatchError::unknown_route("ping is not routable")),
            InteractionKind::Command(data) => self.route_command(interaction, data),
            InteractionKind::Autocomplete(data) => self.route_autocomplete(interaction, data),
            InteractionKind::Component(data) => self.route_component(&data.custom_id),
            InteractionKind::ModalSubmit(data) => self.route_component(&data.custom_id),
        }
    }

    fn find_command<'a>(
        &'a self,
        interaction: &Interaction,
        data: &'a CommandData,
    ) -> DispatchResult<(&'a CommandDefinition, &'a [CommandDataOption])> {
        let (path, leaves) = split_path(&data.options)?;
        let def = self
            .registry
            .find_command(data.command_type, &data.name, &path, interaction.guild_id)
            .ok_or_else(|| {
                let mut name = data.name.clone();
                for segment in &path {
                    name.push(' ');
                    name.push_str(segment);
                }
                DispatchError::unknown_route(format!("no command named `{name}`"))
            })?;
        Ok((def, leaves))
    }

    fn route_command(&self, interaction: &Interaction, data: &CommandData) -> DispatchResult<Route> {
        let (def, leaves) = self.find_command(interaction, data)?;
        let handler = def
            .boxed_handler()
            .ok_or_else(|| DispatchError::unknown_route("command has no handler"))?;

        let arguments = coerce(def.parameters(), leaves, &data.resolved)?;
        debug!(
            command = %def.qualified_name(),
            arguments = arguments.len(),
            mode = ?handler.mode(),
            "Routed command"
        );

        let mut route = Route::new(handler, def.qualified_name());
        route.arguments = arguments;
        route.checks = def.checks().to_vec();
        route.on_error = def.error_handler().cloned();
        Ok(route)
    }

    fn route_autocomplete(
        &self,
        interaction: &Interaction,
        data: &CommandData,
    ) -> DispatchResult<Route> {
        let (def, leaves) = self.find_command(interaction, data)?;
        let focused = leaves.iter().find(|o| o.focused);

        // A command-wide handler answers even when nothing is focused.
        let handler = match (def.default_autocomplete_handler(), focused) {
            (Some(handler), None) => handler,
            (_, Some(focused)) => def.autocomplete_handler(&focused.name).ok_or_else(|| {
                DispatchError::unknown_route(format!(
                    "no autocomplete handler for `{}`",
                    focused.name
                ))
            })?,
            (None, None) => {
                return Err(DispatchError::unknown_route(
                    "autocomplete without a focused option",
                ));
            }
        };

        debug!(
            command = %def.qualified_name(),
            focused = ?focused.map(|o| o.name.as_str()),
            "Routed autocomplete"
        );

        let mut route = Route::new(handler, def.qualified_name());
        route.arguments = coerce_lenient(def.parameters(), leaves, &data.resolved);
        route.focused = focused.map(|o| FocusedOption {
            name: o.name.clone(),
            value: o.value.clone().unwrap_or(Value::Null),
        });
        Ok(route)
    }

    fn route_component(&self, custom_id: &str) -> DispatchResult<Route> {
        let def = self
            .registry
            .find_component(custom_id)
            .ok_or_else(|| DispatchError::unknown_route("this component is no longer handled"))?;
        let handler = def
            .boxed_handler()
            .ok_or_else(|| DispatchError::unknown_route("component has no handler"))?;

        let state = decode(def.prefix(), def.schema(), custom_id).inspect_err(|e| {
            debug!(prefix = def.prefix(), error = %e, "Component state rejected");
        })?;
        debug!(prefix = def.prefix(), fields = state.len(), "Routed component");

        let mut route = Route::new(handler, def.prefix().to_string());
        route.state = Some(state);
        route.on_error = def.error_handler().cloned();
        Ok(route)
    }
}

/// Splits the option tree into the subcommand path and the leaf options.
fn split_path(options: &[CommandDataOption]) -> DispatchResult<(Vec<&str>, &[CommandDataOption])> {
    let mut path = Vec::new();
    let mut current = options;

    while let [first] = current {
        let last = match first.kind {
            Some(OptionType::SubCommandGroup) if path.is_empty() => false,
            Some(OptionType::SubCommand) => true,
            _ => break,
        };
        path.push(first.name.as_str());
        current = &first.options;
        if last || path.len() >= MAX_PATH_DEPTH {
            break;
        }
    }

    if current.iter().any(CommandDataOption::is_subcommand) {
        return Err(DispatchError::malformed("unexpected subcommand nesting"));
    }
    Ok((path, current))
}
