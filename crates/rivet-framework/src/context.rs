//! Request-scoped context handed to handlers.
//!
//! One [`InteractionContext`] is created per routed interaction. It holds the
//! decoded [`Interaction`] plus whatever the router produced for it: coerced
//! arguments for commands, the focused option for autocomplete, decoded
//! state values for components and modal submits. Error handlers also see
//! the failure that triggered them. Handlers never see the context directly;
//! they declare [extractors](crate::extractor) instead.

use std::sync::Arc;

use rivet_core::{DispatchError, Interaction};
use serde_json::Value;

use crate::coerce::Arguments;
use crate::state::StateValue;

/// The option being typed during an autocomplete request.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedOption {
    /// Parameter name.
    pub name: String,
    /// Raw partial input; may be a string even for numeric parameters.
    pub value: Value,
}

impl FocusedOption {
    /// The partial input as text, empty when nothing has been typed.
    pub fn text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Everything a handler can extract for one interaction.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    interaction: Arc<Interaction>,
    arguments: Arguments,
    state: Option<Vec<StateValue>>,
    focused: Option<FocusedOption>,
    error: Option<DispatchError>,
}

impl InteractionContext {
    /// Creates a context with no routed inputs.
    pub fn new(interaction: Arc<Interaction>) -> Self {
        Self {
            interaction,
            arguments: Arguments::default(),
            state: None,
            focused: None,
            error: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_state(mut self, state: Vec<StateValue>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_focused(mut self, focused: FocusedOption) -> Self {
        self.focused = Some(focused);
        self
    }

    pub fn with_error(mut self, error: DispatchError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn interaction(&self) -> &Arc<Interaction> {
        &self.interaction
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Decoded component state, if this is a component or modal submit.
    pub fn state(&self) -> Option<&[StateValue]> {
        self.state.as_deref()
    }

    pub fn focused(&self) -> Option<&FocusedOption> {
        self.focused.as_ref()
    }

    /// The failure being handled, inside an error handler.
    pub fn error(&self) -> Option<&DispatchError> {
        self.error.as_ref()
    }
}
