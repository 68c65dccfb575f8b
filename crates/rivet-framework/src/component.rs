//! Component and modal definitions.
//!
//! A [`ComponentDefinition`] owns an identifier prefix and a state schema.
//! Buttons, select menus and modals built with that prefix route back to
//! the definition's handler with their state decoded:
//!
//! ```rust,ignore
//! let counter = ComponentDefinition::new::<(i64,)>("ctr").handler(on_click);
//!
//! // Inside a command handler:
//! let id = counter.encode((0_i64,))?;
//! Message::new("Count: 0").row(Component::button(ButtonStyle::Primary, "+1", id))
//! ```

use std::marker::PhantomData;

use crate::error::{CodecResult, DefinitionError, DefinitionResult};
use crate::handler::{BoxedHandler, ExecutionMode, Handler, SyncHandler};
use crate::state::{ComponentState, StateSchema, encode, encode_state};

const MAX_PREFIX_LEN: usize = 64;

/// A registered component family.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    prefix: String,
    schema: StateSchema,
    handler: Option<BoxedHandler>,
    on_error: Option<BoxedHandler>,
}

impl ComponentDefinition {
    /// Creates a definition whose identifiers carry state `S`.
    pub fn new<S: ComponentState>(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            schema: S::schema(),
            handler: None,
            on_error: None,
        }
    }

    /// Creates a definition with an explicit schema.
    pub fn with_schema(prefix: impl Into<String>, schema: StateSchema) -> Self {
        Self {
            prefix: prefix.into(),
            schema,
            handler: None,
            on_error: None,
        }
    }

    pub fn handler<H: Handler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.handler = Some(BoxedHandler::from_async(handler));
        self
    }

    pub fn sync_handler<H: SyncHandler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.handler = Some(BoxedHandler::from_sync(handler));
        self
    }

    /// Sets an async handler for failures of this component's handler.
    pub fn on_error<H: Handler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.on_error = Some(BoxedHandler::from_async(handler));
        self
    }

    pub fn sync_on_error<H: SyncHandler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.on_error = Some(BoxedHandler::from_sync(handler));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        self.handler.as_ref().map(BoxedHandler::mode)
    }

    pub(crate) fn boxed_handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    pub(crate) fn error_handler(&self) -> Option<&BoxedHandler> {
        self.on_error.as_ref()
    }

    /// Encodes `state` into an identifier for this component.
    ///
    /// Fails if `S` does not match the declared schema or the result is too
    /// long.
    pub fn encode<S: ComponentState>(&self, state: S) -> CodecResult<String> {
        encode(&self.prefix, &self.schema, &state.into_values())
    }

    /// A typed handle that can be shared with code building messages.
    pub fn id_builder<S: ComponentState>(&self) -> ComponentId<S> {
        ComponentId::new(self.prefix.clone())
    }

    pub(crate) fn validate(&self) -> DefinitionResult<()> {
        let valid = !self.prefix.is_empty()
            && self.prefix.len() <= MAX_PREFIX_LEN
            && self.prefix.is_ascii()
            && !self.prefix.contains(':');
        if !valid {
            return Err(DefinitionError::InvalidPrefix(self.prefix.clone()));
        }
        if self.handler.is_none() {
            return Err(DefinitionError::MissingHandler(self.prefix.clone()));
        }
        Ok(())
    }
}

/// Builds identifiers for one component prefix with a fixed state type.
///
/// Unlike [`ComponentDefinition`] it carries no handler, so it can live in a
/// `static` or be passed around freely.
#[derive(Debug)]
pub struct ComponentId<S> {
    prefix: String,
    _state: PhantomData<fn() -> S>,
}

impl<S> Clone for ComponentId<S> {
    fn clone(&self) -> Self {
        Self::new(self.prefix.clone())
    }
}

impl<S> ComponentId<S> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            _state: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<S: ComponentState> ComponentId<S> {
    pub fn encode(&self, state: S) -> CodecResult<String> {
        encode_state(&self.prefix, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::state::decode_state;

    async fn click() -> &'static str {
        "clicked"
    }

    #[test]
    fn test_encode_matches_schema() {
        let def = ComponentDefinition::new::<(i64,)>("ctr").handler(click);
        let id = def.encode((3_i64,)).unwrap();
        assert_eq!(decode_state::<(i64,)>("ctr", &id), Ok((3,)));
        assert_eq!(def.encode((true,)), Err(CodecError::SchemaMismatch));

        let builder = def.id_builder::<(i64,)>();
        assert_eq!(builder.encode((3,)).unwrap(), id);
    }

    #[test]
    fn test_prefix_validation() {
        assert!(ComponentDefinition::new::<()>("ok").handler(click).validate().is_ok());
        for bad in ["", "a:b", "ünï"] {
            assert_eq!(
                ComponentDefinition::new::<()>(bad).handler(click).validate(),
                Err(DefinitionError::InvalidPrefix(bad.to_string()))
            );
        }
        assert!(matches!(
            ComponentDefinition::new::<()>("x").validate(),
            Err(DefinitionError::MissingHandler(_))
        ));
    }
}
