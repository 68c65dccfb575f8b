//! Handler parameter extraction.
//!
//! Any type implementing [`FromContext`] can appear as a handler parameter:
//!
//! ```rust,ignore
//! async fn counter(State((count,)): State<(i64,)>, invoker: Invoker) -> Reply {
//!     Reply::update(format!("{} clicked, count is {}", invoker.mention(), count + 1))
//! }
//! ```
//!
//! Extraction runs before the handler body. A failed extraction means the
//! handler asked for something this interaction cannot provide and is
//! reported as a handler fault.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use rivet_core::model::{InteractionKind, PartialMessage};
use rivet_core::{DispatchError, Interaction, Member, Snowflake, User};

use crate::coerce::Arguments;
use crate::context::{FocusedOption, InteractionContext};
use crate::error::{ExtractError, ExtractResult};
use crate::state::ComponentState;

/// A trait for types that can be extracted from an [`InteractionContext`].
pub trait FromContext: Sized {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self>;
}

impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

/// The whole decoded interaction.
impl FromContext for Arc<Interaction> {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        Ok(ctx.interaction().clone())
    }
}

/// Coerced command arguments. Empty for non-command interactions.
impl FromContext for Arguments {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        Ok(ctx.arguments().clone())
    }
}

impl FromContext for FocusedOption {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        ctx.focused()
            .cloned()
            .ok_or_else(|| ExtractError::unavailable("focused option"))
    }
}

/// The failure passed to an error handler.
impl FromContext for DispatchError {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        ctx.error()
            .cloned()
            .ok_or_else(|| ExtractError::unavailable("dispatch error"))
    }
}

// =============================================================================
// Component State
// =============================================================================

/// Typed state decoded from the component identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct State<S>(pub S);

impl<S> State<S> {
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S> Deref for State<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: ComponentState> FromContext for State<S> {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        let values = ctx
            .state()
            .ok_or_else(|| ExtractError::unavailable("component state"))?;
        S::from_values(values.to_vec())
            .map(State)
            .map_err(|e| ExtractError::custom(format!("component state: {e}")))
    }
}

// =============================================================================
// Invoker
// =============================================================================

/// The user who triggered the interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoker {
    pub user: User,
    /// Guild membership, absent in direct messages.
    pub member: Option<Member>,
}

impl Deref for Invoker {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl FromContext for Invoker {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        let interaction = ctx.interaction();
        let user = interaction
            .invoker()
            .cloned()
            .ok_or_else(|| ExtractError::unavailable("invoking user"))?;
        Ok(Invoker {
            user,
            member: interaction.member.clone(),
        })
    }
}

/// The guild the interaction happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildId(pub Snowflake);

impl FromContext for GuildId {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        ctx.interaction()
            .guild_id
            .map(GuildId)
            .ok_or_else(|| ExtractError::unavailable("guild"))
    }
}

// =============================================================================
// Component & Modal Inputs
// =============================================================================

/// Values picked in a select menu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectValues(pub Vec<String>);

impl Deref for SelectValues {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for SelectValues {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        match &ctx.interaction().kind {
            InteractionKind::Component(data) => Ok(SelectValues(data.values.clone())),
            _ => Err(ExtractError::unavailable("select values")),
        }
    }
}

/// Text submitted through a modal, keyed by input id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalFields(pub HashMap<String, String>);

impl ModalFields {
    pub fn get(&self, custom_id: &str) -> Option<&str> {
        self.0.get(custom_id).map(String::as_str)
    }
}

impl FromContext for ModalFields {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        match &ctx.interaction().kind {
            InteractionKind::ModalSubmit(data) => Ok(ModalFields(
                data.fields()
                    .map(|(id, value)| (id.to_string(), value.to_string()))
                    .collect(),
            )),
            _ => Err(ExtractError::unavailable("modal fields")),
        }
    }
}

// =============================================================================
// Context-Menu Targets
// =============================================================================

/// The entity a context-menu command was invoked on.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    User {
        user: User,
        member: Option<Member>,
    },
    Message(PartialMessage),
}

impl FromContext for Target {
    fn from_context(ctx: &InteractionContext) -> ExtractResult<Self> {
        let InteractionKind::Command(data) = &ctx.interaction().kind else {
            return Err(ExtractError::unavailable("context-menu target"));
        };
        let id = data
            .target_id
            .ok_or_else(|| ExtractError::unavailable("context-menu target"))?;

        if let Some(message) = data.resolved.messages.get(&id) {
            return Ok(Target::Message(message.clone()));
        }
        data.resolved
            .users
            .get(&id)
            .map(|user| Target::User {
                user: user.clone(),
                member: data.resolved.members.get(&id).cloned(),
            })
            .ok_or_else(|| ExtractError::custom(format!("target {id} was not resolved")))
    }
}
