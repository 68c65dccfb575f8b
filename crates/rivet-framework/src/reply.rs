//! Handler return values.
//!
//! A handler returns anything implementing [`IntoReply`]. Plain strings and
//! [`Message`]s become channel messages; [`Reply`] spells out the other
//! response kinds; `Result<T, E>` turns `Err` into a handler fault.
//!
//! ```rust,ignore
//! async fn echo(args: Arguments) -> String {
//!     args.get::<String>("message").unwrap_or_default()
//! }
//!
//! async fn counter(State((count,)): State<(i64,)>) -> Result<Reply, CodecError> {
//!     let token = encode_state("ctr", (count + 1,))?;
//!     Ok(Reply::update(counter_message(count + 1, token)))
//! }
//! ```

use std::fmt::Display;

use rivet_core::model::{AutocompleteChoice, Message, Modal};
use rivet_core::{DispatchError, DispatchResult};

/// What a handler wants sent back to the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Post a new message.
    Message(Message),
    /// Edit the message the component is attached to.
    Update(Message),
    /// Acknowledge now and send the message later.
    Defer { ephemeral: bool },
    /// Acknowledge a component now and edit its message later.
    DeferUpdate,
    /// Open a popup form.
    Modal(Modal),
    /// Suggestions for the focused option.
    Autocomplete(Vec<AutocompleteChoice>),
}

impl Reply {
    pub fn message(message: impl Into<Message>) -> Self {
        Self::Message(message.into())
    }

    /// A message only the invoking user can see.
    pub fn ephemeral(message: impl Into<Message>) -> Self {
        Self::Message(message.into().ephemeral())
    }

    pub fn update(message: impl Into<Message>) -> Self {
        Self::Update(message.into())
    }

    pub fn defer() -> Self {
        Self::Defer { ephemeral: false }
    }

    pub fn defer_ephemeral() -> Self {
        Self::Defer { ephemeral: true }
    }

    pub fn defer_update() -> Self {
        Self::DeferUpdate
    }

    pub fn modal(modal: Modal) -> Self {
        Self::Modal(modal)
    }

    pub fn autocomplete<C: Into<AutocompleteChoice>>(choices: impl IntoIterator<Item = C>) -> Self {
        Self::Autocomplete(choices.into_iter().map(Into::into).collect())
    }

    /// Short name used in logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Update(_) => "update",
            Self::Defer { .. } => "defer",
            Self::DeferUpdate => "defer-update",
            Self::Modal(_) => "modal",
            Self::Autocomplete(_) => "autocomplete",
        }
    }
}

/// Conversion from a handler's return value into a [`Reply`].
///
/// Types without an implementation cannot be returned from handlers, so an
/// unsupported return shape is a compile error rather than a runtime one.
pub trait IntoReply: Send {
    fn into_reply(self) -> DispatchResult<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(self)
    }
}

impl IntoReply for Message {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(Reply::Message(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(Reply::Message(Message::new(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(Reply::Message(Message::new(self)))
    }
}

impl IntoReply for Modal {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(Reply::Modal(self))
    }
}

impl IntoReply for Vec<AutocompleteChoice> {
    fn into_reply(self) -> DispatchResult<Reply> {
        Ok(Reply::Autocomplete(self))
    }
}

/// `Ok` is converted as usual; `Err` becomes a handler fault carrying the
/// error's display text.
impl<T: IntoReply, E: Display + Send> IntoReply for Result<T, E> {
    fn into_reply(self) -> DispatchResult<Reply> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(DispatchError::fault(e.to_string())),
        }
    }
}
