//! Wire model of the interactions endpoint.
//!
//! - [`interaction`]: the inbound envelope and its decoder
//! - [`entity`]: users, members, roles and channels referenced by interactions
//! - [`response`]: the outbound envelope and message data
//! - [`component`]: buttons, select menus and text inputs

pub mod component;
pub mod entity;
pub mod interaction;
pub mod response;
mod snowflake;

use thiserror::Error;

pub use component::{
    ActionRow, ButtonStyle, Component, ComponentType, PartialEmoji, SelectOption, TextInputStyle,
};
pub use entity::{Member, PartialChannel, PartialMessage, Resolved, Role, User};
pub use interaction::{
    CommandData, CommandDataOption, CommandType, ComponentData, Interaction, InteractionKind,
    InteractionToken, InteractionType, ModalField, ModalRow, ModalSubmitData, OptionType,
    decode_interaction,
};
pub use response::{
    AllowedMentions, AutocompleteChoice, AutocompleteData, Embed, EmbedField, EmbedFooter,
    InteractionResponse, MentionType, Message, MessageFlags, Modal, ResponseData, ResponseType,
};
pub use snowflake::Snowflake;

/// A numeric discriminant outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownDiscriminant {
    kind: &'static str,
    value: u8,
}

impl UnknownDiscriminant {
    pub(crate) fn new(kind: &'static str, value: u8) -> Self {
        Self { kind, value }
    }
}
