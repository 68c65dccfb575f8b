//! The inbound interaction envelope and its decoder.
//!
//! # Parsing
//!
//! [`decode_interaction`] pre-parses the body into a JSON value, inspects the
//! `type` discriminant, and then deserializes the common envelope fields and
//! the discriminant-specific `data` object separately. The result is a single
//! [`Interaction`] whose [`InteractionKind`] carries typed data for exactly
//! the variant that arrived:
//!
//! ```text
//! type 1 ─▶ Ping
//! type 2 ─▶ Command(CommandData)
//! type 3 ─▶ Component(ComponentData)
//! type 4 ─▶ Autocomplete(CommandData)
//! type 5 ─▶ ModalSubmit(ModalSubmitData)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::entity::{Member, PartialMessage, Resolved, User};
use super::{Snowflake, UnknownDiscriminant};
use crate::error::{DecodeError, DecodeResult};

// =============================================================================
// Discriminants
// =============================================================================

/// Interaction type discriminant as sent by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    Autocomplete = 4,
    ModalSubmit = 5,
}

impl InteractionType {
    /// Maps a raw discriminant, returning `None` for unknown values.
    pub fn from_raw(raw: u64) -> Option<Self> {
        Some(match raw {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            _ => return None,
        })
    }
}

/// Kind of application command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CommandType {
    /// Slash command typed in the chat input.
    #[default]
    ChatInput = 1,
    /// Context-menu command on a user.
    User = 2,
    /// Context-menu command on a message.
    Message = 3,
}

impl TryFrom<u8> for CommandType {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ChatInput),
            2 => Ok(Self::User),
            3 => Ok(Self::Message),
            _ => Err(UnknownDiscriminant::new("command type", value)),
        }
    }
}

impl From<CommandType> for u8 {
    fn from(value: CommandType) -> Self {
        value as u8
    }
}

/// Type of a command option as sent by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl TryFrom<u8> for OptionType {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            _ => return Err(UnknownDiscriminant::new("option type", value)),
        })
    }
}

impl From<OptionType> for u8 {
    fn from(value: OptionType) -> Self {
        value as u8
    }
}

// =============================================================================
// Data Payloads
// =============================================================================

/// Data of an application-command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandData {
    #[serde(default)]
    pub id: Option<Snowflake>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub command_type: CommandType,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub resolved: Resolved,
    /// Guild the command was registered in, if guild-scoped.
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Target of a user or message context-menu command.
    #[serde(default)]
    pub target_id: Option<Snowflake>,
}

/// One node of the option tree.
///
/// Subcommand and group nodes carry nested `options`; leaf nodes carry a
/// `value`. During autocomplete exactly one leaf has `focused` set and its
/// value may be partial input of any JSON type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<OptionType>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub focused: bool,
}

impl CommandDataOption {
    /// Returns `true` for subcommand and subcommand-group nodes.
    pub fn is_subcommand(&self) -> bool {
        matches!(
            self.kind,
            Some(OptionType::SubCommand | OptionType::SubCommandGroup)
        )
    }
}

/// Data of a message-component interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: u8,
    /// Selected values for select menus; empty for buttons.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub resolved: Resolved,
}

/// Data of a modal-submit interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModalSubmitData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

/// An action row of submitted modal fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalField>,
}

/// A single submitted text input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModalField {
    pub custom_id: String,
    #[serde(default)]
    pub value: String,
}

impl ModalSubmitData {
    /// Iterates over `(custom_id, value)` pairs in submission order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.components
            .iter()
            .flat_map(|row| row.components.iter())
            .map(|field| (field.custom_id.as_str(), field.value.as_str()))
    }

    /// Looks up a submitted value by its input id.
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        self.fields()
            .find(|(id, _)| *id == custom_id)
            .map(|(_, value)| value)
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// The discriminated body of an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionKind {
    Ping,
    Command(CommandData),
    Component(ComponentData),
    Autocomplete(CommandData),
    ModalSubmit(ModalSubmitData),
}

impl InteractionKind {
    pub fn interaction_type(&self) -> InteractionType {
        match self {
            Self::Ping => InteractionType::Ping,
            Self::Command(_) => InteractionType::ApplicationCommand,
            Self::Component(_) => InteractionType::MessageComponent,
            Self::Autocomplete(_) => InteractionType::Autocomplete,
            Self::ModalSubmit(_) => InteractionType::ModalSubmit,
        }
    }
}

/// The continuation token of an interaction.
///
/// Only needed for follow-up calls against the platform; never logged.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct InteractionToken(String);

impl InteractionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InteractionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InteractionToken(<redacted>)")
    }
}

/// Fields shared by every interaction type.
#[derive(Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Snowflake,
    #[serde(default)]
    application_id: Snowflake,
    #[serde(default)]
    token: InteractionToken,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    #[serde(default)]
    channel_id: Option<Snowflake>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    message: Option<PartialMessage>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    guild_locale: Option<String>,
}

/// A decoded interaction.
///
/// Request-scoped: created per request by [`decode_interaction`] and dropped
/// once the response is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub kind: InteractionKind,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    /// Invoking member, present for guild interactions.
    pub member: Option<Member>,
    /// Invoking user, present for direct-message interactions.
    pub user: Option<User>,
    /// Message the component was attached to.
    pub message: Option<PartialMessage>,
    pub locale: Option<String>,
    pub guild_locale: Option<String>,
    token: InteractionToken,
}

impl Interaction {
    pub fn interaction_type(&self) -> InteractionType {
        self.kind.interaction_type()
    }

    /// The user who triggered the interaction, in guilds or DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Id of the invoking user, if known.
    pub fn user_id(&self) -> Option<Snowflake> {
        self.invoker().map(|u| u.id)
    }

    pub fn token(&self) -> &InteractionToken {
        &self.token
    }

    /// A short label for logs: command name or component id.
    pub fn route_label(&self) -> &str {
        match &self.kind {
            InteractionKind::Ping => "ping",
            InteractionKind::Command(data) | InteractionKind::Autocomplete(data) => &data.name,
            InteractionKind::Component(data) => &data.custom_id,
            InteractionKind::ModalSubmit(data) => &data.custom_id,
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Decodes a verified request body into an [`Interaction`].
///
/// Fails on malformed JSON, an unknown `type`, or a non-ping interaction
/// without `data`. A ping only needs its `type`: the rest of its envelope is
/// decoded best-effort and never fails.
pub fn decode_interaction(body: &[u8]) -> DecodeResult<Interaction> {
    let mut v: Value = serde_json::from_slice(body)?;

    let raw_type = v
        .get("type")
        .and_then(Value::as_u64)
        .ok_or_else(|| DecodeError::Json("missing or non-integer `type`".to_string()))?;
    let kind = InteractionType::from_raw(raw_type).ok_or(DecodeError::UnknownType(raw_type))?;
    trace!(interaction_type = ?kind, "Decoding interaction");

    if kind == InteractionType::Ping {
        let envelope = serde_json::from_value(v).unwrap_or_default();
        return Ok(Interaction::from_envelope(envelope, InteractionKind::Ping));
    }

    let data = v
        .as_object_mut()
        .and_then(|obj| obj.remove("data"))
        .filter(|d| !d.is_null());

    macro_rules! take_data {
        ($ty:ty) => {{
            let data = data.ok_or(DecodeError::MissingData(kind))?;
            serde_json::from_value::<$ty>(data)?
        }};
    }

    let kind = match kind {
        InteractionType::Ping => InteractionKind::Ping,
        InteractionType::ApplicationCommand => InteractionKind::Command(take_data!(CommandData)),
        InteractionType::MessageComponent => InteractionKind::Component(take_data!(ComponentData)),
        InteractionType::Autocomplete => InteractionKind::Autocomplete(take_data!(CommandData)),
        InteractionType::ModalSubmit => InteractionKind::ModalSubmit(take_data!(ModalSubmitData)),
    };

    let envelope: Envelope = serde_json::from_value(v)?;
    Ok(Interaction::from_envelope(envelope, kind))
}

impl Interaction {
    fn from_envelope(envelope: Envelope, kind: InteractionKind) -> Self {
        Self {
            id: envelope.id,
            application_id: envelope.application_id,
            kind,
            guild_id: envelope.guild_id,
            channel_id: envelope.channel_id,
            member: envelope.member,
            user: envelope.user,
            message: envelope.message,
            locale: envelope.locale,
            guild_locale: envelope.guild_locale,
            token: envelope.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping() {
        let interaction = decode_interaction(br#"{"type":1,"id":"1","token":"t"}"#).unwrap();
        assert_eq!(interaction.kind, InteractionKind::Ping);
        assert_eq!(interaction.token().as_str(), "t");
    }

    #[test]
    fn test_ping_ignores_odd_envelope() {
        for body in [
            &br#"{"type":1,"id":"not-a-snowflake","token":"t"}"#[..],
            br#"{"type":1,"member":"nobody","guild_id":[1,2]}"#,
            br#"{"type":1,"data":{"anything":true}}"#,
        ] {
            let interaction = decode_interaction(body).unwrap();
            assert_eq!(interaction.kind, InteractionKind::Ping);
            assert_eq!(interaction.guild_id, None);
        }
    }

    #[test]
    fn test_command_with_member() {
        let body = br#"{
            "type": 2,
            "id": "100",
            "application_id": "200",
            "token": "secret-token",
            "guild_id": "300",
            "channel_id": "400",
            "member": {"user": {"id": "500", "username": "ferris"}, "roles": []},
            "locale": "en-US",
            "data": {
                "id": "600",
                "name": "echo",
                "type": 1,
                "options": [{"name": "message", "type": 3, "value": "hi"}]
            }
        }"#;
        let interaction = decode_interaction(body).unwrap();

        assert_eq!(interaction.guild_id, Some(Snowflake::new(300)));
        assert_eq!(interaction.user_id(), Some(Snowflake::new(500)));
        assert_eq!(interaction.route_label(), "echo");
        let InteractionKind::Command(data) = &interaction.kind else {
            panic!("expected command");
        };
        assert_eq!(data.options[0].kind, Some(OptionType::String));
        assert_eq!(data.options[0].value, Some(Value::from("hi")));
    }

    #[test]
    fn test_token_not_in_debug() {
        let interaction =
            decode_interaction(br#"{"type":1,"token":"very-secret"}"#).unwrap();
        assert!(!format!("{interaction:?}").contains("very-secret"));
    }

    #[test]
    fn test_component_and_modal() {
        let component = decode_interaction(
            br#"{"type":3,"user":{"id":"9","username":"u"},
                "data":{"custom_id":"ctr:AQ","component_type":2}}"#,
        )
        .unwrap();
        let InteractionKind::Component(data) = &component.kind else {
            panic!("expected component");
        };
        assert_eq!(data.custom_id, "ctr:AQ");
        assert!(data.values.is_empty());
        assert_eq!(component.user_id(), Some(Snowflake::new(9)));

        let modal = decode_interaction(
            br#"{"type":5,"data":{"custom_id":"fb:AQ","components":[
                {"type":1,"components":[{"type":4,"custom_id":"title","value":"Hello"}]}
            ]}}"#,
        )
        .unwrap();
        let InteractionKind::ModalSubmit(data) = &modal.kind else {
            panic!("expected modal submit");
        };
        assert_eq!(data.field("title"), Some("Hello"));
        assert_eq!(data.field("missing"), None);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            decode_interaction(b"not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_interaction(br#"{"type":42}"#),
            Err(DecodeError::UnknownType(42))
        ));
        assert!(matches!(
            decode_interaction(br#"{"type":2}"#),
            Err(DecodeError::MissingData(InteractionType::ApplicationCommand))
        ));
        assert!(matches!(
            decode_interaction(br#"{"type":2,"data":null}"#),
            Err(DecodeError::MissingData(_))
        ));
        assert!(matches!(
            decode_interaction(br#"{"data":{}}"#),
            Err(DecodeError::Json(_))
        ));
    }
}
