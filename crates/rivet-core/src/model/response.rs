//! The outbound response envelope.
//!
//! Every interaction is answered with an [`InteractionResponse`]: a response
//! type plus optional data. The data shape depends on the type: message data
//! for 4/5/7, choices for 8, a modal for 9, nothing for 1 and 6.

use serde::Serialize;
use serde_json::Value;

use super::Snowflake;
use super::component::ActionRow;

// =============================================================================
// Envelope
// =============================================================================

/// Response type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ResponseType {
    Pong = 1,
    ChannelMessage = 4,
    DeferredChannelMessage = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    AutocompleteResult = 8,
    Modal = 9,
}

impl From<ResponseType> for u8 {
    fn from(value: ResponseType) -> Self {
        value as u8
    }
}

/// Payload carried by a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Message(Message),
    Autocomplete(AutocompleteData),
    Modal(Modal),
}

/// The JSON body returned for an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// `{"type":1}`
    pub fn pong() -> Self {
        Self {
            kind: ResponseType::Pong,
            data: None,
        }
    }

    pub fn message(message: Message) -> Self {
        Self {
            kind: ResponseType::ChannelMessage,
            data: Some(ResponseData::Message(message)),
        }
    }

    pub fn update(message: Message) -> Self {
        Self {
            kind: ResponseType::UpdateMessage,
            data: Some(ResponseData::Message(message)),
        }
    }

    /// Acknowledge now, send the message later through a follow-up.
    pub fn deferred(ephemeral: bool) -> Self {
        let data = ephemeral.then(|| ResponseData::Message(Message::default().ephemeral()));
        Self {
            kind: ResponseType::DeferredChannelMessage,
            data,
        }
    }

    pub fn deferred_update() -> Self {
        Self {
            kind: ResponseType::DeferredUpdateMessage,
            data: None,
        }
    }

    pub fn autocomplete(choices: Vec<AutocompleteChoice>) -> Self {
        Self {
            kind: ResponseType::AutocompleteResult,
            data: Some(ResponseData::Autocomplete(AutocompleteData { choices })),
        }
    }

    pub fn modal(modal: Modal) -> Self {
        Self {
            kind: ResponseType::Modal,
            data: Some(ResponseData::Modal(modal)),
        }
    }

    /// An ephemeral plain-text message, used to report failures.
    pub fn ephemeral_notice(content: impl Into<String>) -> Self {
        Self::message(Message::new(content).ephemeral())
    }

    /// Serializes the envelope into a JSON body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

// =============================================================================
// Message Data
// =============================================================================

/// Message flag bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageFlags(u64);

impl MessageFlags {
    pub const SUPPRESS_EMBEDS: Self = Self(1 << 2);
    /// Only the invoking user can see the message.
    pub const EPHEMERAL: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Which mentions in the content are allowed to ping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<MentionType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<Snowflake>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Snowflake>,
}

impl AllowedMentions {
    /// Suppresses every ping.
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Users,
    Roles,
    Everyone,
}

/// Message content of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(skip_serializing_if = "MessageFlags::is_empty")]
    pub flags: MessageFlags,
    /// `None` leaves existing components untouched on update; `Some(vec![])`
    /// clears them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
}

impl Message {
    /// A message with text content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.flags.insert(MessageFlags::EPHEMERAL);
        self
    }

    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Appends an action row.
    pub fn row(mut self, row: impl Into<ActionRow>) -> Self {
        self.components.get_or_insert_with(Vec::new).push(row.into());
        self
    }

    /// Replaces all components; an empty list removes them.
    pub fn components(mut self, rows: Vec<ActionRow>) -> Self {
        self.components = Some(rows);
        self
    }

    pub fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags.contains(MessageFlags::EPHEMERAL)
    }

    /// Returns `true` if the message has no content, embeds or components.
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty)
            && self.embeds.is_empty()
            && self.components.as_ref().is_none_or(Vec::is_empty)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

/// A rich embed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// ISO-8601 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url: None,
        });
        self
    }
}

// =============================================================================
// Autocomplete & Modal Data
// =============================================================================

/// One suggestion returned to an autocomplete request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteChoice {
    pub name: String,
    /// A string, integer or number matching the option's type.
    pub value: Value,
}

impl AutocompleteChoice {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for AutocompleteChoice {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<String> for AutocompleteChoice {
    fn from(value: String) -> Self {
        Self::new(value.clone(), value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteData {
    pub choices: Vec<AutocompleteChoice>,
}

/// A popup form of text inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

impl Modal {
    pub fn new(custom_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            title: title.into(),
            components: Vec::new(),
        }
    }

    pub fn row(mut self, row: impl Into<ActionRow>) -> Self {
        self.components.push(row.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::{ButtonStyle, Component};
    use serde_json::json;

    #[test]
    fn test_pong() {
        assert_eq!(
            InteractionResponse::pong().to_json().unwrap(),
            br#"{"type":1}"#
        );
    }

    #[test]
    fn test_plain_message() {
        let response = InteractionResponse::message(Message::new("hi"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": 4, "data": {"content": "hi"}})
        );
    }

    #[test]
    fn test_ephemeral_flag() {
        let response = InteractionResponse::ephemeral_notice("nope");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"type": 4, "data": {"content": "nope", "flags": 64}})
        );
        assert_eq!(
            serde_json::to_value(InteractionResponse::deferred(true)).unwrap(),
            json!({"type": 5, "data": {"flags": 64}})
        );
        assert_eq!(
            serde_json::to_value(InteractionResponse::deferred(false)).unwrap(),
            json!({"type": 5})
        );
    }

    #[test]
    fn test_update_with_components() {
        let message = Message::new("Count: 6").row(Component::button(
            ButtonStyle::Primary,
            "+1",
            "ctr:AQ",
        ));
        let value = serde_json::to_value(InteractionResponse::update(message)).unwrap();
        assert_eq!(value["type"], 7);
        assert_eq!(value["data"]["components"][0]["components"][0]["custom_id"], "ctr:AQ");
    }

    #[test]
    fn test_autocomplete_and_modal() {
        let value = serde_json::to_value(InteractionResponse::autocomplete(vec![
            AutocompleteChoice::from("apple"),
            AutocompleteChoice::new("Ten", 10),
        ]))
        .unwrap();
        assert_eq!(
            value,
            json!({"type": 8, "data": {"choices": [
                {"name": "apple", "value": "apple"},
                {"name": "Ten", "value": 10}
            ]}})
        );

        let modal = Modal::new("fb:AQ", "Feedback");
        let value = serde_json::to_value(InteractionResponse::modal(modal)).unwrap();
        assert_eq!(value["type"], 9);
        assert_eq!(value["data"]["title"], "Feedback");
    }

    #[test]
    fn test_message_emptiness() {
        assert!(Message::default().is_empty());
        assert!(Message::new("").is_empty());
        assert!(Message::default().components(vec![]).is_empty());
        assert!(!Message::default().embed(Embed::new().title("t")).is_empty());
    }
}
