//! Outbound message components: action rows, buttons, select menus and text
//! inputs.
//!
//! Components are represented by a single flat [`Component`] struct tagged
//! with its [`ComponentType`], mirroring the wire format. Constructors cover
//! each kind:
//!
//! ```rust,ignore
//! let row = ActionRow::new([
//!     Component::button(ButtonStyle::Primary, "+1", token),
//!     Component::link("Docs", "https://example.com"),
//! ]);
//! ```

use serde::Serialize;

/// Component type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ComponentType {
    ActionRow = 1,
    Button = 2,
    StringSelect = 3,
    TextInput = 4,
    UserSelect = 5,
    RoleSelect = 6,
    MentionableSelect = 7,
    ChannelSelect = 8,
}

impl From<ComponentType> for u8 {
    fn from(value: ComponentType) -> Self {
        value as u8
    }
}

impl ComponentType {
    /// Returns `true` for the select-menu family.
    pub fn is_select(self) -> bool {
        matches!(
            self,
            Self::StringSelect
                | Self::UserSelect
                | Self::RoleSelect
                | Self::MentionableSelect
                | Self::ChannelSelect
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
    Link = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputStyle {
    /// Single line.
    Short = 1,
    /// Multi-line.
    Paragraph = 2,
}

/// A custom or unicode emoji attached to a button or select option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialEmoji {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl PartialEmoji {
    /// A unicode emoji such as `"🦀"`.
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            animated: false,
        }
    }
}

/// One option of a string select menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the option as pre-selected.
    pub fn selected(mut self) -> Self {
        self.default = true;
        self
    }
}

/// An interactive component placed inside an [`ActionRow`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Component {
    fn empty(kind: ComponentType) -> Self {
        Self {
            kind,
            custom_id: None,
            style: None,
            label: None,
            emoji: None,
            url: None,
            disabled: false,
            options: Vec::new(),
            placeholder: None,
            min_values: None,
            max_values: None,
            min_length: None,
            max_length: None,
            required: None,
            value: None,
        }
    }

    /// A button that fires a component interaction with `custom_id`.
    ///
    /// For [`ButtonStyle::Link`] use [`Component::link`] instead.
    pub fn button(style: ButtonStyle, label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            style: Some(style as u8),
            label: Some(label.into()),
            custom_id: Some(custom_id.into()),
            ..Self::empty(ComponentType::Button)
        }
    }

    /// A button that opens `url` and fires no interaction.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            style: Some(ButtonStyle::Link as u8),
            label: Some(label.into()),
            url: Some(url.into()),
            ..Self::empty(ComponentType::Button)
        }
    }

    /// A string select menu.
    pub fn string_select(
        custom_id: impl Into<String>,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Self {
        Self {
            custom_id: Some(custom_id.into()),
            options: options.into_iter().collect(),
            ..Self::empty(ComponentType::StringSelect)
        }
    }

    /// An auto-populated select menu (user, role, mentionable or channel).
    pub fn entity_select(kind: ComponentType, custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: Some(custom_id.into()),
            ..Self::empty(kind)
        }
    }

    /// A text input; only valid inside a modal.
    pub fn text_input(
        custom_id: impl Into<String>,
        style: TextInputStyle,
        label: impl Into<String>,
    ) -> Self {
        Self {
            custom_id: Some(custom_id.into()),
            style: Some(style as u8),
            label: Some(label.into()),
            ..Self::empty(ComponentType::TextInput)
        }
    }

    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Bounds the number of selectable values.
    pub fn values_range(mut self, min: u8, max: u8) -> Self {
        self.min_values = Some(min);
        self.max_values = Some(max);
        self
    }

    /// Bounds the length of text input.
    pub fn length_range(mut self, min: u16, max: u16) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Pre-filled text input value.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A horizontal row of up to five components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn new(components: impl IntoIterator<Item = Component>) -> Self {
        Self {
            kind: ComponentType::ActionRow,
            components: components.into_iter().collect(),
        }
    }
}

impl From<Component> for ActionRow {
    fn from(component: Component) -> Self {
        Self::new([component])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_button_row_wire_format() {
        let row = ActionRow::new([Component::button(ButtonStyle::Primary, "+1", "ctr:AQ")]);
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({
                "type": 1,
                "components": [
                    {"type": 2, "style": 1, "label": "+1", "custom_id": "ctr:AQ"}
                ]
            })
        );
    }

    #[test]
    fn test_select_and_link() {
        let select = Component::string_select(
            "pick",
            [SelectOption::new("Red", "red").selected(), SelectOption::new("Blue", "blue")],
        )
        .values_range(1, 1);
        let value = serde_json::to_value(&select).unwrap();
        assert_eq!(value["type"], 3);
        assert_eq!(value["options"][0]["default"], true);
        assert!(value["options"][1].get("default").is_none());
        assert_eq!(value["max_values"], 1);

        let link = serde_json::to_value(Component::link("Docs", "https://example.com")).unwrap();
        assert_eq!(link["style"], 5);
        assert!(link.get("custom_id").is_none());
        assert!(ComponentType::ChannelSelect.is_select());
        assert!(!ComponentType::Button.is_select());
    }
}
