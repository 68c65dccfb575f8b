//! Turns a handler's [`Reply`] into the response envelope.
//!
//! Replies are checked against the interaction kind and the platform's
//! payload limits before anything is sent, so a reply the platform would
//! reject surfaces as a [`ResponseError`] on our side instead of a silent
//! failure on the user's.
//!
//! | Reply          | Response type | Valid for                         |
//! |----------------|---------------|-----------------------------------|
//! | `Message`      | 4             | command, component, modal submit  |
//! | `Update`       | 7             | component, modal submit           |
//! | `Defer`        | 5             | command, component, modal submit  |
//! | `DeferUpdate`  | 6             | component, modal submit           |
//! | `Modal`        | 9             | command, component                |
//! | `Autocomplete` | 8             | autocomplete                      |

use rivet_core::model::{ActionRow, InteractionResponse, Message, Modal};
use rivet_core::InteractionType;

use crate::error::{ResponseError, ResponseResult};
use crate::reply::Reply;
use crate::state::MAX_CUSTOM_ID_LEN;

pub const MAX_CONTENT_LEN: usize = 2000;
pub const MAX_EMBEDS: usize = 10;
pub const MAX_ACTION_ROWS: usize = 5;
pub const MAX_ROW_COMPONENTS: usize = 5;
pub const MAX_CHOICES: usize = 25;
pub const MAX_MODAL_TITLE_LEN: usize = 45;

/// Builds the envelope for `reply` answering an interaction of `kind`.
pub fn build_response(kind: InteractionType, reply: Reply) -> ResponseResult<InteractionResponse> {
    use InteractionType::*;

    let allowed = match &reply {
        Reply::Message(_) | Reply::Defer { .. } => {
            matches!(kind, ApplicationCommand | MessageComponent | ModalSubmit)
        }
        Reply::Update(_) | Reply::DeferUpdate => matches!(kind, MessageComponent | ModalSubmit),
        Reply::Modal(_) => matches!(kind, ApplicationCommand | MessageComponent),
        Reply::Autocomplete(_) => kind == Autocomplete,
    };
    if !allowed {
        return Err(ResponseError::NotAllowed {
            reply: reply.kind_name(),
            interaction: interaction_name(kind),
        });
    }

    Ok(match reply {
        Reply::Message(message) => {
            if message.is_empty() {
                return Err(ResponseError::EmptyMessage);
            }
            check_message(&message)?;
            InteractionResponse::message(message)
        }
        Reply::Update(message) => {
            let touches_nothing = message.content.is_none()
                && message.embeds.is_empty()
                && message.components.is_none();
            if touches_nothing {
                return Err(ResponseError::EmptyMessage);
            }
            check_message(&message)?;
            InteractionResponse::update(message)
        }
        Reply::Defer { ephemeral } => InteractionResponse::deferred(ephemeral),
        Reply::DeferUpdate => InteractionResponse::deferred_update(),
        Reply::Modal(modal) => {
            check_modal(&modal)?;
            InteractionResponse::modal(modal)
        }
        Reply::Autocomplete(choices) => {
            if choices.len() > MAX_CHOICES {
                return Err(ResponseError::TooManyChoices(choices.len()));
            }
            InteractionResponse::autocomplete(choices)
        }
    })
}

fn interaction_name(kind: InteractionType) -> &'static str {
    match kind {
        InteractionType::Ping => "ping",
        InteractionType::ApplicationCommand => "command",
        InteractionType::MessageComponent => "component",
        InteractionType::Autocomplete => "autocomplete",
        InteractionType::ModalSubmit => "modal submit",
    }
}

fn check_message(message: &Message) -> ResponseResult<()> {
    if let Some(content) = &message.content {
        let len = content.chars().count();
        if len > MAX_CONTENT_LEN {
            return Err(ResponseError::ContentTooLong(len));
        }
    }
    if message.embeds.len() > MAX_EMBEDS {
        return Err(ResponseError::TooManyEmbeds(message.embeds.len()));
    }
    if let Some(rows) = &message.components {
        check_rows(rows)?;
    }
    Ok(())
}

fn check_rows(rows: &[ActionRow]) -> ResponseResult<()> {
    if rows.len() > MAX_ACTION_ROWS {
        return Err(ResponseError::TooManyRows(rows.len()));
    }
    for (row, r) in rows.iter().enumerate() {
        if r.components.len() > MAX_ROW_COMPONENTS {
            return Err(ResponseError::TooManyComponents {
                row,
                count: r.components.len(),
            });
        }
        for id in r.components.iter().filter_map(|c| c.custom_id.as_deref()) {
            check_custom_id(id)?;
        }
    }
    Ok(())
}

fn check_custom_id(id: &str) -> ResponseResult<()> {
    if id.chars().count() > MAX_CUSTOM_ID_LEN {
        return Err(ResponseError::CustomIdTooLong(id.to_string()));
    }
    Ok(())
}

fn check_modal(modal: &Modal) -> ResponseResult<()> {
    let title = modal.title.chars().count();
    if !(1..=MAX_MODAL_TITLE_LEN).contains(&title)
        || modal.components.is_empty()
        || modal.components.len() > MAX_ACTION_ROWS
    {
        return Err(ResponseError::InvalidModal);
    }
    check_custom_id(&modal.custom_id)?;
    check_rows(&modal.components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_core::model::{AutocompleteChoice, Embed, ResponseType};
    use rivet_core::{ButtonStyle, Component, TextInputStyle};

    fn button(id: &str) -> Component {
        Component::button(ButtonStyle::Primary, "go", id)
    }

    #[test]
    fn test_reply_kinds() {
        let cases = [
            (InteractionType::ApplicationCommand, Reply::message("hi"), ResponseType::ChannelMessage),
            (InteractionType::MessageComponent, Reply::update("hi"), ResponseType::UpdateMessage),
            (InteractionType::ApplicationCommand, Reply::defer(), ResponseType::DeferredChannelMessage),
            (InteractionType::ModalSubmit, Reply::defer_update(), ResponseType::DeferredUpdateMessage),
            (InteractionType::Autocomplete, Reply::autocomplete(["a"]), ResponseType::AutocompleteResult),
        ];
        for (kind, reply, expected) in cases {
            assert_eq!(build_response(kind, reply).unwrap().kind, expected);
        }
    }

    #[test]
    fn test_not_allowed() {
        let err = build_response(InteractionType::ApplicationCommand, Reply::update("x")).unwrap_err();
        assert_eq!(
            err,
            ResponseError::NotAllowed {
                reply: "update",
                interaction: "command"
            }
        );
        assert!(build_response(InteractionType::Autocomplete, Reply::message("x")).is_err());
        assert!(
            build_response(InteractionType::ApplicationCommand, Reply::autocomplete(["a"])).is_err()
        );
        let modal = Modal::new("form", "Title").row(Component::text_input(
            "name",
            TextInputStyle::Short,
            "Name",
        ));
        assert!(build_response(InteractionType::ModalSubmit, Reply::modal(modal.clone())).is_err());
        assert!(build_response(InteractionType::MessageComponent, Reply::modal(modal)).is_ok());
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message("")),
            Err(ResponseError::EmptyMessage)
        );
        // Clearing components is a valid update.
        let clear = Message::default().components(vec![]);
        assert!(build_response(InteractionType::MessageComponent, Reply::update(clear)).is_ok());
        assert_eq!(
            build_response(InteractionType::MessageComponent, Reply::update(Message::default())),
            Err(ResponseError::EmptyMessage)
        );
    }

    #[test]
    fn test_message_limits() {
        let long = "a".repeat(MAX_CONTENT_LEN + 1);
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message(long)),
            Err(ResponseError::ContentTooLong(MAX_CONTENT_LEN + 1))
        );
        // Limits count characters, not bytes.
        let wide = "é".repeat(MAX_CONTENT_LEN);
        assert!(build_response(InteractionType::ApplicationCommand, Reply::message(wide)).is_ok());

        let mut many_embeds = Message::new("x");
        for _ in 0..=MAX_EMBEDS {
            many_embeds = many_embeds.embed(Embed::new().title("t"));
        }
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message(many_embeds)),
            Err(ResponseError::TooManyEmbeds(MAX_EMBEDS + 1))
        );

        let mut rows = Message::new("x");
        for i in 0..6 {
            rows = rows.row(button(&format!("b{i}")));
        }
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message(rows)),
            Err(ResponseError::TooManyRows(6))
        );

        let wide_row = Message::new("x").row(ActionRow::new((0..6).map(|i| button(&format!("b{i}")))));
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message(wide_row)),
            Err(ResponseError::TooManyComponents { row: 0, count: 6 })
        );

        let long_id = "x".repeat(MAX_CUSTOM_ID_LEN + 1);
        let msg = Message::new("x").row(button(&long_id));
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::message(msg)),
            Err(ResponseError::CustomIdTooLong(long_id))
        );
    }

    #[test]
    fn test_modal_and_choices_limits() {
        let untitled = Modal::new("form", "").row(Component::text_input(
            "name",
            TextInputStyle::Short,
            "Name",
        ));
        assert_eq!(
            build_response(InteractionType::ApplicationCommand, Reply::modal(untitled)),
            Err(ResponseError::InvalidModal)
        );
        assert_eq!(
            build_response(
                InteractionType::ApplicationCommand,
                Reply::modal(Modal::new("form", "Empty"))
            ),
            Err(ResponseError::InvalidModal)
        );

        let choices: Vec<AutocompleteChoice> =
            (0..26).map(|i| AutocompleteChoice::new(i.to_string(), i)).collect();
        assert_eq!(
            build_response(InteractionType::Autocomplete, Reply::Autocomplete(choices)),
            Err(ResponseError::TooManyChoices(26))
        );
    }
}
