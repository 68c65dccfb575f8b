//! # Rivet
//!
//! A stateless, type-safe framework for answering chat-platform interactions
//! over HTTP.
//!
//! ## Overview
//!
//! The platform POSTs every slash command, button press, select, autocomplete
//! request and modal submission to one endpoint and waits up to three
//! seconds for the answer. Rivet verifies the request signature, decodes the
//! payload, routes it to a registered handler with typed arguments and
//! returns the handler's reply as the HTTP response. No state is kept
//! between requests: component state travels inside the component's
//! `custom_id`.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌────────┐   ┌──────────┐   ┌──────────────┐
//! │ transport │──▶│ verify/decode│──▶│ router │──▶│ executor │──▶│ response     │
//! │  (axum)   │   │ (rivet-core) │   │        │   │ async /  │   │ builder      │
//! └───────────┘   └──────────────┘   └────────┘   │ worker   │   └──────────────┘
//!                                                  └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivet::prelude::*;
//!
//! async fn echo(args: Arguments) -> String {
//!     args.get::<String>("message").unwrap_or_default()
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     RivetRuntime::builder()
//!         .command(
//!             CommandDefinition::new("echo")
//!                 .param(ParameterSpec::string("message"))
//!                 .handler(echo),
//!         )
//!         .build()?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*, `yaml-config`: configuration file formats
//! - `json-log`: JSON log output
//! - `http-server` *(default)*: the bundled axum listener

pub use rivet_core as core;
pub use rivet_framework as framework;
pub use rivet_runtime as runtime;

/// Commonly used types for writing handlers and starting an application.
///
/// ```rust,ignore
/// use rivet::prelude::*;
/// ```
pub mod prelude {
    // Entry point
    pub use rivet_runtime::{RivetConfig, RivetRuntime, RuntimeError};

    // Definitions
    pub use rivet_framework::{
        Check, Choice, CommandDefinition, ComponentDefinition, ComponentId, ParameterSpec,
    };
    pub use rivet_core::DispatchError;
    pub use std::ops::ControlFlow;

    // Extractors and handler inputs
    pub use rivet_framework::{
        Arguments, ChannelArg, FocusedOption, GuildId, InteractionContext, Invoker,
        MentionableArg, ModalFields, RoleArg, SelectValues, State, Target, UserArg,
    };

    // Replies
    pub use rivet_framework::{IntoReply, Reply};
    pub use rivet_core::{
        ActionRow, AutocompleteChoice, ButtonStyle, Component, Embed, Message, Modal,
        SelectOption, TextInputStyle,
    };

    // Component state
    pub use rivet_framework::{ComponentState, decode_state, encode_state};

    pub use rivet_runtime::prelude::*;
}
