//! # Rivet Core
//!
//! Wire-level building blocks of the Rivet interactions framework.
//!
//! This crate knows how to check that a request really came from the
//! platform and how to turn its body into a typed [`Interaction`]. It knows
//! nothing about handlers or routing; those live in `rivet-framework`.
//!
//! ## Contents
//!
//! - **Signature Verifier**: Ed25519 over `timestamp ‖ body` ([`SignatureVerifier`])
//! - **Payload Decoder**: body → [`Interaction`] ([`decode_interaction`])
//! - **Wire Model**: interaction and response envelopes ([`model`])
//! - **Errors**: the dispatch error taxonomy ([`DispatchError`], [`ErrorCategory`])
//! - **Transport Types**: [`InteractionRequest`] / [`InteractionReply`]
//!
//! ## Request Flow
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌────────────────────┐   ┌─────────────┐
//! │ transport │──▶│ SignatureVerifier │──▶│ decode_interaction │──▶│ framework … │
//! └───────────┘   └──────────────────┘   └────────────────────┘   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rivet_core::{SignatureVerifier, decode_interaction, InteractionKind};
//!
//! let verifier = SignatureVerifier::from_hex(PUBLIC_KEY)?;
//! verifier.verify(timestamp, signature, &body)?;
//!
//! match decode_interaction(&body)?.kind {
//!     InteractionKind::Ping => { /* answer {"type":1} */ }
//!     other => { /* hand off to the dispatcher */ }
//! }
//! ```

pub mod error;
pub mod model;
pub mod transport;
pub mod verify;

pub use error::{
    DecodeError, DecodeResult, DispatchError, DispatchResult, ErrorCategory, VerifyError,
    VerifyResult,
};
pub use model::{
    ActionRow, AutocompleteChoice, ButtonStyle, CommandData, CommandDataOption, CommandType,
    Component, ComponentData, ComponentType, Embed, Interaction, InteractionKind,
    InteractionResponse, InteractionType, Member, Message, Modal, ModalSubmitData, OptionType,
    PartialChannel, Resolved, ResponseType, Role, SelectOption, Snowflake, TextInputStyle, User,
    decode_interaction,
};
pub use transport::{InteractionReply, InteractionRequest};
pub use verify::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};
