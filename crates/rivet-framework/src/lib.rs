//! # Rivet Framework
//!
//! Everything between a decoded [`Interaction`](rivet_core::Interaction) and
//! its [`InteractionResponse`](rivet_core::InteractionResponse):
//!
//! - [`registry`]: command and component definitions, frozen at startup
//! - [`router`]: subcommand path resolution and definition lookup
//! - [`coerce`]: typed, validated arguments from raw options
//! - [`state`]: component state carried inside identifiers
//! - [`check`]: pre-invoke command checks
//! - [`handler`] and [`extractor`]: Axum-style handler functions
//! - [`executor`]: async and blocking execution under a timeout
//! - [`response`]: reply validation and envelope construction
//! - [`dispatcher`]: the pipeline tying them together
//!
//! The framework holds no mutable state. A [`Registry`] is built once and
//! shared; everything else lives for a single request.

pub mod check;
pub mod coerce;
pub mod command;
pub mod component;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod handler;
pub mod registry;
pub mod reply;
pub mod response;
pub mod router;
pub mod state;

pub use check::{Check, run_checks};
pub use coerce::{
    ArgValue, Arguments, ChannelArg, Choice, FromArg, MentionableArg, ParamType, ParameterSpec,
    RoleArg, UserArg, coerce, coerce_lenient,
};
pub use command::{CommandDefinition, CommandScope};
pub use component::{ComponentDefinition, ComponentId};
pub use context::{FocusedOption, InteractionContext};
pub use dispatcher::Dispatcher;
pub use error::{
    CodecError, CodecResult, CoercionError, CoercionResult, DefinitionError, DefinitionResult,
    ExtractError, ExtractResult, RegistryError, RegistryResult, ResponseError, ResponseResult,
};
pub use executor::{DEFAULT_RESPONSE_TIMEOUT, DEFAULT_WORKER_THREADS, Executor};
pub use extractor::{FromContext, GuildId, Invoker, ModalFields, SelectValues, State, Target};
pub use handler::{BoxedHandler, ExecutionMode, Handler, SyncHandler};
pub use registry::{Registry, RegistryBuilder};
pub use reply::{IntoReply, Reply};
pub use response::build_response;
pub use router::{Route, Router};
pub use state::{
    ComponentState, FieldType, StateField, StateSchema, StateValue, decode_state, encode_state,
};
