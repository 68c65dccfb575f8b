//! Stateless component state: typed schemas and the identifier codec.

pub mod codec;
pub mod schema;

pub use codec::{MAX_CUSTOM_ID_LEN, STATE_VERSION, decode, decode_state, encode, encode_state};
pub use schema::{ComponentState, FieldType, StateField, StateSchema, StateValue};
