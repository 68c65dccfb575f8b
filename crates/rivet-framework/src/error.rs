//! Error types for the Rivet framework.

use rivet_core::DispatchError;
use thiserror::Error;

use crate::state::FieldType;

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors that can occur while extracting handler parameters.
///
/// Extraction failures are programming errors (for example asking for
/// component state inside a slash-command handler) and surface as handler
/// faults.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The context does not carry the requested data.
    #[error("{what} is not available for this interaction")]
    Unavailable {
        /// Name of the missing piece.
        what: &'static str,
    },

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates an unavailable error.
    pub fn unavailable(what: &'static str) -> Self {
        Self::Unavailable { what }
    }

    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

impl From<ExtractError> for DispatchError {
    fn from(err: ExtractError) -> Self {
        DispatchError::fault(err.to_string())
    }
}

// =============================================================================
// Coercion Errors
// =============================================================================

/// Validation failures while turning raw option values into [`Arguments`].
///
/// Messages are shown to the invoking user, so they name the parameter but
/// never echo internal details.
///
/// [`Arguments`]: crate::coerce::Arguments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("parameter `{param}` is required")]
    Missing { param: String },

    #[error("parameter `{param}` must be a {expected}")]
    WrongType {
        param: String,
        expected: &'static str,
    },

    #[error("`{param}` must be one of the offered choices")]
    NotAChoice { param: String },

    #[error("`{param}` must be at least {min}")]
    BelowMinimum { param: String, min: f64 },

    #[error("`{param}` must be at most {max}")]
    AboveMaximum { param: String, max: f64 },

    #[error("`{param}` must be at least {min} characters long")]
    TooShort { param: String, min: u16 },

    #[error("`{param}` must be at most {max} characters long")]
    TooLong { param: String, max: u16 },

    #[error("unexpected option `{name}`")]
    Undeclared { name: String },
}

impl From<CoercionError> for DispatchError {
    fn from(err: CoercionError) -> Self {
        DispatchError::malformed(err.to_string())
    }
}

// =============================================================================
// Codec Errors
// =============================================================================

/// Errors from the component state codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The encoded identifier exceeds the platform's length limit.
    #[error("encoded component id is {len} characters, limit is {max}")]
    TooLong { len: usize, max: usize },

    /// The identifier does not start with `prefix:`.
    #[error("component id does not carry the expected prefix")]
    PrefixMismatch,

    #[error("component state is not valid base64url")]
    Base64,

    #[error("component state is truncated")]
    Truncated,

    #[error("component state checksum mismatch")]
    Checksum,

    #[error("unsupported component state version {0}")]
    Version(u8),

    #[error("component state has {got} fields, expected {expected}")]
    FieldCount { expected: usize, got: usize },

    #[error("field {index} has tag {got}, expected {expected:?}")]
    TagMismatch {
        index: usize,
        expected: FieldType,
        got: u8,
    },

    #[error("varint overflow in component state")]
    VarintOverflow,

    #[error("component state contains invalid UTF-8")]
    Utf8,

    #[error("component state has {0} trailing bytes")]
    TrailingBytes(usize),

    /// A decoded value does not fit the target Rust type.
    #[error("field {index} is out of range for its type")]
    OutOfRange { index: usize },

    /// Values handed to the encoder do not match the schema.
    #[error("state values do not match the declared schema")]
    SchemaMismatch,
}

impl From<CodecError> for DispatchError {
    fn from(err: CodecError) -> Self {
        DispatchError::unknown_route(err.to_string())
    }
}

// =============================================================================
// Definition & Registry Errors
// =============================================================================

/// A command, parameter or component definition is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("invalid name `{0}`: must be 1-32 lowercase letters, digits, `-` or `_`")]
    InvalidName(String),

    #[error("subcommand path of `{command}` has {depth} segments, at most 2 are allowed")]
    PathTooDeep { command: String, depth: usize },

    #[error("duplicate parameter `{0}`")]
    DuplicateParameter(String),

    #[error("required parameter `{0}` follows an optional one")]
    RequiredAfterOptional(String),

    #[error("parameter `{0}` declares choices but its type does not support them")]
    ChoicesNotSupported(String),

    #[error("choice `{choice}` of parameter `{param}` does not match its type")]
    ChoiceTypeMismatch { param: String, choice: String },

    #[error("parameter `{0}` has min greater than max")]
    InvalidBounds(String),

    #[error("parameter `{0}` declares a default but is required")]
    DefaultOnRequired(String),

    #[error("default of parameter `{0}` does not match its type")]
    DefaultTypeMismatch(String),

    #[error("context-menu command `{0}` cannot declare parameters or subcommands")]
    ContextMenuShape(String),

    #[error("autocomplete target `{0}` is not an autocompletable parameter")]
    InvalidAutocomplete(String),

    #[error("`{0}` has no handler")]
    MissingHandler(String),

    #[error("invalid component prefix `{0}`: must be 1-64 ASCII characters without `:`")]
    InvalidPrefix(String),
}

/// Errors raised while building the [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("command `{name}` is registered twice in {scope}")]
    DuplicateCommand { name: String, scope: String },

    #[error("command `{name}` mixes a bare invocation with subcommands in {scope}")]
    PathConflict { name: String, scope: String },

    #[error("component prefix `{0}` is registered twice")]
    DuplicateComponent(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

// =============================================================================
// Response Errors
// =============================================================================

/// A handler produced a reply the platform would reject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("{reply} reply is not valid for a {interaction} interaction")]
    NotAllowed {
        reply: &'static str,
        interaction: &'static str,
    },

    #[error("message has no content, embeds or components")]
    EmptyMessage,

    #[error("message content is {0} characters, limit is 2000")]
    ContentTooLong(usize),

    #[error("message has {0} embeds, limit is 10")]
    TooManyEmbeds(usize),

    #[error("{0} action rows, limit is 5")]
    TooManyRows(usize),

    #[error("action row {row} has {count} components, limit is 5")]
    TooManyComponents { row: usize, count: usize },

    #[error("component id `{0}` exceeds 100 characters")]
    CustomIdTooLong(String),

    #[error("{0} autocomplete choices, limit is 25")]
    TooManyChoices(usize),

    #[error("modal must have a title of 1-45 characters and 1-5 rows")]
    InvalidModal,
}

impl From<ResponseError> for DispatchError {
    fn from(err: ResponseError) -> Self {
        DispatchError::fault(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for argument coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Result type for the state codec.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for definition validation.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result type for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for response building.
pub type ResponseResult<T> = Result<T, ResponseError>;
