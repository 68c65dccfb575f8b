//! Typed component state.
//!
//! A component declares the shape of the state it carries as a
//! [`StateSchema`]: an ordered list of [`FieldType`]s. Handlers work with
//! plain Rust values through the [`ComponentState`] trait, which is
//! implemented for `()` and tuples of [`StateField`] types:
//!
//! ```rust,ignore
//! // A counter button carrying (count, owner)
//! type CounterState = (i64, Snowflake);
//!
//! let token = encode_state("ctr", (5_i64, user_id))?;
//! ```
//!
//! User structs implement [`ComponentState`] by hand, mapping their fields
//! to and from [`StateValue`]s in a fixed order.

use rivet_core::Snowflake;

use crate::error::{CodecError, CodecResult};

/// Wire type of one state field. The discriminant is the field's tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool = 1,
    Int = 2,
    Uint = 3,
    Float = 4,
    String = 5,
    Snowflake = 6,
}

impl FieldType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => Self::Bool,
            2 => Self::Int,
            3 => Self::Uint,
            4 => Self::Float,
            5 => Self::String,
            6 => Self::Snowflake,
            _ => return None,
        })
    }
}

/// A single decoded state value.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Snowflake(Snowflake),
}

impl StateValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Bool(_) => FieldType::Bool,
            Self::Int(_) => FieldType::Int,
            Self::Uint(_) => FieldType::Uint,
            Self::Float(_) => FieldType::Float,
            Self::String(_) => FieldType::String,
            Self::Snowflake(_) => FieldType::Snowflake,
        }
    }
}

/// Ordered field types of a component's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSchema {
    fields: Vec<FieldType>,
}

impl StateSchema {
    pub fn new(fields: impl IntoIterator<Item = FieldType>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// The schema of a typed state.
    pub fn of<S: ComponentState>() -> Self {
        S::schema()
    }

    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if `values` has exactly this schema's shape.
    pub fn matches(&self, values: &[StateValue]) -> bool {
        values.len() == self.fields.len()
            && values
                .iter()
                .zip(&self.fields)
                .all(|(v, t)| v.field_type() == *t)
    }
}

// =============================================================================
// Typed Fields
// =============================================================================

/// A Rust type storable as one state field.
pub trait StateField: Sized {
    const TYPE: FieldType;

    fn into_value(self) -> StateValue;

    /// Converts back, returning `None` when the value has the wrong type or
    /// does not fit `Self`.
    fn from_value(value: StateValue) -> Option<Self>;
}

impl StateField for bool {
    const TYPE: FieldType = FieldType::Bool;

    fn into_value(self) -> StateValue {
        StateValue::Bool(self)
    }

    fn from_value(value: StateValue) -> Option<Self> {
        match value {
            StateValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! impl_int_field {
    ($variant:ident, $wide:ty, $field:ident: $($ty:ty),*) => {
        $(
            impl StateField for $ty {
                const TYPE: FieldType = FieldType::$field;

                fn into_value(self) -> StateValue {
                    StateValue::$variant(<$wide>::from(self))
                }

                fn from_value(value: StateValue) -> Option<Self> {
                    match value {
                        StateValue::$variant(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_int_field!(Int, i64, Int: i64, i32, i16, i8);
impl_int_field!(Uint, u64, Uint: u64, u32, u16, u8);

impl StateField for f64 {
    const TYPE: FieldType = FieldType::Float;

    fn into_value(self) -> StateValue {
        StateValue::Float(self)
    }

    fn from_value(value: StateValue) -> Option<Self> {
        match value {
            StateValue::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl StateField for String {
    const TYPE: FieldType = FieldType::String;

    fn into_value(self) -> StateValue {
        StateValue::String(self)
    }

    fn from_value(value: StateValue) -> Option<Self> {
        match value {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl StateField for Snowflake {
    const TYPE: FieldType = FieldType::Snowflake;

    fn into_value(self) -> StateValue {
        StateValue::Snowflake(self)
    }

    fn from_value(value: StateValue) -> Option<Self> {
        match value {
            StateValue::Snowflake(id) => Some(id),
            _ => None,
        }
    }
}

// =============================================================================
// ComponentState
// =============================================================================

/// A typed state tuple carried inside a component identifier.
pub trait ComponentState: Sized + Send + 'static {
    /// Field types, in encoding order.
    fn schema() -> StateSchema;

    /// Flattens the state into values matching [`schema`](Self::schema).
    fn into_values(self) -> Vec<StateValue>;

    /// Rebuilds the state. Fails without a partial result when the values do
    /// not match the schema or do not fit the field types.
    fn from_values(values: Vec<StateValue>) -> CodecResult<Self>;
}

impl ComponentState for () {
    fn schema() -> StateSchema {
        StateSchema::default()
    }

    fn into_values(self) -> Vec<StateValue> {
        Vec::new()
    }

    fn from_values(values: Vec<StateValue>) -> CodecResult<Self> {
        if values.is_empty() {
            Ok(())
        } else {
            Err(CodecError::FieldCount {
                expected: 0,
                got: values.len(),
            })
        }
    }
}

macro_rules! impl_component_state {
    ($len:expr; $($ty:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($ty,)+> ComponentState for ($($ty,)+)
        where
            $( $ty: StateField + Send + 'static, )+
        {
            fn schema() -> StateSchema {
                StateSchema::new([$($ty::TYPE,)+])
            }

            fn into_values(self) -> Vec<StateValue> {
                let ($($ty,)+) = self;
                vec![$($ty.into_value(),)+]
            }

            fn from_values(values: Vec<StateValue>) -> CodecResult<Self> {
                if values.len() != $len {
                    return Err(CodecError::FieldCount {
                        expected: $len,
                        got: values.len(),
                    });
                }
                let mut iter = values.into_iter().enumerate();
                $(
                    let $ty = match iter.next() {
                        Some((index, value)) => {
                            $ty::from_value(value).ok_or(CodecError::OutOfRange { index })?
                        }
                        None => return Err(CodecError::SchemaMismatch),
                    };
                )+
                Ok(($($ty,)+))
            }
        }
    };
}

impl_component_state!(1; A);
impl_component_state!(2; A, B);
impl_component_state!(3; A, B, C);
impl_component_state!(4; A, B, C, D);
impl_component_state!(5; A, B, C, D, E);
impl_component_state!(6; A, B, C, D, E, F);
impl_component_state!(7; A, B, C, D, E, F, G);
impl_component_state!(8; A, B, C, D, E, F, G, H);
