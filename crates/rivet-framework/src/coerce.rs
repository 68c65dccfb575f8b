//! Parameter declarations and argument coercion.
//!
//! Every command declares its parameters as an ordered list of
//! [`ParameterSpec`]s at registration time. When an invocation arrives, the
//! raw option values are checked against those declarations and turned into
//! typed [`Arguments`]:
//!
//! ```rust,ignore
//! let params = vec![
//!     ParameterSpec::string("fruit").choices(["apple", "pear"]),
//!     ParameterSpec::integer("count").range(1.0, 10.0).default(1),
//! ];
//!
//! let args = coerce(&params, &leaf_options, &data.resolved)?;
//! let count: i64 = args.get("count").unwrap_or(1);
//! ```

use std::cmp::Ordering;

use rivet_core::model::{CommandDataOption, OptionType, Resolved};
use rivet_core::{Member, PartialChannel, Role, Snowflake, User};
use serde_json::Value;

use crate::error::{CoercionError, CoercionResult, DefinitionError, DefinitionResult};

// =============================================================================
// Parameter Declarations
// =============================================================================

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
}

impl ParamType {
    /// The option type the platform uses for this parameter.
    pub fn option_type(self) -> OptionType {
        match self {
            Self::String => OptionType::String,
            Self::Integer => OptionType::Integer,
            Self::Number => OptionType::Number,
            Self::Boolean => OptionType::Boolean,
            Self::User => OptionType::User,
            Self::Channel => OptionType::Channel,
            Self::Role => OptionType::Role,
            Self::Mentionable => OptionType::Mentionable,
        }
    }

    /// Only strings, integers and numbers may declare choices or autocomplete.
    pub fn supports_choices(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }

    fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "whole number",
            Self::Number => "number",
            Self::Boolean => "true/false value",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Mentionable => "user or role",
        }
    }
}

/// One entry of a parameter's choice set.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub name: String,
    pub value: ArgValue,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<i64> for Choice {
    fn from(value: i64) -> Self {
        Self::new(value.to_string(), value)
    }
}

/// Declaration of one command parameter.
///
/// Constructors create a *required* parameter; call
/// [`optional`](Self::optional) or [`default`](Self::default) to relax that.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub kind: ParamType,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub default: Option<ArgValue>,
    /// Set when an autocomplete handler is attached to this parameter.
    pub autocomplete: bool,
}

macro_rules! param_constructors {
    ($($fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("A required `", stringify!($fn_name), "` parameter.")]
            pub fn $fn_name(name: impl Into<String>) -> Self {
                Self::new(name, ParamType::$kind)
            }
        )*
    };
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            required: true,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            default: None,
            autocomplete: false,
        }
    }

    param_constructors! {
        string => String,
        integer => Integer,
        number => Number,
        boolean => Boolean,
        user => User,
        channel => Channel,
        role => Role,
        mentionable => Mentionable,
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Makes the parameter optional, using `value` when it is omitted.
    pub fn default(mut self, value: impl Into<ArgValue>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    pub fn choice(mut self, choice: impl Into<Choice>) -> Self {
        self.choices.push(choice.into());
        self
    }

    pub fn choices<C: Into<Choice>>(mut self, choices: impl IntoIterator<Item = C>) -> Self {
        self.choices.extend(choices.into_iter().map(Into::into));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Inclusive numeric bounds.
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    /// Inclusive string length bounds, in characters.
    pub fn length(mut self, min: u16, max: u16) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    /// Checks the declaration itself.
    pub fn validate(&self) -> DefinitionResult<()> {
        validate_name(&self.name)?;

        if !self.choices.is_empty() {
            if !self.kind.supports_choices() {
                return Err(DefinitionError::ChoicesNotSupported(self.name.clone()));
            }
            for choice in &self.choices {
                if !choice.value.fits(self.kind) {
                    return Err(DefinitionError::ChoiceTypeMismatch {
                        param: self.name.clone(),
                        choice: choice.name.clone(),
                    });
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(DefinitionError::InvalidBounds(self.name.clone()));
            }
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(DefinitionError::InvalidBounds(self.name.clone()));
            }
        }

        if let Some(default) = &self.default {
            if self.required {
                return Err(DefinitionError::DefaultOnRequired(self.name.clone()));
            }
            if !default.fits(self.kind) {
                return Err(DefinitionError::DefaultTypeMismatch(self.name.clone()));
            }
        }
        Ok(())
    }
}

/// Validates a chat-input command, subcommand or parameter name.
pub fn validate_name(name: &str) -> DefinitionResult<()> {
    let len = name.chars().count();
    let valid = (1..=32).contains(&len)
        && name
            .chars()
            .all(|c| (c.is_alphanumeric() && !c.is_uppercase()) || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DefinitionError::InvalidName(name.to_string()))
    }
}

/// Validates an ordered parameter list.
pub fn validate_params(params: &[ParameterSpec]) -> DefinitionResult<()> {
    let mut seen_optional = false;
    for (i, param) in params.iter().enumerate() {
        param.validate()?;
        if params[..i].iter().any(|p| p.name == param.name) {
            return Err(DefinitionError::DuplicateParameter(param.name.clone()));
        }
        if param.required && seen_optional {
            return Err(DefinitionError::RequiredAfterOptional(param.name.clone()));
        }
        seen_optional |= !param.required;
    }
    Ok(())
}

// =============================================================================
// Argument Values
// =============================================================================

/// A user argument with whatever entity data the platform resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct UserArg {
    pub id: Snowflake,
    pub user: Option<User>,
    pub member: Option<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelArg {
    pub id: Snowflake,
    pub channel: Option<PartialChannel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleArg {
    pub id: Snowflake,
    pub role: Option<Role>,
}

/// A mentionable resolves to either a user or a role.
#[derive(Debug, Clone, PartialEq)]
pub enum MentionableArg {
    User(UserArg),
    Role(RoleArg),
    /// The platform did not resolve the id.
    Unresolved(Snowflake),
}

impl MentionableArg {
    pub fn id(&self) -> Snowflake {
        match self {
            Self::User(u) => u.id,
            Self::Role(r) => r.id,
            Self::Unresolved(id) => *id,
        }
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(UserArg),
    Channel(ChannelArg),
    Role(RoleArg),
    Mentionable(MentionableArg),
}

impl ArgValue {
    /// Returns `true` if this value is acceptable for a parameter of `kind`.
    fn fits(&self, kind: ParamType) -> bool {
        matches!(
            (self, kind),
            (Self::String(_), ParamType::String)
                | (Self::Integer(_), ParamType::Integer)
                | (Self::Integer(_) | Self::Number(_), ParamType::Number)
                | (Self::Boolean(_), ParamType::Boolean)
                | (Self::User(_), ParamType::User)
                | (Self::Channel(_), ParamType::Channel)
                | (Self::Role(_), ParamType::Role)
                | (Self::Mentionable(_), ParamType::Mentionable)
        )
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Orders a numeric value against a bound. Integers compare exactly.
    fn cmp_bound(&self, bound: f64) -> Option<Ordering> {
        match self {
            Self::Integer(i) => cmp_int_float(*i, bound),
            Self::Number(n) => n.partial_cmp(&bound),
            _ => None,
        }
    }

    /// Compares against a choice value, treating integers and numbers alike.
    fn matches_choice(&self, choice: &ArgValue) -> bool {
        match (self, choice) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(_) | Self::Number(_), Self::Number(b)) => {
                self.cmp_bound(*b) == Some(Ordering::Equal)
            }
            (Self::Number(a), Self::Integer(b)) => cmp_int_float(*b, *a) == Some(Ordering::Equal),
            _ => self == choice,
        }
    }
}

/// Exact ordering of `i` against `bound`, without rounding `i` to `f64`.
fn cmp_int_float(i: i64, bound: f64) -> Option<Ordering> {
    // i64 spans [-2^63, 2^63) and both ends are exact in f64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if bound.is_nan() {
        None
    } else if bound >= LIMIT {
        Some(Ordering::Less)
    } else if bound < -LIMIT {
        Some(Ordering::Greater)
    } else {
        let whole = bound.trunc() as i64;
        match i.cmp(&whole) {
            Ordering::Equal => 0.0_f64.partial_cmp(&bound.fract()),
            other => Some(other),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Types that can be read out of [`Arguments`].
pub trait FromArg: Sized {
    fn from_arg(value: &ArgValue) -> Option<Self>;
}

impl FromArg for ArgValue {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromArg for String {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromArg for i64 {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromArg for f64 {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        value.as_f64()
    }
}

impl FromArg for bool {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromArg for UserArg {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::User(u) => Some(u.clone()),
            ArgValue::Mentionable(MentionableArg::User(u)) => Some(u.clone()),
            _ => None,
        }
    }
}

impl FromArg for ChannelArg {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Channel(c) => Some(c.clone()),
            _ => None,
        }
    }
}

impl FromArg for RoleArg {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Role(r) => Some(r.clone()),
            ArgValue::Mentionable(MentionableArg::Role(r)) => Some(r.clone()),
            _ => None,
        }
    }
}

impl FromArg for MentionableArg {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Mentionable(m) => Some(m.clone()),
            _ => None,
        }
    }
}

/// Any entity argument yields its id.
impl FromArg for Snowflake {
    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::User(u) => Some(u.id),
            ArgValue::Channel(c) => Some(c.id),
            ArgValue::Role(r) => Some(r.id),
            ArgValue::Mentionable(m) => Some(m.id()),
            _ => None,
        }
    }
}

/// Coerced arguments of one invocation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, ArgValue)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, value: ArgValue) {
        self.values.push((name, value));
    }

    /// The raw value of `name`.
    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Reads `name` as `T`; `None` when absent or of another type.
    pub fn get<T: FromArg>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_arg)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Coercion
// =============================================================================

/// Coerces leaf options against their declarations.
///
/// Fails on the first undeclared option, type mismatch, choice violation,
/// bound violation or missing required parameter. Omitted optional
/// parameters take their declared default, if any.
pub fn coerce(
    params: &[ParameterSpec],
    options: &[CommandDataOption],
    resolved: &Resolved,
) -> CoercionResult<Arguments> {
    for option in options {
        if !params.iter().any(|p| p.name == option.name) {
            return Err(CoercionError::Undeclared {
                name: option.name.clone(),
            });
        }
    }

    let mut args = Arguments::new();
    for param in params {
        match options.iter().find(|o| o.name == param.name) {
            Some(option) => {
                let raw = option.value.as_ref().unwrap_or(&Value::Null);
                args.insert(param.name.clone(), coerce_value(param, raw, resolved)?);
            }
            None if param.required => {
                return Err(CoercionError::Missing {
                    param: param.name.clone(),
                });
            }
            None => {
                if let Some(default) = &param.default {
                    args.insert(param.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(args)
}

/// Best-effort coercion for autocomplete requests.
///
/// The focused option is skipped, options that fail to coerce are dropped
/// and required parameters are not enforced: the user is still typing.
pub fn coerce_lenient(
    params: &[ParameterSpec],
    options: &[CommandDataOption],
    resolved: &Resolved,
) -> Arguments {
    let mut args = Arguments::new();
    for param in params {
        let provided = options
            .iter()
            .find(|o| o.name == param.name && !o.focused)
            .and_then(|o| o.value.as_ref())
            .and_then(|raw| coerce_value(param, raw, resolved).ok());
        match provided {
            Some(value) => args.insert(param.name.clone(), value),
            None => {
                if let Some(default) = &param.default {
                    args.insert(param.name.clone(), default.clone());
                }
            }
        }
    }
    args
}

fn coerce_value(param: &ParameterSpec, raw: &Value, resolved: &Resolved) -> CoercionResult<ArgValue> {
    let wrong_type = || CoercionError::WrongType {
        param: param.name.clone(),
        expected: param.kind.name(),
    };

    let value = match param.kind {
        ParamType::String => ArgValue::String(raw.as_str().ok_or_else(wrong_type)?.to_string()),
        ParamType::Integer => ArgValue::Integer(raw.as_i64().ok_or_else(wrong_type)?),
        ParamType::Number => ArgValue::Number(raw.as_f64().ok_or_else(wrong_type)?),
        ParamType::Boolean => ArgValue::Boolean(raw.as_bool().ok_or_else(wrong_type)?),
        ParamType::User => {
            let id = snowflake(raw).ok_or_else(wrong_type)?;
            ArgValue::User(resolve_user(id, resolved))
        }
        ParamType::Channel => {
            let id = snowflake(raw).ok_or_else(wrong_type)?;
            ArgValue::Channel(ChannelArg {
                id,
                channel: resolved.channels.get(&id).cloned(),
            })
        }
        ParamType::Role => {
            let id = snowflake(raw).ok_or_else(wrong_type)?;
            ArgValue::Role(RoleArg {
                id,
                role: resolved.roles.get(&id).cloned(),
            })
        }
        ParamType::Mentionable => {
            let id = snowflake(raw).ok_or_else(wrong_type)?;
            let mentionable = if resolved.users.contains_key(&id) {
                MentionableArg::User(resolve_user(id, resolved))
            } else if let Some(role) = resolved.roles.get(&id) {
                MentionableArg::Role(RoleArg {
                    id,
                    role: Some(role.clone()),
                })
            } else {
                MentionableArg::Unresolved(id)
            };
            ArgValue::Mentionable(mentionable)
        }
    };

    check_constraints(param, &value)?;
    Ok(value)
}

fn check_constraints(param: &ParameterSpec, value: &ArgValue) -> CoercionResult<()> {
    if !param.choices.is_empty() && !param.choices.iter().any(|c| value.matches_choice(&c.value)) {
        return Err(CoercionError::NotAChoice {
            param: param.name.clone(),
        });
    }

    if param.kind.is_numeric() {
        if let Some(min) = param
            .min_value
            .filter(|min| value.cmp_bound(*min) == Some(Ordering::Less))
        {
            return Err(CoercionError::BelowMinimum {
                param: param.name.clone(),
                min,
            });
        }
        if let Some(max) = param
            .max_value
            .filter(|max| value.cmp_bound(*max) == Some(Ordering::Greater))
        {
            return Err(CoercionError::AboveMaximum {
                param: param.name.clone(),
                max,
            });
        }
    }

    if let ArgValue::String(s) = value {
        let len = s.chars().count();
        if let Some(min) = param.min_length.filter(|min| len < usize::from(*min)) {
            return Err(CoercionError::TooShort {
                param: param.name.clone(),
                min,
            });
        }
        if let Some(max) = param.max_length.filter(|max| len > usize::from(*max)) {
            return Err(CoercionError::TooLong {
                param: param.name.clone(),
                max,
            });
        }
    }
    Ok(())
}

fn snowflake(raw: &Value) -> Option<Snowflake> {
    match raw {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(Snowflake::new),
        _ => None,
    }
}

fn resolve_user(id: Snowflake, resolved: &Resolved) -> UserArg {
    UserArg {
        id,
        user: resolved.users.get(&id).cloned(),
        member: resolved.members.get(&id).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(name: &str, value: Value) -> CommandDataOption {
        CommandDataOption {
            name: name.to_string(),
            kind: None,
            value: Some(value),
            options: Vec::new(),
            focused: false,
        }
    }

    #[test]
    fn test_basic_types() {
        let params = vec![
            ParameterSpec::string("text"),
            ParameterSpec::integer("count"),
            ParameterSpec::number("ratio"),
            ParameterSpec::boolean("loud"),
        ];
        let options = vec![
            option("text", json!("hi")),
            option("count", json!(3)),
            option("ratio", json!(2)),
            option("loud", json!(true)),
        ];
        let args = coerce(&params, &options, &Resolved::default()).unwrap();

        assert_eq!(args.get::<String>("text").as_deref(), Some("hi"));
        assert_eq!(args.get::<i64>("count"), Some(3));
        assert_eq!(args.get::<f64>("ratio"), Some(2.0));
        assert_eq!(args.get::<bool>("loud"), Some(true));
        assert_eq!(args.get::<String>("count"), None);
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_wrong_type() {
        let params = vec![ParameterSpec::integer("count")];
        let err = coerce(&params, &[option("count", json!("3"))], &Resolved::default()).unwrap_err();
        assert!(matches!(err, CoercionError::WrongType { ref param, .. } if param == "count"));

        let err = coerce(&params, &[option("count", json!(1.5))], &Resolved::default()).unwrap_err();
        assert!(matches!(err, CoercionError::WrongType { .. }));
    }

    #[test]
    fn test_choices() {
        let params = vec![ParameterSpec::string("fruit").choices(["apple", "pear"])];
        assert!(coerce(&params, &[option("fruit", json!("apple"))], &Resolved::default()).is_ok());

        let err = coerce(&params, &[option("fruit", json!("kiwi"))], &Resolved::default()).unwrap_err();
        assert_eq!(
            err,
            CoercionError::NotAChoice {
                param: "fruit".to_string()
            }
        );
        assert!(err.to_string().contains("fruit"));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let resolved = Resolved::default();
        let above_2_53 = 9_007_199_254_740_993_i64;

        let params = vec![ParameterSpec::integer("n").choice(above_2_53)];
        assert!(coerce(&params, &[option("n", json!(above_2_53))], &resolved).is_ok());
        assert!(matches!(
            coerce(&params, &[option("n", json!(above_2_53 - 1))], &resolved),
            Err(CoercionError::NotAChoice { .. })
        ));

        let params = vec![ParameterSpec::integer("n").range(0.0, 9_007_199_254_740_992.0)];
        assert!(coerce(&params, &[option("n", json!(above_2_53 - 1))], &resolved).is_ok());
        assert!(matches!(
            coerce(&params, &[option("n", json!(above_2_53))], &resolved),
            Err(CoercionError::AboveMaximum { .. })
        ));

        let params = vec![ParameterSpec::integer("n").range(-0.5, 1e300)];
        assert!(coerce(&params, &[option("n", json!(i64::MAX))], &resolved).is_ok());
        assert!(coerce(&params, &[option("n", json!(0))], &resolved).is_ok());
        assert!(matches!(
            coerce(&params, &[option("n", json!(-1))], &resolved),
            Err(CoercionError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_number_matches_integer_choice() {
        let params = vec![ParameterSpec::number("ratio").choice(2_i64)];
        let resolved = Resolved::default();
        assert!(coerce(&params, &[option("ratio", json!(2.0))], &resolved).is_ok());
        assert!(matches!(
            coerce(&params, &[option("ratio", json!(2.5))], &resolved),
            Err(CoercionError::NotAChoice { .. })
        ));
    }

    #[test]
    fn test_cmp_int_float() {
        assert_eq!(cmp_int_float(3, 2.5), Some(Ordering::Greater));
        assert_eq!(cmp_int_float(2, 2.5), Some(Ordering::Less));
        assert_eq!(cmp_int_float(-2, -2.5), Some(Ordering::Greater));
        assert_eq!(cmp_int_float(-3, -2.5), Some(Ordering::Less));
        assert_eq!(cmp_int_float(7, 7.0), Some(Ordering::Equal));
        assert_eq!(cmp_int_float(i64::MAX, 9_223_372_036_854_775_808.0), Some(Ordering::Less));
        assert_eq!(cmp_int_float(i64::MIN, -9_223_372_036_854_775_808.0), Some(Ordering::Equal));
        assert_eq!(cmp_int_float(0, f64::NAN), None);
    }

    #[test]
    fn test_required_and_defaults() {
        let params = vec![
            ParameterSpec::string("name"),
            ParameterSpec::integer("times").default(2),
            ParameterSpec::boolean("quiet").optional(),
        ];
        let err = coerce(&params, &[], &Resolved::default()).unwrap_err();
        assert_eq!(
            err,
            CoercionError::Missing {
                param: "name".to_string()
            }
        );

        let args = coerce(&params, &[option("name", json!("x"))], &Resolved::default()).unwrap();
        assert_eq!(args.get::<i64>("times"), Some(2));
        assert!(!args.contains("quiet"));
    }

    #[test]
    fn test_bounds() {
        let params = vec![
            ParameterSpec::integer("n").range(1.0, 10.0),
            ParameterSpec::string("s").length(2, 4).optional(),
        ];
        let resolved = Resolved::default();

        assert!(matches!(
            coerce(&params, &[option("n", json!(0))], &resolved),
            Err(CoercionError::BelowMinimum { .. })
        ));
        assert!(matches!(
            coerce(&params, &[option("n", json!(11))], &resolved),
            Err(CoercionError::AboveMaximum { .. })
        ));
        assert!(coerce(&params, &[option("n", json!(10))], &resolved).is_ok());
        assert!(matches!(
            coerce(&params, &[option("n", json!(5)), option("s", json!("a"))], &resolved),
            Err(CoercionError::TooShort { .. })
        ));
        assert!(matches!(
            coerce(&params, &[option("n", json!(5)), option("s", json!("abcde"))], &resolved),
            Err(CoercionError::TooLong { .. })
        ));
        assert!(coerce(&params, &[option("n", json!(5)), option("s", json!("äöü"))], &resolved).is_ok());
    }

    #[test]
    fn test_undeclared_option() {
        let params = vec![ParameterSpec::string("a")];
        let err = coerce(
            &params,
            &[option("a", json!("x")), option("b", json!("y"))],
            &Resolved::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoercionError::Undeclared {
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn test_entities_attach_resolved_data() {
        let resolved: Resolved = serde_json::from_value(json!({
            "users": {"10": {"id": "10", "username": "ferris"}},
            "members": {"10": {"nick": "crab", "roles": []}},
            "roles": {"20": {"id": "20", "name": "mods"}}
        }))
        .unwrap();
        let params = vec![
            ParameterSpec::user("who"),
            ParameterSpec::mentionable("ping"),
            ParameterSpec::channel("where").optional(),
        ];
        let options = vec![
            option("who", json!("10")),
            option("ping", json!("20")),
            option("where", json!("30")),
        ];
        let args = coerce(&params, &options, &resolved).unwrap();

        let who: UserArg = args.get("who").unwrap();
        assert_eq!(who.user.unwrap().username, "ferris");
        assert_eq!(who.member.unwrap().nick.as_deref(), Some("crab"));

        let ping: RoleArg = args.get("ping").unwrap();
        assert_eq!(ping.role.unwrap().name, "mods");

        let channel: ChannelArg = args.get("where").unwrap();
        assert_eq!(channel.id, Snowflake::new(30));
        assert!(channel.channel.is_none());
        assert_eq!(args.get::<Snowflake>("who"), Some(Snowflake::new(10)));
    }

    #[test]
    fn test_lenient_skips_invalid_and_focused() {
        let params = vec![
            ParameterSpec::string("query"),
            ParameterSpec::integer("limit").range(1.0, 5.0),
        ];
        let mut focused = option("query", json!("app"));
        focused.focused = true;
        let args = coerce_lenient(&params, &[focused, option("limit", json!(99))], &Resolved::default());
        assert!(args.is_empty());
    }

    #[test]
    fn test_spec_validation() {
        assert!(validate_params(&[ParameterSpec::string("ok-name_1")]).is_ok());
        assert_eq!(
            validate_params(&[ParameterSpec::string("Bad")]),
            Err(DefinitionError::InvalidName("Bad".to_string()))
        );
        assert_eq!(
            validate_params(&[ParameterSpec::boolean("b").choice("x")]),
            Err(DefinitionError::ChoicesNotSupported("b".to_string()))
        );
        assert!(matches!(
            validate_params(&[ParameterSpec::integer("i").choice("x")]),
            Err(DefinitionError::ChoiceTypeMismatch { .. })
        ));
        assert_eq!(
            validate_params(&[ParameterSpec::integer("i").range(5.0, 1.0)]),
            Err(DefinitionError::InvalidBounds("i".to_string()))
        );
        assert_eq!(
            validate_params(&[ParameterSpec::string("a").optional(), ParameterSpec::string("b")]),
            Err(DefinitionError::RequiredAfterOptional("b".to_string()))
        );
        assert_eq!(
            validate_params(&[ParameterSpec::string("a"), ParameterSpec::string("a")]),
            Err(DefinitionError::DuplicateParameter("a".to_string()))
        );
        assert_eq!(
            validate_params(&[ParameterSpec::string("a").default(3)]),
            Err(DefinitionError::DefaultTypeMismatch("a".to_string()))
        );
    }
}
