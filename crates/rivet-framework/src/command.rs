//! Command definitions.
//!
//! A [`CommandDefinition`] binds a command name, an optional subcommand path
//! and a parameter list to a handler:
//!
//! ```rust,ignore
//! CommandDefinition::new("echo")
//!     .description("Repeat a message")
//!     .param(ParameterSpec::string("message").length(1, 200))
//!     .handler(echo);
//!
//! CommandDefinition::new("admin")
//!     .subcommand(["user", "ban"])
//!     .param(ParameterSpec::user("target"))
//!     .guild(GUILD_ID)
//!     .check(Check::guild_only("Servers only."))
//!     .sync_handler(ban_user)
//!     .on_error(report_failure);
//!
//! CommandDefinition::user_menu("Inspect").handler(inspect);
//! ```

use std::collections::HashMap;

use rivet_core::{CommandType, Snowflake};

use crate::check::Check;
use crate::coerce::{ParameterSpec, validate_name, validate_params};
use crate::error::{DefinitionError, DefinitionResult};
use crate::handler::{BoxedHandler, ExecutionMode, Handler, SyncHandler};

/// Where a command is available.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandScope {
    Global,
    Guilds(Vec<Snowflake>),
}

/// A registered command.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    name: String,
    path: Vec<String>,
    description: String,
    kind: CommandType,
    params: Vec<ParameterSpec>,
    guilds: Vec<Snowflake>,
    handler: Option<BoxedHandler>,
    autocomplete: HashMap<String, BoxedHandler>,
    default_autocomplete: Option<BoxedHandler>,
    checks: Vec<Check>,
    on_error: Option<BoxedHandler>,
}

impl CommandDefinition {
    /// A chat-input (slash) command.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, CommandType::ChatInput)
    }

    /// A context-menu command on users.
    pub fn user_menu(name: impl Into<String>) -> Self {
        Self::with_kind(name, CommandType::User)
    }

    /// A context-menu command on messages.
    pub fn message_menu(name: impl Into<String>) -> Self {
        Self::with_kind(name, CommandType::Message)
    }

    fn with_kind(name: impl Into<String>, kind: CommandType) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
            description: String::new(),
            kind,
            params: Vec::new(),
            guilds: Vec::new(),
            handler: None,
            autocomplete: HashMap::new(),
            default_autocomplete: None,
            checks: Vec::new(),
            on_error: None,
        }
    }

    /// Sets the subcommand path: `[sub]` or `[group, sub]`.
    pub fn subcommand<S: Into<String>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.params.extend(params);
        self
    }

    /// Restricts the command to a guild. May be called repeatedly.
    pub fn guild(mut self, guild_id: impl Into<Snowflake>) -> Self {
        self.guilds.push(guild_id.into());
        self
    }

    /// Sets an async handler.
    pub fn handler<H: Handler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.handler = Some(BoxedHandler::from_async(handler));
        self
    }

    /// Sets a blocking handler, run on the worker pool.
    pub fn sync_handler<H: SyncHandler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.handler = Some(BoxedHandler::from_sync(handler));
        self
    }

    /// Attaches an async autocomplete handler to one parameter.
    pub fn autocomplete<H: Handler<T>, T: 'static>(mut self, param: impl Into<String>, handler: H) -> Self {
        self.autocomplete
            .insert(param.into(), BoxedHandler::from_async(handler));
        self
    }

    /// Attaches a blocking autocomplete handler to one parameter.
    pub fn sync_autocomplete<H: SyncHandler<T>, T: 'static>(
        mut self,
        param: impl Into<String>,
        handler: H,
    ) -> Self {
        self.autocomplete
            .insert(param.into(), BoxedHandler::from_sync(handler));
        self
    }

    /// Autocomplete handler for parameters without their own.
    pub fn default_autocomplete<H: Handler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.default_autocomplete = Some(BoxedHandler::from_async(handler));
        self
    }

    /// Appends a check to the pre-invoke pipeline.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Inserts a check at `index`, appending when out of range.
    pub fn check_at(mut self, index: usize, check: Check) -> Self {
        if index < self.checks.len() {
            self.checks.insert(index, check);
        } else {
            self.checks.push(check);
        }
        self
    }

    /// Sets an async handler for failures of this command's handler.
    ///
    /// It receives the failure through the [`DispatchError`] extractor and
    /// its reply replaces the generic error notice.
    ///
    /// [`DispatchError`]: rivet_core::DispatchError
    pub fn on_error<H: Handler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.on_error = Some(BoxedHandler::from_async(handler));
        self
    }

    /// Sets a blocking error handler, run on the worker pool.
    pub fn sync_on_error<H: SyncHandler<T>, T: 'static>(mut self, handler: H) -> Self {
        self.on_error = Some(BoxedHandler::from_sync(handler));
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// `name`, `name sub` or `name group sub`, for logs.
    pub fn qualified_name(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn scope(&self) -> CommandScope {
        if self.guilds.is_empty() {
            CommandScope::Global
        } else {
            CommandScope::Guilds(self.guilds.clone())
        }
    }

    pub(crate) fn guild_ids(&self) -> &[Snowflake] {
        &self.guilds
    }

    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        self.handler.as_ref().map(BoxedHandler::mode)
    }

    pub(crate) fn boxed_handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    /// The autocomplete handler for `param`, falling back to the default.
    pub(crate) fn autocomplete_handler(&self, param: &str) -> Option<&BoxedHandler> {
        self.autocomplete
            .get(param)
            .or(self.default_autocomplete.as_ref())
    }

    pub(crate) fn default_autocomplete_handler(&self) -> Option<&BoxedHandler> {
        self.default_autocomplete.as_ref()
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub(crate) fn error_handler(&self) -> Option<&BoxedHandler> {
        self.on_error.as_ref()
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Checks the definition and marks autocompleted parameters.
    pub(crate) fn validate(&mut self) -> DefinitionResult<()> {
        let qualified = self.qualified_name();

        match self.kind {
            CommandType::ChatInput => {
                validate_name(&self.name)?;
                for segment in &self.path {
                    validate_name(segment)?;
                }
            }
            CommandType::User | CommandType::Message => {
                let len = self.name.chars().count();
                if !(1..=32).contains(&len) {
                    return Err(DefinitionError::InvalidName(self.name.clone()));
                }
                if !self.params.is_empty() || !self.path.is_empty() {
                    return Err(DefinitionError::ContextMenuShape(self.name.clone()));
                }
            }
        }

        if self.path.len() > 2 {
            return Err(DefinitionError::PathTooDeep {
                command: qualified,
                depth: self.path.len(),
            });
        }
        if self.handler.is_none() {
            return Err(DefinitionError::MissingHandler(qualified));
        }

        validate_params(&self.params)?;

        for target in self.autocomplete.keys() {
            let param = self
                .params
                .iter_mut()
                .find(|p| &p.name == target)
                .filter(|p| p.kind.supports_choices() && p.choices.is_empty())
                .ok_or_else(|| DefinitionError::InvalidAutocomplete(target.clone()))?;
            param.autocomplete = true;
        }
        if self.default_autocomplete.is_some() {
            for param in &mut self.params {
                if param.kind.supports_choices() && param.choices.is_empty() {
                    param.autocomplete = true;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::Reply;

    async fn noop() -> &'static str {
        "ok"
    }

    async fn suggest() -> Reply {
        Reply::autocomplete(["a"])
    }

    #[test]
    fn test_qualified_name_and_scope() {
        let def = CommandDefinition::new("admin")
            .subcommand(["user", "ban"])
            .guild(5u64)
            .handler(noop);
        assert_eq!(def.qualified_name(), "admin user ban");
        assert_eq!(def.scope(), CommandScope::Guilds(vec![Snowflake::new(5)]));
        assert_eq!(def.execution_mode(), Some(ExecutionMode::Async));
    }

    #[test]
    fn test_validation() {
        assert!(CommandDefinition::new("ok").handler(noop).validate().is_ok());
        assert_eq!(
            CommandDefinition::new("ok").validate().unwrap_err(),
            DefinitionError::MissingHandler("ok".to_string())
        );
        assert!(matches!(
            CommandDefinition::new("Echo").handler(noop).validate(),
            Err(DefinitionError::InvalidName(_))
        ));
        assert!(matches!(
            CommandDefinition::new("a")
                .subcommand(["b", "c", "d"])
                .handler(noop)
                .validate(),
            Err(DefinitionError::PathTooDeep { depth: 3, .. })
        ));
        assert!(matches!(
            CommandDefinition::user_menu("Inspect User")
                .param(ParameterSpec::string("x"))
                .handler(noop)
                .validate(),
            Err(DefinitionError::ContextMenuShape(_))
        ));
        assert!(
            CommandDefinition::user_menu("Inspect User")
                .handler(noop)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_autocomplete_marks_param() {
        let mut def = CommandDefinition::new("fruit")
            .param(ParameterSpec::string("name"))
            .param(ParameterSpec::boolean("ripe").optional())
            .handler(noop)
            .autocomplete("name", suggest);
        def.validate().unwrap();
        assert!(def.parameters()[0].autocomplete);
        assert!(!def.parameters()[1].autocomplete);
        assert!(def.autocomplete_handler("name").is_some());
        assert!(def.autocomplete_handler("ripe").is_none());

        let bad = CommandDefinition::new("fruit")
            .param(ParameterSpec::boolean("ripe"))
            .handler(noop)
            .autocomplete("ripe", suggest)
            .validate();
        assert_eq!(
            bad,
            Err(DefinitionError::InvalidAutocomplete("ripe".to_string()))
        );
    }

    #[test]
    fn test_check_order_and_error_handler() {
        let deny = || Check::new(|_| std::ops::ControlFlow::Break(Reply::ephemeral("no")));
        let def = CommandDefinition::new("ban")
            .check(Check::guild_only("first"))
            .check(deny())
            .check_at(0, Check::guild_only("zeroth"))
            .check_at(99, deny())
            .handler(noop)
            .on_error(noop);
        assert_eq!(def.checks().len(), 4);
        assert!(def.error_handler().is_some());
        assert!(CommandDefinition::new("x").handler(noop).error_handler().is_none());
    }

    #[test]
    fn test_default_autocomplete() {
        let mut def = CommandDefinition::new("search")
            .param(ParameterSpec::string("query"))
            .param(ParameterSpec::string("tag").choices(["a", "b"]).optional())
            .handler(noop)
            .default_autocomplete(suggest);
        def.validate().unwrap();
        assert!(def.parameters()[0].autocomplete);
        assert!(!def.parameters()[1].autocomplete);
        assert!(def.autocomplete_handler("query").is_some());
    }
}
