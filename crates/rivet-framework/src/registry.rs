//! The frozen definition registry.
//!
//! All definitions are collected in a [`RegistryBuilder`] at startup,
//! validated, indexed and frozen into an `Arc<Registry>`. After that the
//! registry is read-only and shared by every request without locking.
//!
//! # Lookup Rules
//!
//! - Commands are keyed by (kind, name, subcommand path). Each key may have
//!   one global definition and any number of guild-scoped ones; a
//!   definition registered for the invoking guild wins over the global one.
//! - Components are matched by the longest registered prefix that is
//!   followed by `:` (or ends the identifier).

use std::collections::HashMap;
use std::sync::Arc;

use rivet_core::{CommandType, Snowflake};
use tracing::{debug, info};

use crate::command::CommandDefinition;
use crate::component::ComponentDefinition;
use crate::error::{RegistryError, RegistryResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CommandKey {
    kind: CommandType,
    name: String,
    path: Vec<String>,
}

impl CommandKey {
    fn of(def: &CommandDefinition) -> Self {
        Self {
            kind: def.kind(),
            name: def.name().to_string(),
            path: def.path().to_vec(),
        }
    }
}

#[derive(Debug, Default)]
struct ScopedCommands {
    global: Option<Arc<CommandDefinition>>,
    guilds: HashMap<Snowflake, Arc<CommandDefinition>>,
}

// =============================================================================
// RegistryBuilder
// =============================================================================

/// Collects definitions before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: Vec<CommandDefinition>,
    components: Vec<ComponentDefinition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, definition: CommandDefinition) -> Self {
        self.commands.push(definition);
        self
    }

    pub fn component(mut self, definition: ComponentDefinition) -> Self {
        self.components.push(definition);
        self
    }

    pub fn add_command(&mut self, definition: CommandDefinition) -> &mut Self {
        self.commands.push(definition);
        self
    }

    pub fn add_component(&mut self, definition: ComponentDefinition) -> &mut Self {
        self.components.push(definition);
        self
    }

    /// Validates and indexes every definition.
    pub fn build(self) -> RegistryResult<Arc<Registry>> {
        let mut commands: HashMap<CommandKey, ScopedCommands> = HashMap::new();
        let command_count = self.commands.len();

        for mut def in self.commands {
            def.validate()?;
            let key = CommandKey::of(&def);
            let def = Arc::new(def);
            let slot = commands.entry(key).or_default();

            if def.guild_ids().is_empty() {
                if slot.global.is_some() {
                    return Err(duplicate(&def, "global scope"));
                }
                slot.global = Some(def);
            } else {
                for guild in def.guild_ids() {
                    if slot.guilds.insert(*guild, def.clone()).is_some() {
                        return Err(duplicate(&def, &format!("guild {guild}")));
                    }
                }
            }
        }
        check_path_conflicts(&commands)?;

        let mut components = self.components;
        for (i, def) in components.iter().enumerate() {
            def.validate()?;
            if components[..i].iter().any(|c| c.prefix() == def.prefix()) {
                return Err(RegistryError::DuplicateComponent(def.prefix().to_string()));
            }
        }
        components.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));

        info!(
            commands = command_count,
            components = components.len(),
            "Registry built"
        );
        Ok(Arc::new(Registry {
            commands,
            components,
        }))
    }
}

fn duplicate(def: &CommandDefinition, scope: &str) -> RegistryError {
    RegistryError::DuplicateCommand {
        name: def.qualified_name(),
        scope: scope.to_string(),
    }
}

/// A command with subcommands cannot also be invoked bare, and a subcommand
/// name cannot double as a group name, within any single scope.
fn check_path_conflicts(commands: &HashMap<CommandKey, ScopedCommands>) -> RegistryResult<()> {
    for (key, slot) in commands {
        for (other, other_slot) in commands {
            let is_strict_prefix = key.kind == other.kind
                && key.name == other.name
                && key.path.len() < other.path.len()
                && other.path.starts_with(&key.path);
            if !is_strict_prefix {
                continue;
            }

            let conflict = if slot.global.is_some() && other_slot.global.is_some() {
                Some("global scope".to_string())
            } else {
                slot.guilds
                    .keys()
                    .find(|g| other_slot.guilds.contains_key(g))
                    .map(|g| format!("guild {g}"))
            };
            if let Some(scope) = conflict {
                return Err(RegistryError::PathConflict {
                    name: key.name.clone(),
                    scope,
                });
            }
        }
    }
    Ok(())
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable, shared index of every definition.
#[derive(Debug)]
pub struct Registry {
    commands: HashMap<CommandKey, ScopedCommands>,
    /// Sorted by prefix length, longest first.
    components: Vec<ComponentDefinition>,
}

impl Registry {
    /// An empty registry.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            commands: HashMap::new(),
            components: Vec::new(),
        })
    }

    /// Finds the command for an invocation.
    ///
    /// A definition scoped to `guild` takes precedence over a global one.
    pub fn find_command(
        &self,
        kind: CommandType,
        name: &str,
        path: &[&str],
        guild: Option<Snowflake>,
    ) -> Option<&CommandDefinition> {
        let key = CommandKey {
            kind,
            name: name.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
        };
        let slot = self.commands.get(&key)?;
        let found = guild
            .and_then(|g| slot.guilds.get(&g))
            .or(slot.global.as_ref())
            .map(Arc::as_ref);
        debug!(
            command = name,
            ?path,
            found = found.is_some(),
            "Command lookup"
        );
        found
    }

    /// Finds the component whose prefix owns `custom_id`.
    pub fn find_component(&self, custom_id: &str) -> Option<&ComponentDefinition> {
        self.components.iter().find(|def| {
            custom_id
                .strip_prefix(def.prefix())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
    }

    /// Iterates over every distinct command definition.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDefinition> {
        let mut seen: Vec<*const CommandDefinition> = Vec::new();
        self.commands
            .values()
            .flat_map(|slot| slot.global.iter().chain(slot.guilds.values()))
            .filter(move |def| {
                let ptr = Arc::as_ptr(def);
                if seen.contains(&ptr) {
                    false
                } else {
                    seen.push(ptr);
                    true
                }
            })
            .map(Arc::as_ref)
    }

    pub fn components(&self) -> &[ComponentDefinition] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::ParameterSpec;

    async fn global() -> &'static str {
        "global"
    }

    async fn local() -> &'static str {
        "local"
    }

    fn guild(id: u64) -> Option<Snowflake> {
        Some(Snowflake::new(id))
    }

    #[test]
    fn test_guild_precedence() {
        let registry = RegistryBuilder::new()
            .command(CommandDefinition::new("ping").description("global").handler(global))
            .command(
                CommandDefinition::new("ping")
                    .description("local")
                    .guild(1u64)
                    .guild(2u64)
                    .handler(local),
            )
            .build()
            .unwrap();

        let find = |g| {
            registry
                .find_command(CommandType::ChatInput, "ping", &[], g)
                .map(|d| d.description_text().to_string())
        };
        assert_eq!(find(guild(1)).as_deref(), Some("local"));
        assert_eq!(find(guild(2)).as_deref(), Some("local"));
        assert_eq!(find(guild(3)).as_deref(), Some("global"));
        assert_eq!(find(None).as_deref(), Some("global"));
        assert_eq!(registry.commands().count(), 2);
    }

    #[test]
    fn test_guild_only_command_hidden_elsewhere() {
        let registry = RegistryBuilder::new()
            .command(CommandDefinition::new("secret").guild(1u64).handler(local))
            .build()
            .unwrap();
        assert!(
            registry
                .find_command(CommandType::ChatInput, "secret", &[], guild(2))
                .is_none()
        );
        assert!(
            registry
                .find_command(CommandType::ChatInput, "secret", &[], None)
                .is_none()
        );
    }

    #[test]
    fn test_subcommand_paths() {
        let registry = RegistryBuilder::new()
            .command(CommandDefinition::new("admin").subcommand(["ban"]).handler(global))
            .command(
                CommandDefinition::new("admin")
                    .subcommand(["role", "add"])
                    .param(ParameterSpec::role("role"))
                    .handler(global),
            )
            .build()
            .unwrap();
        assert!(
            registry
                .find_command(CommandType::ChatInput, "admin", &["role", "add"], None)
                .is_some()
        );
        assert!(
            registry
                .find_command(CommandType::ChatInput, "admin", &["role"], None)
                .is_none()
        );
        assert!(
            registry
                .find_command(CommandType::ChatInput, "admin", &[], None)
                .is_none()
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = RegistryBuilder::new()
            .command(CommandDefinition::new("a").handler(global))
            .command(CommandDefinition::new("a").handler(global))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand { .. }));

        let err = RegistryBuilder::new()
            .command(CommandDefinition::new("a").guild(1u64).handler(global))
            .command(CommandDefinition::new("a").guild(1u64).handler(global))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCommand { ref scope, .. } if scope == "guild 1"));

        let err = RegistryBuilder::new()
            .component(ComponentDefinition::new::<()>("x").handler(global))
            .component(ComponentDefinition::new::<()>("x").handler(global))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateComponent("x".to_string()));
    }

    #[test]
    fn test_same_name_different_kind_allowed() {
        let registry = RegistryBuilder::new()
            .command(CommandDefinition::new("info").handler(global))
            .command(CommandDefinition::user_menu("info").handler(global))
            .build();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_path_conflict() {
        let err = RegistryBuilder::new()
            .command(CommandDefinition::new("admin").handler(global))
            .command(CommandDefinition::new("admin").subcommand(["ban"]).handler(global))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::PathConflict { .. }));

        // Different scopes do not conflict.
        assert!(
            RegistryBuilder::new()
                .command(CommandDefinition::new("admin").handler(global))
                .command(
                    CommandDefinition::new("admin")
                        .subcommand(["ban"])
                        .guild(1u64)
                        .handler(global)
                )
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_longest_component_prefix() {
        let registry = RegistryBuilder::new()
            .component(ComponentDefinition::new::<()>("ctr").handler(global))
            .component(ComponentDefinition::new::<()>("ctr-big").handler(local))
            .build()
            .unwrap();
        assert_eq!(registry.find_component("ctr-big:AQ").unwrap().prefix(), "ctr-big");
        assert_eq!(registry.find_component("ctr:AQ").unwrap().prefix(), "ctr");
        assert_eq!(registry.find_component("ctr").unwrap().prefix(), "ctr");
        assert!(registry.find_component("ctrl:AQ").is_none());
        assert!(registry.find_component("other").is_none());
    }

    #[test]
    fn test_invalid_definition_surfaces() {
        let err = RegistryBuilder::new()
            .command(CommandDefinition::new("BAD").handler(global))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::Definition(_)));
    }
}
