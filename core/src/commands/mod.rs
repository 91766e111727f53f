//! Chat command dispatch.
//!
//! The host owns a [`CommandDispatcher`]; mods register named handlers with a
//! required access level and flags. Dispatch checks the preconditions before
//! running the handler.

mod culinary;

pub use culinary::{
    BUFF, EAT, UNBUFF, buff, eat, register_culinary_commands, unbuff, unregister_culinary_commands,
};

use hashbrown::HashMap;

use crate::host::{AccessLevel, Player};

/// Preconditions checked at dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandFlags(u8);

impl CommandFlags {
    pub const NONE: Self = Self(0);
    /// Only usable while the game world is open
    pub const REQUIRES_WORLD: Self = Self(0x1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("No such player: {0}")]
    UnknownPlayer(String),

    #[error("{command} requires {required} access (you have {actual})")]
    AccessDenied {
        command: String,
        required: AccessLevel,
        actual: AccessLevel,
    },

    #[error("{0} can only be used while the world is open")]
    WorldNotOpen(String),
}

pub type CommandHandler = Box<dyn Fn(&mut dyn Player, &[String]) -> Result<(), CommandError>>;

/// Who invoked a command, and in what world state
pub struct CommandContext<'a> {
    pub player: &'a mut dyn Player,
    pub world_open: bool,
}

struct RegisteredCommand {
    access: AccessLevel,
    flags: CommandFlags,
    handler: CommandHandler,
}

#[derive(Default)]
pub struct CommandDispatcher {
    commands: HashMap<String, RegisteredCommand>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.commands.keys()).finish()
    }
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Returns false if the name is taken; the existing
    /// handler is kept.
    pub fn register(
        &mut self,
        name: &str,
        access: AccessLevel,
        flags: CommandFlags,
        handler: CommandHandler,
    ) -> bool {
        let name = name.to_lowercase();
        if self.commands.contains_key(&name) {
            tracing::warn!(command = %name, "Command already registered");
            return false;
        }
        self.commands.insert(
            name,
            RegisteredCommand {
                access,
                flags,
                handler,
            },
        );
        true
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.commands.remove(&name.to_lowercase()).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn dispatch(
        &self,
        name: &str,
        ctx: CommandContext<'_>,
        args: &[String],
    ) -> Result<(), CommandError> {
        let key = name.to_lowercase();
        let Some(command) = self.commands.get(&key) else {
            return Err(CommandError::Unknown(key));
        };

        let actual = ctx.player.access_level();
        if actual < command.access {
            return Err(CommandError::AccessDenied {
                command: key,
                required: command.access,
                actual,
            });
        }

        if command.flags.contains(CommandFlags::REQUIRES_WORLD) && !ctx.world_open {
            return Err(CommandError::WorldNotOpen(key));
        }

        tracing::debug!(command = %key, player = ctx.player.name(), "Dispatching command");
        (command.handler)(ctx.player, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PropertyBool;
    use crate::host::memory::MemoryPlayer;

    const TOUCHED: PropertyBool = PropertyBool(7);

    fn touch_handler() -> CommandHandler {
        Box::new(|player: &mut dyn Player, _args: &[String]| {
            player.set_bool(TOUCHED, true);
            Ok(())
        })
    }

    fn dispatcher() -> CommandDispatcher {
        let mut d = CommandDispatcher::new();
        d.register(
            "touch",
            AccessLevel::Developer,
            CommandFlags::REQUIRES_WORLD,
            touch_handler(),
        );
        d
    }

    #[test]
    fn test_dispatch_runs_handler() {
        let d = dispatcher();
        let mut player = MemoryPlayer::new("Dev", AccessLevel::Developer);

        let ctx = CommandContext {
            player: &mut player,
            world_open: true,
        };
        d.dispatch("TOUCH", ctx, &[]).unwrap();

        assert_eq!(player.get_bool(TOUCHED), Some(true));
    }

    #[test]
    fn test_access_level_enforced() {
        let d = dispatcher();
        let mut player = MemoryPlayer::new("Pleb", AccessLevel::Envoy);

        let ctx = CommandContext {
            player: &mut player,
            world_open: true,
        };
        let err = d.dispatch("touch", ctx, &[]).unwrap_err();

        assert!(matches!(
            err,
            CommandError::AccessDenied {
                required: AccessLevel::Developer,
                actual: AccessLevel::Envoy,
                ..
            }
        ));
        assert_eq!(player.get_bool(TOUCHED), None);
    }

    #[test]
    fn test_higher_access_allowed() {
        let d = dispatcher();
        let mut player = MemoryPlayer::new("Boss", AccessLevel::Admin);

        let ctx = CommandContext {
            player: &mut player,
            world_open: true,
        };
        assert!(d.dispatch("touch", ctx, &[]).is_ok());
    }

    #[test]
    fn test_requires_world() {
        let d = dispatcher();
        let mut player = MemoryPlayer::new("Dev", AccessLevel::Developer);

        let ctx = CommandContext {
            player: &mut player,
            world_open: false,
        };
        let err = d.dispatch("touch", ctx, &[]).unwrap_err();

        assert!(matches!(err, CommandError::WorldNotOpen(_)));
    }

    #[test]
    fn test_unknown_and_duplicate() {
        let mut d = dispatcher();
        assert!(!d.register("touch", AccessLevel::Player, CommandFlags::NONE, touch_handler()));
        assert_eq!(d.len(), 1);

        let mut player = MemoryPlayer::new("Dev", AccessLevel::Admin);
        let ctx = CommandContext {
            player: &mut player,
            world_open: true,
        };
        let err = d.dispatch("nope", ctx, &[]).unwrap_err();
        assert!(matches!(err, CommandError::Unknown(name) if name == "nope"));

        assert!(d.unregister("touch"));
        assert!(d.is_empty());
    }
}
