pub mod commands;
pub mod heartbeat;
pub mod host;
pub mod lifecycle;
pub mod satiety;
pub mod settings;
pub mod spell;

// Re-exports for convenience
pub use commands::{CommandDispatcher, CommandError};
pub use heartbeat::{HeartbeatHook, HeartbeatHooks};
pub use host::{AccessLevel, EnchantmentManager, ModHost, Player, SpellStore};
pub use lifecycle::{EpicureanMod, ModState};
pub use satiety::{SatietyRules, Transition};
pub use settings::{SettingsError, SettingsStore};
pub use spell::{CUSTOM_SPELL_ID, Spell, TEMPLATE_SPELL_ID};
