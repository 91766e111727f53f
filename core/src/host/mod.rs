//! Interfaces the game server exposes to mods.
//!
//! Everything the mod touches is owned by the host: both spell tables, the
//! player's property bag and enchantments, the heartbeat loop and the chat
//! command dispatcher. The mod only sees these traits, so any server (or the
//! in-memory [`memory::MemoryHost`]) can run it.

pub mod memory;

use std::path::Path;

use chrono::NaiveDateTime;

use crate::commands::CommandDispatcher;
use crate::heartbeat::HeartbeatHooks;
use crate::spell::{Spell, SpellBase, SpellRecord};

// ═══════════════════════════════════════════════════════════════════════════
// Spell tables
// ═══════════════════════════════════════════════════════════════════════════

/// A host-owned spell table keyed by numeric spell id.
///
/// Inserts are add-if-absent: an existing entry is never overwritten.
pub trait SpellStore<V> {
    fn get(&self, id: u32) -> Option<&V>;

    fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Insert unless `id` is taken. Returns whether the value was stored.
    fn try_add(&mut self, id: u32, value: V) -> bool;

    fn try_remove(&mut self, id: u32) -> Option<V>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Players
// ═══════════════════════════════════════════════════════════════════════════

/// Command privilege, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AccessLevel {
    #[default]
    Player,
    Advocate,
    Sentinel,
    Envoy,
    Developer,
    Admin,
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Player => "Player",
            Self::Advocate => "Advocate",
            Self::Sentinel => "Sentinel",
            Self::Envoy => "Envoy",
            Self::Developer => "Developer",
            Self::Admin => "Admin",
        };
        f.write_str(name)
    }
}

/// Key of a boolean player property.
///
/// Bool and float keys are distinct types, so equal numbers never alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyBool(pub u16);

/// Key of a floating point player property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyFloat(pub u16);

/// A runtime effect applied to a player by a cast
#[derive(Debug, Clone, PartialEq)]
pub struct Enchantment {
    /// Meta id of the spell that produced it
    pub spell_id: u32,
    pub category: u32,
    pub power: u32,
    /// Seconds, or [`crate::spell::INFINITE_DURATION`]
    pub duration: f64,
    pub caster: String,
    pub start_time: NaiveDateTime,
}

impl Enchantment {
    /// Whether the enchantment has run out at `now`
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        if self.duration < 0.0 {
            return false;
        }
        let elapsed = now.signed_duration_since(self.start_time);
        elapsed.num_milliseconds() as f64 / 1000.0 >= self.duration
    }
}

pub trait EnchantmentManager {
    /// Remove every active enchantment. Returns how many were removed.
    fn dispel_all(&mut self) -> usize;

    /// Active enchantment produced by the spell with this meta id
    fn get_enchantment(&self, spell_id: u32) -> Option<&Enchantment>;

    /// Returns false if the enchantment was not active
    fn remove(&mut self, enchantment: &Enchantment) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait Player {
    fn name(&self) -> &str;

    fn access_level(&self) -> AccessLevel;

    fn get_bool(&self, key: PropertyBool) -> Option<bool>;

    fn set_bool(&mut self, key: PropertyBool, value: bool);

    fn get_float(&self, key: PropertyFloat) -> Option<f64>;

    fn set_float(&mut self, key: PropertyFloat, value: f64);

    fn enchantments(&mut self) -> &mut dyn EnchantmentManager;

    /// Send a system chat message to this player
    fn send_message(&mut self, message: &str);

    /// Cast `spell` on this player as both caster and target.
    /// Returns false if the host refused the cast.
    fn try_cast_spell(&mut self, spell: &Spell) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════
// Host
// ═══════════════════════════════════════════════════════════════════════════

/// The server as seen by a mod during start/shutdown.
pub trait ModHost {
    /// Runtime spell records (world database cache)
    fn spell_cache(&mut self) -> &mut dyn SpellStore<SpellRecord>;

    /// Static spell metadata (portal spell table)
    fn spell_table(&mut self) -> &mut dyn SpellStore<SpellBase>;

    /// Callbacks run after each player's own heartbeat
    fn heartbeat_hooks(&mut self) -> &mut HeartbeatHooks;

    fn commands(&mut self) -> &mut CommandDispatcher;

    /// Ask the host to stop loading the mod at `mod_path`
    fn disable_mod(&mut self, mod_path: &Path);
}
