//! Spell definitions as the host stores them.
//!
//! The host keeps every spell twice: static metadata ([`SpellBase`], the
//! portal spell table) and a runtime record ([`SpellRecord`], the world
//! spell cache). A castable [`Spell`] pairs the two.

mod patcher;

pub use epicurean_types::{CUSTOM_SPELL_NAME, CUSTOM_STAT_MOD_VAL};
pub use patcher::{
    CUSTOM_SPELL_ID, PatchError, TEMPLATE_SPELL_ID, clear_custom_spell, init_custom_spell,
};

/// Duration sentinel for enchantments that never expire. Must be exactly `-1`.
pub const INFINITE_DURATION: f64 = -1.0;

/// Bits of [`SpellBase::bitfield`]
pub mod flags {
    pub const RESISTABLE: u32 = 0x1;
    pub const PK_SENSITIVE: u32 = 0x2;
    pub const BENEFICIAL: u32 = 0x4;
    pub const SELF_TARGETED: u32 = 0x8;
}

/// Static spell metadata (what the client is told about a spell)
#[derive(Debug, Clone, PartialEq)]
pub struct SpellBase {
    /// Name sent to the client on cast
    pub name: String,
    pub description: String,
    pub icon_id: u32,

    /// Refresh/surpass group
    pub category: u32,

    pub bitfield: u32,

    /// Tie-break inside a category
    pub power: u32,

    /// Seconds, or [`INFINITE_DURATION`]
    pub duration: f64,

    /// Identifier shown in the client's enchantment list
    pub meta_spell_id: u32,
}

impl SpellBase {
    pub fn is_beneficial(&self) -> bool {
        self.bitfield & flags::BENEFICIAL != 0
    }

    pub fn is_infinite(&self) -> bool {
        self.duration == INFINITE_DURATION
    }
}

/// Runtime spell record from the world database
#[derive(Debug, Clone, PartialEq)]
pub struct SpellRecord {
    pub id: u32,
    pub name: String,
    pub stat_mod_type: u32,
    pub stat_mod_key: u32,
    /// Magnitude of the stat modification
    pub stat_mod_val: f32,
    pub transfer_bitfield: u32,
}

/// A castable spell: metadata plus runtime record.
#[derive(Debug, Clone, PartialEq)]
pub struct Spell {
    base: SpellBase,
    record: SpellRecord,
}

impl Spell {
    pub fn new(base: SpellBase, record: SpellRecord) -> Self {
        Self { base, record }
    }

    pub fn id(&self) -> u32 {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn category(&self) -> u32 {
        self.base.category
    }

    pub fn power(&self) -> u32 {
        self.base.power
    }

    pub fn duration(&self) -> f64 {
        self.base.duration
    }

    /// Key of the enchantment this spell produces
    pub fn meta_spell_id(&self) -> u32 {
        self.base.meta_spell_id
    }

    pub fn is_beneficial(&self) -> bool {
        self.base.is_beneficial()
    }

    pub fn stat_mod_val(&self) -> f32 {
        self.record.stat_mod_val
    }

    pub fn base(&self) -> &SpellBase {
        &self.base
    }

    pub fn record(&self) -> &SpellRecord {
        &self.record
    }
}
