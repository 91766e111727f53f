//! In-memory host.
//!
//! A minimal server that implements the host traits with plain maps. Used by
//! the tests and by the interactive simulator.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use hashbrown::HashMap;

use super::{
    AccessLevel, Enchantment, EnchantmentManager, ModHost, Player, PropertyBool, PropertyFloat,
    SpellStore,
};
use crate::commands::{CommandContext, CommandDispatcher, CommandError};
use crate::heartbeat::HeartbeatHooks;
use crate::spell::{Spell, SpellBase, SpellRecord};

// ─── Spell tables ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MemoryStore<V> {
    entries: HashMap<u32, V>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }
}

impl<V> SpellStore<V> for MemoryStore<V> {
    fn get(&self, id: u32) -> Option<&V> {
        self.entries.get(&id)
    }

    fn try_add(&mut self, id: u32, value: V) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, value);
        true
    }

    fn try_remove(&mut self, id: u32) -> Option<V> {
        self.entries.remove(&id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ─── Enchantments ───────────────────────────────────────────────────────────

/// Why a cast did or did not land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Added,
    /// Replaced an enchantment of the same spell or a weaker one in its category
    Surpassed,
    /// A stronger enchantment in the same category is active
    Refused,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEnchantments {
    active: Vec<Enchantment>,
    removals: usize,
}

impl MemoryEnchantments {
    /// Apply refresh/surpass rules: same spell or same category with
    /// equal-or-higher power replaces, lower power is refused.
    pub fn add(&mut self, enchantment: Enchantment) -> CastOutcome {
        let existing = self
            .active
            .iter()
            .position(|e| e.spell_id == enchantment.spell_id)
            .or_else(|| {
                self.active
                    .iter()
                    .position(|e| e.category == enchantment.category)
            });

        match existing {
            Some(idx) if self.active[idx].power > enchantment.power => CastOutcome::Refused,
            Some(idx) => {
                self.active[idx] = enchantment;
                CastOutcome::Surpassed
            }
            None => {
                self.active.push(enchantment);
                CastOutcome::Added
            }
        }
    }

    /// Drop finite enchantments that have run out. Returns how many expired.
    pub fn expire(&mut self, now: NaiveDateTime) -> usize {
        let before = self.active.len();
        self.active.retain(|e| !e.is_expired(now));
        before - self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enchantment> {
        self.active.iter()
    }

    /// Count of single removals (not dispels)
    pub fn removals(&self) -> usize {
        self.removals
    }
}

impl EnchantmentManager for MemoryEnchantments {
    fn dispel_all(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }

    fn get_enchantment(&self, spell_id: u32) -> Option<&Enchantment> {
        self.active.iter().find(|e| e.spell_id == spell_id)
    }

    fn remove(&mut self, enchantment: &Enchantment) -> bool {
        let Some(idx) = self.active.iter().position(|e| e == enchantment) else {
            return false;
        };
        self.active.remove(idx);
        self.removals += 1;
        true
    }

    fn len(&self) -> usize {
        self.active.len()
    }
}

// ─── Players ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MemoryPlayer {
    name: String,
    access_level: AccessLevel,
    bools: HashMap<PropertyBool, bool>,
    floats: HashMap<PropertyFloat, f64>,
    enchantments: MemoryEnchantments,
    messages: Vec<String>,
    /// Spell ids of every accepted cast
    casts: Vec<u32>,
    /// Time of the last heartbeat, used to stamp enchantments
    clock: NaiveDateTime,
}

impl MemoryPlayer {
    pub fn new(name: &str, access_level: AccessLevel) -> Self {
        Self {
            name: name.to_string(),
            access_level,
            bools: HashMap::new(),
            floats: HashMap::new(),
            enchantments: MemoryEnchantments::default(),
            messages: Vec::new(),
            casts: Vec::new(),
            clock: chrono::Local::now().naive_local(),
        }
    }

    /// The host's own per-player update: advance the clock and expire
    /// finite enchantments.
    pub fn heartbeat(&mut self, now: NaiveDateTime) {
        self.clock = now;
        let expired = self.enchantments.expire(now);
        if expired > 0 {
            tracing::debug!(player = %self.name, expired, "Enchantments expired");
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn casts(&self) -> &[u32] {
        &self.casts
    }

    pub fn active_enchantments(&self) -> &MemoryEnchantments {
        &self.enchantments
    }
}

impl Player for MemoryPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    fn get_bool(&self, key: PropertyBool) -> Option<bool> {
        self.bools.get(&key).copied()
    }

    fn set_bool(&mut self, key: PropertyBool, value: bool) {
        self.bools.insert(key, value);
    }

    fn get_float(&self, key: PropertyFloat) -> Option<f64> {
        self.floats.get(&key).copied()
    }

    fn set_float(&mut self, key: PropertyFloat, value: f64) {
        self.floats.insert(key, value);
    }

    fn enchantments(&mut self) -> &mut dyn EnchantmentManager {
        &mut self.enchantments
    }

    fn send_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn try_cast_spell(&mut self, spell: &Spell) -> bool {
        let enchantment = Enchantment {
            spell_id: spell.meta_spell_id(),
            category: spell.category(),
            power: spell.power(),
            duration: spell.duration(),
            caster: self.name.clone(),
            start_time: self.clock,
        };

        match self.enchantments.add(enchantment) {
            CastOutcome::Refused => {
                tracing::debug!(player = %self.name, spell_id = spell.id(), "Cast surpassed by stronger enchantment");
                self.messages
                    .push(format!("A more powerful spell than {} is already active.", spell.name()));
                false
            }
            _ => {
                self.casts.push(spell.id());
                self.messages.push(format!("You cast {} on yourself.", spell.name()));
                true
            }
        }
    }
}

// ─── Host ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryHost {
    pub spell_cache: MemoryStore<SpellRecord>,
    pub spell_table: MemoryStore<SpellBase>,
    pub hooks: HeartbeatHooks,
    pub commands: CommandDispatcher,
    players: HashMap<String, MemoryPlayer>,
    world_open: bool,
    disabled_mods: Vec<PathBuf>,
}

impl MemoryHost {
    /// An empty host with the world open
    pub fn new() -> Self {
        Self {
            world_open: true,
            ..Default::default()
        }
    }

    /// Publish a spell into both tables
    pub fn seed_spell(&mut self, spell: Spell) {
        let id = spell.id();
        self.spell_cache.try_add(id, spell.record().clone());
        self.spell_table.try_add(id, spell.base().clone());
    }

    pub fn add_player(&mut self, player: MemoryPlayer) {
        self.players.insert(player.name().to_string(), player);
    }

    pub fn player(&self, name: &str) -> Option<&MemoryPlayer> {
        self.players.get(name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut MemoryPlayer> {
        self.players.get_mut(name)
    }

    pub fn players(&self) -> impl Iterator<Item = &MemoryPlayer> {
        self.players.values()
    }

    pub fn set_world_open(&mut self, open: bool) {
        self.world_open = open;
    }

    pub fn world_open(&self) -> bool {
        self.world_open
    }

    pub fn disabled_mods(&self) -> &[PathBuf] {
        &self.disabled_mods
    }

    /// One server tick: every player's own heartbeat, then the hooks.
    pub fn tick(&mut self, now: NaiveDateTime) {
        for player in self.players.values_mut() {
            player.heartbeat(now);
            self.hooks.run(player, now);
        }
    }

    /// Run a chat line (`"eat"`, `"buff extra args"`) as `player_name`.
    pub fn run_command(&mut self, player_name: &str, line: &str) -> Result<(), CommandError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let name = parts.next().unwrap_or_default();
        let args: Vec<String> = parts.collect();

        let Some(player) = self.players.get_mut(player_name) else {
            return Err(CommandError::UnknownPlayer(player_name.to_string()));
        };

        let ctx = CommandContext {
            player,
            world_open: self.world_open,
        };
        self.commands.dispatch(&name, ctx, &args)
    }
}

impl ModHost for MemoryHost {
    fn spell_cache(&mut self) -> &mut dyn SpellStore<SpellRecord> {
        &mut self.spell_cache
    }

    fn spell_table(&mut self) -> &mut dyn SpellStore<SpellBase> {
        &mut self.spell_table
    }

    fn heartbeat_hooks(&mut self) -> &mut HeartbeatHooks {
        &mut self.hooks
    }

    fn commands(&mut self) -> &mut CommandDispatcher {
        &mut self.commands
    }

    fn disable_mod(&mut self, mod_path: &Path) {
        tracing::warn!(path = %mod_path.display(), "Disabling mod");
        self.disabled_mods.push(mod_path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn enchantment(spell_id: u32, category: u32, power: u32, duration: f64) -> Enchantment {
        Enchantment {
            spell_id,
            category,
            power,
            duration,
            caster: "Tester".to_string(),
            start_time: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_store_is_add_if_absent() {
        let mut store = MemoryStore::new();
        assert!(store.try_add(1, "first"));
        assert!(!store.try_add(1, "second"));
        assert_eq!(store.get(1), Some(&"first"));
        assert_eq!(store.try_remove(1), Some("first"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_surpass_rules() {
        let mut e = MemoryEnchantments::default();
        assert_eq!(e.add(enchantment(1, 10, 5, 60.0)), CastOutcome::Added);
        // Different category stacks
        assert_eq!(e.add(enchantment(2, 11, 1, 60.0)), CastOutcome::Added);
        // Weaker in same category is refused
        assert_eq!(e.add(enchantment(3, 10, 4, 60.0)), CastOutcome::Refused);
        // Stronger in same category replaces
        assert_eq!(e.add(enchantment(4, 10, 6, 60.0)), CastOutcome::Surpassed);

        assert_eq!(e.len(), 2);
        assert!(e.get_enchantment(1).is_none());
        assert!(e.get_enchantment(4).is_some());
    }

    #[test]
    fn test_same_spell_matched_before_category() {
        let mut e = MemoryEnchantments::default();
        e.add(enchantment(5, 20, 1, 60.0));
        e.add(enchantment(1, 10, 1, 60.0));

        // Spell 1 moves into category 20: its own entry is the one replaced
        assert_eq!(e.add(enchantment(1, 20, 2, 60.0)), CastOutcome::Surpassed);

        assert_eq!(e.len(), 2);
        assert_eq!(e.get_enchantment(1).map(|x| x.category), Some(20));
        assert!(e.get_enchantment(5).is_some());
    }

    #[test]
    fn test_infinite_enchantments_never_expire() {
        let mut e = MemoryEnchantments::default();
        let finite = enchantment(1, 10, 1, 30.0);
        let start = finite.start_time;
        e.add(finite);
        e.add(enchantment(27, 11, 1, crate::spell::INFINITE_DURATION));

        assert_eq!(e.expire(start + Duration::seconds(29)), 0);
        assert_eq!(e.expire(start + Duration::days(365)), 1);
        assert!(e.get_enchantment(27).is_some());
    }

    #[test]
    fn test_remove_counts_only_active() {
        let mut e = MemoryEnchantments::default();
        let ench = enchantment(1, 10, 1, 30.0);
        e.add(ench.clone());

        assert!(e.remove(&ench));
        assert!(!e.remove(&ench));
        assert_eq!(e.removals(), 1);
    }

    #[test]
    fn test_property_kinds_do_not_alias() {
        let mut player = MemoryPlayer::new("Tester", AccessLevel::Player);
        player.set_bool(PropertyBool(11000), true);
        player.set_float(PropertyFloat(11000), 3.0);

        assert_eq!(player.get_bool(PropertyBool(11000)), Some(true));
        assert_eq!(player.get_float(PropertyFloat(11000)), Some(3.0));
        assert_eq!(player.get_bool(PropertyBool(11001)), None);
    }

    #[test]
    fn test_run_command_unknown_player() {
        let mut host = MemoryHost::new();
        let err = host.run_command("Nobody", "eat").unwrap_err();
        assert!(matches!(err, CommandError::UnknownPlayer(_)));
    }
}
