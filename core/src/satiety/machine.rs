use epicurean_types::formatting::format_seconds;
use epicurean_types::{MessageMode, Settings};

use crate::host::{Player, PropertyBool, PropertyFloat};
use crate::spell::Spell;

/// Whether the player is currently buffed
pub const WELL_FED: PropertyBool = PropertyBool(11000);

/// Seconds of fullness left. Must differ from [`WELL_FED`]: some hosts key
/// properties by number alone.
pub const SATIETY: PropertyFloat = PropertyFloat(11001);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatietyState {
    Hungry,
    Fed,
}

impl SatietyState {
    pub fn of(player: &dyn Player) -> Self {
        if is_well_fed(player) {
            Self::Fed
        } else {
            Self::Hungry
        }
    }
}

/// Result of one heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Hungry with nothing eaten
    Idle,
    /// Still fed after decay
    Digested { remaining: f64 },
    /// Fed → Hungry, buff removed
    Starved,
    /// Hungry → Fed, buff cast
    Fed { satiety: f64 },
}

/// Tunables for the state machine, taken from [`Settings`]
#[derive(Debug, Clone, PartialEq)]
pub struct SatietyRules {
    pub decay_per_tick: f64,
    pub satiety_per_meal: f64,
    pub max_satiety: f64,
    pub tick_messages: MessageMode,
    pub european_numbers: bool,
}

impl From<&Settings> for SatietyRules {
    fn from(settings: &Settings) -> Self {
        Self {
            decay_per_tick: settings.decay_per_tick,
            satiety_per_meal: settings.satiety_per_meal,
            max_satiety: settings.max_satiety,
            tick_messages: settings.tick_messages,
            european_numbers: settings.european_numbers,
        }
    }
}

impl Default for SatietyRules {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Current satiety, 0 if never set
pub fn satiety(player: &dyn Player) -> f64 {
    player.get_float(SATIETY).unwrap_or(0.0)
}

pub fn is_well_fed(player: &dyn Player) -> bool {
    player.get_bool(WELL_FED).unwrap_or(false)
}

/// Advance one heartbeat tick.
pub fn advance(player: &mut dyn Player, spell: &Spell, rules: &SatietyRules) -> Transition {
    if is_well_fed(player) {
        let remaining = (satiety(player) - rules.decay_per_tick.max(0.0)).max(0.0);
        player.set_float(SATIETY, remaining);

        if rules.tick_messages == MessageMode::Always {
            let text = format_seconds(remaining, rules.european_numbers);
            player.send_message(&format!("{text} seconds of food left!"));
        }

        if remaining <= 0.0 {
            clear_buff(player, spell);
            if rules.tick_messages == MessageMode::OnTransition {
                player.send_message("You are no longer well fed.");
            }
            return Transition::Starved;
        }

        return Transition::Digested { remaining };
    }

    let current = satiety(player);
    if current > 0.0 {
        apply_buff(player, spell);
        if rules.tick_messages == MessageMode::OnTransition {
            player.send_message("You feel well fed.");
        }
        return Transition::Fed { satiety: current };
    }

    Transition::Idle
}

/// Add one meal of satiety, kept within `[0, max]`. Returns the new value.
///
/// Does not cast; the next tick moves a hungry player to fed.
pub fn eat(player: &mut dyn Player, rules: &SatietyRules) -> f64 {
    let next = (satiety(player) + rules.satiety_per_meal).clamp(0.0, rules.max_satiety.max(0.0));
    player.set_float(SATIETY, next);
    next
}

/// Enter the fed state: set the flag and cast the buff.
/// Returns whether the host accepted the cast.
pub fn apply_buff(player: &mut dyn Player, spell: &Spell) -> bool {
    player.set_bool(WELL_FED, true);
    let cast = player.try_cast_spell(spell);
    if !cast {
        tracing::debug!(player = player.name(), spell_id = spell.id(), "Buff cast refused");
    }
    cast
}

/// Enter the hungry state: clear the flag and remove the buff if present.
/// Returns whether an enchantment was removed.
pub fn clear_buff(player: &mut dyn Player, spell: &Spell) -> bool {
    player.set_bool(WELL_FED, false);

    let enchantments = player.enchantments();
    let Some(active) = enchantments.get_enchantment(spell.meta_spell_id()).cloned() else {
        tracing::debug!(spell_id = spell.meta_spell_id(), "No active buff to remove");
        return false;
    };
    enchantments.remove(&active)
}
