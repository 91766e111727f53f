//! Developer commands for testing the satiety buff.
//!
//! `buff` and `unbuff` go through the same transitions as the heartbeat so
//! the well-fed flag always agrees with the player's enchantments.

use epicurean_types::formatting::format_seconds;

use super::{CommandDispatcher, CommandFlags};
use crate::host::{AccessLevel, Player};
use crate::satiety::{self, SatietyRules};
use crate::spell::Spell;

pub const BUFF: &str = "buff";
pub const UNBUFF: &str = "unbuff";
pub const EAT: &str = "eat";

const COMMANDS: [&str; 3] = [BUFF, UNBUFF, EAT];

/// Dispel everything, then enter the fed state regardless of satiety.
pub fn buff(player: &mut dyn Player, spell: &Spell) {
    player.enchantments().dispel_all();

    player.send_message(&format!(
        "Casting buff(s):\nID={} Cat={} Power={} Beneficial={}",
        spell.id(),
        spell.category(),
        spell.power(),
        spell.is_beneficial()
    ));

    satiety::apply_buff(player, spell);
}

/// Dispel everything and drop the well-fed flag. Satiety is kept, so a
/// player with food left is re-buffed on the next tick.
pub fn unbuff(player: &mut dyn Player) {
    let dispelled = player.enchantments().dispel_all();
    player.set_bool(satiety::WELL_FED, false);
    tracing::debug!(player = player.name(), dispelled, "Dispelled all enchantments");
}

/// Add one meal and report the new satiety.
pub fn eat(player: &mut dyn Player, rules: &SatietyRules) -> f64 {
    let next = satiety::eat(player, rules);
    let text = format_seconds(next, rules.european_numbers);
    player.send_message(&format!("You have {text} seconds of fullness"));
    next
}

/// Register `buff`, `unbuff` and `eat`. All or nothing: if any name is
/// taken, nothing is registered and false is returned.
pub fn register_culinary_commands(
    dispatcher: &mut CommandDispatcher,
    spell: &Spell,
    rules: &SatietyRules,
) -> bool {
    if let Some(taken) = COMMANDS.into_iter().find(|name| dispatcher.contains(name)) {
        tracing::warn!(command = taken, "Culinary command name already taken");
        return false;
    }

    let access = AccessLevel::Developer;
    let flags = CommandFlags::REQUIRES_WORLD;

    let buff_spell = spell.clone();
    dispatcher.register(
        BUFF,
        access,
        flags,
        Box::new(move |player: &mut dyn Player, _args: &[String]| {
            buff(player, &buff_spell);
            Ok(())
        }),
    );

    dispatcher.register(
        UNBUFF,
        access,
        flags,
        Box::new(|player: &mut dyn Player, _args: &[String]| {
            unbuff(player);
            Ok(())
        }),
    );

    let eat_rules = rules.clone();
    dispatcher.register(
        EAT,
        access,
        flags,
        Box::new(move |player: &mut dyn Player, _args: &[String]| {
            eat(player, &eat_rules);
            Ok(())
        }),
    );

    true
}

pub fn unregister_culinary_commands(dispatcher: &mut CommandDispatcher) -> usize {
    COMMANDS
        .into_iter()
        .filter(|name| dispatcher.unregister(name))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryPlayer;
    use crate::host::EnchantmentManager;
    use crate::satiety::{SATIETY, WELL_FED, is_well_fed};
    use crate::spell::{INFINITE_DURATION, SpellBase, SpellRecord, flags};

    fn custom_spell() -> Spell {
        Spell::new(
            SpellBase {
                name: "Epicurean's Ecstasy".to_string(),
                description: String::new(),
                icon_id: 0,
                category: 601,
                bitfield: flags::BENEFICIAL,
                power: 11,
                duration: INFINITE_DURATION,
                meta_spell_id: 27,
            },
            SpellRecord {
                id: 27,
                name: "Epicurean's Ecstasy".to_string(),
                stat_mod_type: 0,
                stat_mod_key: 0,
                stat_mod_val: 1000.0,
                transfer_bitfield: 0,
            },
        )
    }

    fn developer() -> MemoryPlayer {
        MemoryPlayer::new("Dev", AccessLevel::Developer)
    }

    #[test]
    fn test_eat_clamps_to_ceiling() {
        let mut player = developer();
        player.set_float(SATIETY, 18.0);

        let next = eat(&mut player, &SatietyRules::default());

        assert_eq!(next, 20.0);
        assert_eq!(player.get_float(SATIETY), Some(20.0));
        assert_eq!(player.last_message(), Some("You have 20.0 seconds of fullness"));
    }

    #[test]
    fn test_eat_does_not_feed_immediately() {
        let mut player = developer();

        eat(&mut player, &SatietyRules::default());

        assert_eq!(player.get_float(SATIETY), Some(7.0));
        assert!(!is_well_fed(&player));
        assert!(player.casts().is_empty());
    }

    #[test]
    fn test_buff_dispels_then_casts_and_sets_flag() {
        let mut player = developer();
        let spell = custom_spell();

        buff(&mut player, &spell);

        assert!(is_well_fed(&player));
        assert_eq!(player.casts(), &[27]);
        assert_eq!(player.active_enchantments().len(), 1);
        assert_eq!(
            player.messages()[0],
            "Casting buff(s):\nID=27 Cat=601 Power=11 Beneficial=true"
        );
    }

    #[test]
    fn test_unbuff_clears_flag_and_enchantments() {
        let mut player = developer();
        let spell = custom_spell();
        buff(&mut player, &spell);
        player.set_float(SATIETY, 5.0);

        unbuff(&mut player);

        assert_eq!(player.get_bool(WELL_FED), Some(false));
        assert!(player.active_enchantments().is_empty());
        // Food is not taken away
        assert_eq!(player.get_float(SATIETY), Some(5.0));
    }

    #[test]
    fn test_register_and_unregister() {
        let mut dispatcher = CommandDispatcher::new();
        let spell = custom_spell();
        let rules = SatietyRules::default();

        assert!(register_culinary_commands(&mut dispatcher, &spell, &rules));
        assert!(!register_culinary_commands(&mut dispatcher, &spell, &rules));
        assert_eq!(dispatcher.len(), 3);
        assert!(dispatcher.contains(EAT));

        assert_eq!(unregister_culinary_commands(&mut dispatcher), 3);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_register_is_all_or_nothing() {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(
            EAT,
            AccessLevel::Player,
            CommandFlags::NONE,
            Box::new(|_player: &mut dyn Player, _args: &[String]| Ok(())),
        );

        let registered =
            register_culinary_commands(&mut dispatcher, &custom_spell(), &SatietyRules::default());

        assert!(!registered);
        assert_eq!(dispatcher.len(), 1);
        assert!(!dispatcher.contains(BUFF));
    }
}
