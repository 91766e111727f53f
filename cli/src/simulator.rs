//! A single-player server around the in-memory host.

use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use epicurean_core::host::memory::{MemoryHost, MemoryPlayer};
use epicurean_core::spell::{SpellBase, SpellRecord, flags};
use epicurean_core::{AccessLevel, EpicureanMod, ModState, Spell, TEMPLATE_SPELL_ID};

/// Server heartbeat period
pub const TICK_INTERVAL_SECS: i64 = 5;

/// The stock food buff the custom spell is cloned from
pub fn template_spell() -> Spell {
    Spell::new(
        SpellBase {
            name: "Hearty Meal".to_string(),
            description: "Food makes you feel good.".to_string(),
            icon_id: 0x0600_1F4E,
            category: 600,
            bitfield: flags::BENEFICIAL | flags::SELF_TARGETED,
            power: 10,
            duration: 1800.0,
            meta_spell_id: TEMPLATE_SPELL_ID,
        },
        SpellRecord {
            id: TEMPLATE_SPELL_ID,
            name: "Hearty Meal".to_string(),
            stat_mod_type: 0x0001_0000,
            stat_mod_key: 2,
            stat_mod_val: 10.0,
            transfer_bitfield: 0,
        },
    )
}

pub struct Simulator {
    pub host: MemoryHost,
    pub epicurean: EpicureanMod,
    player: String,
    clock: NaiveDateTime,
}

impl Simulator {
    pub fn new(mod_dir: &Path, player: &str, access: AccessLevel, world_open: bool) -> Self {
        let mut host = MemoryHost::new();
        host.seed_spell(template_spell());
        host.add_player(MemoryPlayer::new(player, access));
        host.set_world_open(world_open);

        Self {
            host,
            epicurean: EpicureanMod::new(mod_dir),
            player: player.to_string(),
            clock: chrono::Local::now().naive_local(),
        }
    }

    pub fn start(&mut self) -> ModState {
        self.epicurean.start(&mut self.host)
    }

    pub fn reload(&mut self) -> ModState {
        self.epicurean.reload(&mut self.host)
    }

    pub fn shutdown(&mut self) {
        self.epicurean.shutdown(&mut self.host);
    }

    pub fn player_name(&self) -> &str {
        &self.player
    }

    pub fn player(&self) -> Option<&MemoryPlayer> {
        self.host.player(&self.player)
    }

    pub fn clock(&self) -> NaiveDateTime {
        self.clock
    }

    /// Run `count` heartbeats, advancing the clock one interval each.
    pub fn tick(&mut self, count: u32) {
        for _ in 0..count {
            self.clock += Duration::seconds(TICK_INTERVAL_SECS);
            self.host.tick(self.clock);
        }
    }

    /// Messages sent to the player since the last call
    pub fn drain_messages(&mut self) -> Vec<String> {
        self.host
            .player_mut(&self.player)
            .map(MemoryPlayer::take_messages)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epicurean_core::satiety::{SATIETY, is_well_fed};
    use epicurean_core::{CUSTOM_SPELL_ID, Player};

    fn mod_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("epicurean-sim-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_meal_through_simulator() {
        let dir = mod_dir("meal");
        let mut sim = Simulator::new(&dir, "Dev", AccessLevel::Developer, true);
        assert_eq!(sim.start(), ModState::Running);

        sim.host.run_command("Dev", "eat").unwrap();
        sim.tick(1);

        let player = sim.player().unwrap();
        assert!(is_well_fed(player));
        assert_eq!(player.casts(), &[CUSTOM_SPELL_ID]);
        assert_eq!(player.get_float(SATIETY), Some(7.0));
        assert!(!sim.drain_messages().is_empty());
        assert!(sim.drain_messages().is_empty());

        sim.shutdown();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_closed_world_rejects_commands() {
        let dir = mod_dir("closed");
        let mut sim = Simulator::new(&dir, "Dev", AccessLevel::Developer, false);
        sim.start();

        assert!(sim.host.run_command("Dev", "eat").is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
