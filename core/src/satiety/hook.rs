use chrono::NaiveDateTime;

use super::machine::{SatietyRules, Transition, advance};
use crate::heartbeat::HeartbeatHook;
use crate::host::Player;
use crate::spell::Spell;

pub const SATIETY_HOOK: &str = "epicurean.satiety";

/// Runs the satiety state machine after every player heartbeat.
#[derive(Debug, Clone)]
pub struct SatietyHook {
    spell: Spell,
    rules: SatietyRules,
}

impl SatietyHook {
    pub fn new(spell: Spell, rules: SatietyRules) -> Self {
        Self { spell, rules }
    }
}

impl HeartbeatHook for SatietyHook {
    fn name(&self) -> &str {
        SATIETY_HOOK
    }

    fn post_heartbeat(&mut self, player: &mut dyn Player, _now: NaiveDateTime) {
        match advance(player, &self.spell, &self.rules) {
            Transition::Fed { satiety } => {
                tracing::debug!(player = player.name(), satiety, "Player is now well fed");
            }
            Transition::Starved => {
                tracing::debug!(player = player.name(), "Player is no longer well fed");
            }
            Transition::Idle | Transition::Digested { .. } => {}
        }
    }
}
