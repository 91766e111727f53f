use serde::{Deserialize, Serialize};

/// When the heartbeat should message a player about their satiety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageMode {
    /// Every tick while fed
    #[default]
    Always,
    /// Only when the player becomes fed or hungry
    OnTransition,
    /// Never
    Never,
}

/// Mod settings, persisted as `Settings.json` in the mod directory.
///
/// Every field has a default so older or hand-trimmed files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Seconds of satiety removed per heartbeat tick
    pub decay_per_tick: f64,

    /// Seconds of satiety granted by one `eat`
    pub satiety_per_meal: f64,

    /// Satiety ceiling in seconds
    pub max_satiety: f64,

    /// Magnitude written into the cloned spell record
    pub stat_mod_value: f32,

    /// Display name of the custom buff
    pub spell_name: String,

    pub tick_messages: MessageMode,

    /// Use `,` as the decimal separator in player messages
    pub european_numbers: bool,
}

/// Default name of the custom buff
pub const CUSTOM_SPELL_NAME: &str = "Epicurean's Ecstasy";

/// Default stat modifier magnitude of the custom buff
pub const CUSTOM_STAT_MOD_VAL: f32 = 1000.0;

impl Default for Settings {
    fn default() -> Self {
        Self {
            decay_per_tick: 5.0,
            satiety_per_meal: 7.0,
            max_satiety: 20.0,
            stat_mod_value: CUSTOM_STAT_MOD_VAL,
            spell_name: CUSTOM_SPELL_NAME.to_string(),
            tick_messages: MessageMode::Always,
            european_numbers: false,
        }
    }
}
