//! Publishes the custom buff into the host's spell tables.
//!
//! The buff is a clone of an existing template spell with a few fields
//! changed, stored under its own id in both the spell cache and the spell
//! table. Registration is idempotent: any previous entry is cleared first.

use epicurean_types::Settings;

use super::{INFINITE_DURATION, Spell};
use crate::host::ModHost;

/// Spell the buff is cloned from
pub const TEMPLATE_SPELL_ID: u32 = 3760;

/// Id the buff is published under
pub const CUSTOM_SPELL_ID: u32 = 27;

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Template spell {id} is missing from the {table}")]
    TemplateMissing { id: u32, table: &'static str },
}

/// Clone the template, mutate it into the custom buff and publish it.
///
/// Table collisions are logged and skipped, never treated as errors.
pub fn init_custom_spell(host: &mut dyn ModHost, settings: &Settings) -> Result<Spell, PatchError> {
    let mut base = host
        .spell_table()
        .get(TEMPLATE_SPELL_ID)
        .cloned()
        .ok_or(PatchError::TemplateMissing {
            id: TEMPLATE_SPELL_ID,
            table: "spell table",
        })?;
    let mut record = host
        .spell_cache()
        .get(TEMPLATE_SPELL_ID)
        .cloned()
        .ok_or(PatchError::TemplateMissing {
            id: TEMPLATE_SPELL_ID,
            table: "spell cache",
        })?;

    base.duration = INFINITE_DURATION;
    base.name = settings.spell_name.clone();
    // Own refresh/surpass group, and wins ties against the template
    base.category += 1;
    base.power += 1;
    base.meta_spell_id = CUSTOM_SPELL_ID;

    record.id = CUSTOM_SPELL_ID;
    record.name = settings.spell_name.clone();
    record.stat_mod_val = settings.stat_mod_value;

    clear_custom_spell(host);

    if host.spell_cache().try_add(CUSTOM_SPELL_ID, record.clone()) {
        tracing::info!(spell_id = CUSTOM_SPELL_ID, name = %record.name, "Updated DB spell");
    } else {
        tracing::warn!(spell_id = CUSTOM_SPELL_ID, "Spell cache already has an entry, skipped");
    }
    if host.spell_table().try_add(CUSTOM_SPELL_ID, base.clone()) {
        tracing::info!(spell_id = CUSTOM_SPELL_ID, name = %base.name, "Updated spell base");
    } else {
        tracing::warn!(spell_id = CUSTOM_SPELL_ID, "Spell table already has an entry, skipped");
    }

    Ok(Spell::new(base, record))
}

/// Remove the custom buff from both tables. Returns how many entries were removed.
pub fn clear_custom_spell(host: &mut dyn ModHost) -> usize {
    let mut removed = 0;
    if let Some(record) = host.spell_cache().try_remove(CUSTOM_SPELL_ID) {
        tracing::info!(spell_id = CUSTOM_SPELL_ID, name = %record.name, "Removed DB spell");
        removed += 1;
    }
    if let Some(base) = host.spell_table().try_remove(CUSTOM_SPELL_ID) {
        tracing::info!(spell_id = CUSTOM_SPELL_ID, name = %base.name, "Removed spell base");
        removed += 1;
    }
    removed
}
