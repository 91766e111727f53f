//! Shared configuration types for the Epicurean's Ecstasy mod.
//!
//! Kept free of I/O so both the mod runtime and tooling can depend on it.

pub mod formatting;
mod settings;

pub use settings::{CUSTOM_SPELL_NAME, CUSTOM_STAT_MOD_VAL, MessageMode, Settings};
