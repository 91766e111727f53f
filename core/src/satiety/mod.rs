//! Satiety tracking
//!
//! Each player carries two properties:
//! - **Satiety**: seconds of fullness left, clamped to `[0, max]`
//! - **Well fed**: whether the buff is considered active
//!
//! # State machine
//!
//! ```text
//!            eat (satiety > 0), next tick: cast buff
//!   ┌────────┐ ─────────────────────────────────────▶ ┌──────┐
//!   │ Hungry │                                        │ Fed  │ ◀─┐ tick: satiety -= decay
//!   └────────┘ ◀───────────────────────────────────── └──────┘ ──┘
//!            tick leaves satiety at 0: remove buff
//! ```
//!
//! The heartbeat hook only ever decrements; satiety is granted by `eat`.

mod hook;
mod machine;


pub use hook::{SATIETY_HOOK, SatietyHook};
pub use machine::{
    SATIETY, SatietyRules, SatietyState, Transition, WELL_FED, advance, apply_buff, clear_buff,
    eat, is_well_fed, satiety,
};
