//! Heartbeat extension point.
//!
//! The host updates every player once per tick. After its own update it runs
//! each registered [`HeartbeatHook`] in registration order.

use chrono::NaiveDateTime;

use crate::host::Player;

/// Logic to run after a player's heartbeat
pub trait HeartbeatHook {
    /// Unique name, used to unregister
    fn name(&self) -> &str;

    fn post_heartbeat(&mut self, player: &mut dyn Player, now: NaiveDateTime);
}

/// Ordered list of heartbeat hooks, owned by the host's tick loop.
#[derive(Default)]
pub struct HeartbeatHooks {
    hooks: Vec<Box<dyn HeartbeatHook>>,
}

impl std::fmt::Debug for HeartbeatHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| h.name()))
            .finish()
    }
}

impl HeartbeatHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Returns false (and drops the hook) if the name is taken.
    pub fn register(&mut self, hook: Box<dyn HeartbeatHook>) -> bool {
        if self.contains(hook.name()) {
            tracing::warn!(hook = hook.name(), "Heartbeat hook already registered");
            return false;
        }
        tracing::debug!(hook = hook.name(), "Registered heartbeat hook");
        self.hooks.push(hook);
        true
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| h.name() != name);
        before != self.hooks.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.iter().any(|h| h.name() == name)
    }

    /// Run every hook for one player
    pub fn run(&mut self, player: &mut dyn Player, now: NaiveDateTime) {
        for hook in &mut self.hooks {
            hook.post_heartbeat(player, now);
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
