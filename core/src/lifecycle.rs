//! Mod start/shutdown.
//!
//! Start loads settings, publishes the custom spell and registers the
//! heartbeat hook and commands. Any failure leaves the mod in
//! [`ModState::Error`] and asks the host to disable it.

use std::path::{Path, PathBuf};

use epicurean_types::Settings;

use crate::commands::{register_culinary_commands, unregister_culinary_commands};
use crate::host::ModHost;
use crate::satiety::{SATIETY_HOOK, SatietyHook, SatietyRules};
use crate::settings::{FsIo, SettingsIo, SettingsStore};
use crate::spell::{Spell, clear_custom_spell, init_custom_spell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModState {
    #[default]
    Unloaded,
    Loading,
    Running,
    Error,
}

impl std::fmt::Display for ModState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Running => "running",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct EpicureanMod<I: SettingsIo = FsIo> {
    mod_path: PathBuf,
    store: SettingsStore<I>,
    state: ModState,
    settings: Settings,
    /// Set while running
    custom_spell: Option<Spell>,
}

impl EpicureanMod<FsIo> {
    pub fn new(mod_path: &Path) -> Self {
        Self::with_io(mod_path, FsIo)
    }
}

impl<I: SettingsIo> EpicureanMod<I> {
    pub fn with_io(mod_path: &Path, io: I) -> Self {
        Self {
            mod_path: mod_path.to_path_buf(),
            store: SettingsStore::with_io(mod_path, io),
            state: ModState::Unloaded,
            settings: Settings::default(),
            custom_spell: None,
        }
    }

    pub fn state(&self) -> ModState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn custom_spell(&self) -> Option<&Spell> {
        self.custom_spell.as_ref()
    }

    pub fn mod_path(&self) -> &Path {
        &self.mod_path
    }

    pub fn store(&self) -> &SettingsStore<I> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore<I> {
        &mut self.store
    }

    /// Start the mod. Starting while running restarts it so the hook and
    /// commands always use the settings just loaded.
    pub fn start(&mut self, host: &mut dyn ModHost) -> ModState {
        if self.state == ModState::Running {
            self.shutdown(host);
        }
        self.state = ModState::Loading;

        self.settings = match self.store.load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings");
                return self.fail(host);
            }
        };

        let spell = match init_custom_spell(host, &self.settings) {
            Ok(spell) => spell,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to publish custom spell");
                return self.fail(host);
            }
        };

        let rules = SatietyRules::from(&self.settings);
        let hooked = host
            .heartbeat_hooks()
            .register(Box::new(SatietyHook::new(spell.clone(), rules.clone())));
        let commanded = hooked && register_culinary_commands(host.commands(), &spell, &rules);
        if !commanded {
            tracing::warn!(hooked, "Hook or command names already taken");
            if hooked {
                host.heartbeat_hooks().unregister(SATIETY_HOOK);
            }
            clear_custom_spell(host);
            return self.fail(host);
        }

        tracing::info!(spell_id = spell.id(), name = spell.name(), "Mod running");
        self.custom_spell = Some(spell);
        self.state = ModState::Running;
        self.state
    }

    pub fn shutdown(&mut self, host: &mut dyn ModHost) {
        match self.state {
            ModState::Running => {
                host.heartbeat_hooks().unregister(SATIETY_HOOK);
                unregister_culinary_commands(host.commands());
                clear_custom_spell(host);
                self.custom_spell = None;
                self.state = ModState::Unloaded;
                tracing::info!(path = %self.mod_path.display(), "Mod shut down");
            }
            ModState::Error => {
                tracing::error!(path = %self.mod_path.display(), "Improper shutdown");
            }
            ModState::Unloaded | ModState::Loading => {}
        }
    }

    fn fail(&mut self, host: &mut dyn ModHost) -> ModState {
        tracing::error!(path = %self.mod_path.display(), "Mod failed to start");
        host.disable_mod(&self.mod_path);
        self.state = ModState::Error;
        self.state
    }

    /// Shut down and start again, re-reading settings.
    pub fn reload(&mut self, host: &mut dyn ModHost) -> ModState {
        self.shutdown(host);
        self.start(host)
    }
}
