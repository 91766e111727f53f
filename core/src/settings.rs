//! Settings persistence
//!
//! Settings live in `Settings.json` inside the mod directory. A missing file
//! is created from defaults. Reads and writes are retried a bounded number
//! of times; a file that does not parse is not retried.

use std::io;
use std::path::{Path, PathBuf};

use epicurean_types::Settings;

/// Attempts for each read or write before giving up
pub const RETRIES: u32 = 10;

pub const SETTINGS_FILE: &str = "Settings.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read {path:?} after {attempts} attempts")]
    Read {
        path: PathBuf,
        attempts: u32,
        source: io::Error,
    },

    #[error("Failed to write {path:?} after {attempts} attempts")]
    Write {
        path: PathBuf,
        attempts: u32,
        source: io::Error,
    },

    #[error("Failed to deserialize {path:?}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid setting {field} in {path:?}: must be a positive number")]
    Invalid { path: PathBuf, field: &'static str },

    #[error("Failed to serialize settings")]
    Serialize(#[from] serde_json::Error),
}

/// File access used by [`SettingsStore`]
pub trait SettingsIo {
    fn exists(&self, path: &Path) -> bool;

    fn read(&mut self, path: &Path) -> io::Result<String>;

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIo;

impl SettingsIo for FsIo {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&mut self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }
}

#[derive(Debug)]
pub struct SettingsStore<I: SettingsIo = FsIo> {
    path: PathBuf,
    io: I,
}

impl SettingsStore<FsIo> {
    pub fn new(mod_path: &Path) -> Self {
        Self::with_io(mod_path, FsIo)
    }
}

impl<I: SettingsIo> SettingsStore<I> {
    pub fn with_io(mod_path: &Path, io: I) -> Self {
        Self {
            path: mod_path.join(SETTINGS_FILE),
            io,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// Load settings, writing defaults first if the file does not exist.
    pub fn load(&mut self) -> Result<Settings, SettingsError> {
        if !self.io.exists(&self.path) {
            tracing::info!(path = %self.path.display(), "Creating settings file");
            self.save(&Settings::default())?;
        } else {
            tracing::info!(path = %self.path.display(), "Loading settings");
        }

        let path = self.path.clone();
        let io = &mut self.io;
        let contents = retry("read", &path, || io.read(&path)).map_err(|source| {
            SettingsError::Read {
                path: path.clone(),
                attempts: RETRIES,
                source,
            }
        })?;

        let settings = parse_settings(&contents).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to deserialize settings");
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;

        if let Some(field) = invalid_field(&settings) {
            tracing::warn!(path = %path.display(), field, "Rejected settings");
            return Err(SettingsError::Invalid { path, field });
        }
        Ok(settings)
    }

    /// Write settings as indented JSON.
    pub fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let contents = serde_json::to_string_pretty(settings)?;

        let path = self.path.clone();
        let io = &mut self.io;
        retry("write", &path, || io.write(&path, &contents)).map_err(|source| {
            SettingsError::Write {
                path: path.clone(),
                attempts: RETRIES,
                source,
            }
        })
    }
}

/// Parse settings JSON, tolerating trailing commas.
pub fn parse_settings(contents: &str) -> Result<Settings, serde_json::Error> {
    serde_json::from_str(&strip_trailing_commas(contents))
}

/// First tunable that is not a positive finite number. Decay must only
/// drain, meals must only fill, and the ceiling must leave room for a meal.
fn invalid_field(settings: &Settings) -> Option<&'static str> {
    [
        ("decayPerTick", settings.decay_per_tick),
        ("satietyPerMeal", settings.satiety_per_meal),
        ("maxSatiety", settings.max_satiety),
    ]
    .into_iter()
    .find(|(_, value)| !(value.is_finite() && *value > 0.0))
    .map(|(field, _)| field)
}

/// Run `op` up to [`RETRIES`] times, returning the last error on exhaustion.
fn retry<T>(what: &str, path: &Path, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= RETRIES => {
                tracing::warn!(path = %path.display(), attempts = attempt, error = %e, "Settings {what} failed");
                return Err(e);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), attempt, error = %e, "Settings {what} failed, retrying");
                attempt += 1;
            }
        }
    }
}

/// Drop commas that directly precede `}` or `]`, ignoring string contents.
fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma: Option<usize> = None;

    for c in input.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                pending_comma = None;
                in_string = true;
                out.push(c);
            }
            ',' => {
                pending_comma = Some(out.len());
                out.push(c);
            }
            '}' | ']' => {
                if let Some(idx) = pending_comma.take() {
                    out.remove(idx);
                }
                out.push(c);
            }
            c if c.is_whitespace() => out.push(c),
            _ => {
                pending_comma = None;
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use epicurean_types::MessageMode;
    use hashbrown::HashMap;

    /// In-memory files with a budget of forced failures
    #[derive(Default)]
    pub(crate) struct FakeIo {
        pub files: HashMap<PathBuf, String>,
        pub read_failures: u32,
        pub write_failures: u32,
        pub reads: u32,
        pub writes: u32,
    }

    impl SettingsIo for FakeIo {
        fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn read(&mut self, path: &Path) -> io::Result<String> {
            self.reads += 1;
            if self.read_failures > 0 {
                self.read_failures -= 1;
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "file locked"));
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
            self.writes += 1;
            if self.write_failures > 0 {
                self.write_failures -= 1;
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "file locked"));
            }
            self.files.insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }

    fn mod_dir() -> PathBuf {
        PathBuf::from("/mods/Epicurean")
    }

    #[test]
    fn test_missing_file_written_with_defaults() {
        let mut store = SettingsStore::with_io(&mod_dir(), FakeIo::default());

        let settings = store.load().unwrap();

        assert_eq!(settings, Settings::default());
        let written = &store.io().files[&mod_dir().join(SETTINGS_FILE)];
        assert!(written.contains("\n  \"decayPerTick\": 5.0"));
    }

    #[test]
    fn test_existing_file_loaded() {
        let mut io = FakeIo::default();
        io.files.insert(
            mod_dir().join(SETTINGS_FILE),
            r#"{ "satietyPerMeal": 3.5, "tickMessages": "never" }"#.to_string(),
        );
        let mut store = SettingsStore::with_io(&mod_dir(), io);

        let settings = store.load().unwrap();

        assert_eq!(settings.satiety_per_meal, 3.5);
        assert_eq!(settings.tick_messages, MessageMode::Never);
        assert_eq!(store.io().writes, 0);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = SettingsStore::with_io(&mod_dir(), FakeIo::default());
        let settings = Settings {
            max_satiety: 42.0,
            spell_name: "Épicurien".to_string(),
            european_numbers: true,
            ..Default::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
        // Non-ASCII is written as-is
        assert!(store.io().files[&mod_dir().join(SETTINGS_FILE)].contains("Épicurien"));
    }

    #[test]
    fn test_read_recovers_within_retry_budget() {
        let mut store = SettingsStore::with_io(&mod_dir(), FakeIo::default());
        store.save(&Settings::default()).unwrap();
        store.io_mut().read_failures = RETRIES - 1;

        assert!(store.load().is_ok());
        assert_eq!(store.io().reads, RETRIES);
    }

    #[test]
    fn test_read_exhaustion() {
        let mut store = SettingsStore::with_io(&mod_dir(), FakeIo::default());
        store.save(&Settings::default()).unwrap();
        store.io_mut().read_failures = RETRIES;

        let err = store.load().unwrap_err();

        assert!(matches!(err, SettingsError::Read { attempts: RETRIES, .. }));
        assert_eq!(store.io().reads, RETRIES);
    }

    #[test]
    fn test_write_exhaustion() {
        let mut io = FakeIo::default();
        io.write_failures = RETRIES;
        let mut store = SettingsStore::with_io(&mod_dir(), io);

        let err = store.load().unwrap_err();

        assert!(matches!(err, SettingsError::Write { attempts: RETRIES, .. }));
        assert_eq!(store.io().writes, RETRIES);
        assert_eq!(store.io().reads, 0);
    }

    #[test]
    fn test_parse_error_not_retried() {
        let mut io = FakeIo::default();
        io.files
            .insert(mod_dir().join(SETTINGS_FILE), "{ not json".to_string());
        let mut store = SettingsStore::with_io(&mod_dir(), io);

        let err = store.load().unwrap_err();

        assert!(matches!(err, SettingsError::Parse { .. }));
        assert_eq!(store.io().reads, 1);
    }

    #[test]
    fn test_non_positive_tunables_rejected() {
        for (json, expected) in [
            (r#"{ "decayPerTick": -5.0 }"#, "decayPerTick"),
            (r#"{ "satietyPerMeal": -7.0 }"#, "satietyPerMeal"),
            (r#"{ "maxSatiety": 0.0 }"#, "maxSatiety"),
        ] {
            let mut io = FakeIo::default();
            io.files.insert(mod_dir().join(SETTINGS_FILE), json.to_string());
            let mut store = SettingsStore::with_io(&mod_dir(), io);

            let err = store.load().unwrap_err();

            assert!(
                matches!(err, SettingsError::Invalid { field, .. } if field == expected),
                "{json}: {err}"
            );
            assert_eq!(store.io().reads, 1);
        }
    }

    #[test]
    fn test_trailing_commas_accepted() {
        let json = r#"{
            "decayPerTick": 2.0,
            "spellName": "Feast, Day ]",
        }"#;

        let settings = parse_settings(json).unwrap();

        assert_eq!(settings.decay_per_tick, 2.0);
        assert_eq!(settings.spell_name, "Feast, Day ]");
    }

    #[test]
    fn test_strip_trailing_commas_keeps_strings() {
        assert_eq!(strip_trailing_commas(r#"[1, 2, ]"#), "[1, 2 ]");
        assert_eq!(strip_trailing_commas(r#"{"a": ",}"}"#), r#"{"a": ",}"}"#);
        assert_eq!(strip_trailing_commas(r#"{"a": "\",}",}"#), r#"{"a": "\",}"}"#);
    }

    #[test]
    fn test_fs_round_trip() {
        let dir = std::env::temp_dir().join(format!("epicurean-settings-{}", std::process::id()));
        let mut store = SettingsStore::new(&dir);

        let created = store.load().unwrap();
        assert_eq!(created, Settings::default());
        assert!(store.path().exists());

        let changed = Settings {
            decay_per_tick: 1.0,
            ..Default::default()
        };
        store.save(&changed).unwrap();
        assert_eq!(store.load().unwrap(), changed);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
