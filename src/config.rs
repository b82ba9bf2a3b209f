use crate::app_dirs::AppDirs;
use crate::error::StoreResult;
use crate::layout::KeyboardLayout;
use crate::session::{Mode, SessionConfig};
use crate::store::{save_json, DocumentStore, FileStore, MemoryStore};
use crate::theme::{Theme, DEFAULT_THEME};
use clap::ValueEnum;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DURATION_OPTIONS: [u32; 4] = [15, 30, 60, 120];
pub const WORD_COUNT_OPTIONS: [usize; 4] = [10, 25, 50, 100];

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub duration: u32,
    pub word_count: usize,
    pub layout: KeyboardLayout,
    pub theme: String,
    pub font_size: FontSize,
    pub sound_on_error: bool,
    pub reduced_motion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration: 30,
            word_count: 25,
            layout: KeyboardLayout::Qwerty,
            theme: DEFAULT_THEME.to_string(),
            font_size: FontSize::Medium,
            sound_on_error: false,
            reduced_motion: false,
        }
    }
}

impl Config {
    /// Builds a config from a loosely typed document. Each missing or
    /// invalid key keeps its default; the others are still honoured.
    pub fn from_value(value: &Value) -> Self {
        let mut cfg = Self::default();
        let Some(map) = value.as_object() else {
            log::warn!("config document is not an object, using defaults");
            return cfg;
        };

        if let Some(mode) = field(map, "mode", |_: &Mode| true) {
            cfg.mode = mode;
        }
        if let Some(duration) = field(map, "duration", |d: &u32| DURATION_OPTIONS.contains(d)) {
            cfg.duration = duration;
        }
        if let Some(count) = field(map, "word_count", |n: &usize| {
            WORD_COUNT_OPTIONS.contains(n)
        }) {
            cfg.word_count = count;
        }
        if let Some(layout) = field(map, "layout", |_: &KeyboardLayout| true) {
            cfg.layout = layout;
        }
        if let Some(theme) = field(map, "theme", |t: &String| Theme::by_name(t).is_some()) {
            cfg.theme = theme;
        }
        if let Some(size) = field(map, "font_size", |_: &FontSize| true) {
            cfg.font_size = size;
        }
        if let Some(sound) = field(map, "sound_on_error", |_: &bool| true) {
            cfg.sound_on_error = sound;
        }
        if let Some(reduced) = field(map, "reduced_motion", |_: &bool| true) {
            cfg.reduced_motion = reduced;
        }

        cfg
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            duration_secs: self.duration,
            word_count: self.word_count,
            layout: self.layout,
        }
    }

    pub fn theme(&self) -> &'static Theme {
        Theme::named_or_default(&self.theme)
    }
}

fn field<T, F>(map: &Map<String, Value>, key: &str, valid: F) -> Option<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let raw = map.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            log::warn!("ignoring invalid config value {raw} for {key}");
            None
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> StoreResult<()>;
}

/// Config persisted as a JSON object in a [`DocumentStore`].
pub struct JsonConfigStore {
    store: Box<dyn DocumentStore>,
}

impl JsonConfigStore {
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// `config.json` in the platform config directory.
    pub fn file() -> Self {
        Self::new(Box::new(FileStore::with_path(AppDirs::config_path())))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Config {
        let contents = match self.store.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Config::default(),
            Err(e) => {
                log::warn!("unable to read config: {e}");
                return Config::default();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => Config::from_value(&value),
            Err(e) => {
                log::warn!("ignoring malformed config: {e}");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> StoreResult<()> {
        save_json(self.store.as_ref(), cfg).inspect_err(|e| {
            log::error!("failed to save config: {e}");
        })
    }
}
