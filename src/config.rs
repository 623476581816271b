use dioxus::logger::tracing::Level;
use serde::Deserialize;
use std::str::FromStr;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

pub const DEFAULT_DATABASE_NAME: &str = "audio_playlist";
#[cfg(target_arch = "wasm32")]
const CONFIG_KEY: &str = "audio_playlist.config";
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_SETTING: &str = "app_config";

/// Runtime configuration for the widget
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// IndexedDB database name, or the SQLite file stem on desktop
    pub database_name: String,
    pub database_version: u32,
    /// Record space holding the uploaded tracks
    pub store_name: String,
    /// Settings key of the persisted last-selected index
    pub position_key: String,
    pub log_level: String,
    /// Also persist the index reached by advancing past a finished track
    pub remember_auto_advance: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            database_version: 1,
            store_name: "audios".to_string(),
            position_key: "lastPlayedIndex".to_string(),
            log_level: "info".to_string(),
            remember_auto_advance: false,
        }
    }
}

impl AppConfig {
    /// Parsed `log_level`, falling back to `INFO` for unknown names
    pub fn log_level(&self) -> Level {
        Level::from_str(self.log_level.trim()).unwrap_or(Level::INFO)
    }

    fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.database_name.trim().is_empty() {
            self.database_name = defaults.database_name;
        }
        if self.store_name.trim().is_empty() {
            self.store_name = defaults.store_name;
        }
        if self.position_key.trim().is_empty() {
            self.position_key = defaults.position_key;
        }
        self.database_version = self.database_version.max(1);
        self
    }
}

/// Load the saved config, or defaults when none is stored.
#[cfg(target_arch = "wasm32")]
pub fn load_config() -> AppConfig {
    match LocalStorage::get::<AppConfig>(CONFIG_KEY) {
        Ok(config) => config.normalized(),
        Err(_) => AppConfig::default(),
    }
}

/// Load the saved config, or defaults when none is stored.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_config() -> AppConfig {
    let path = crate::db::sqlite::database_path(DEFAULT_DATABASE_NAME);
    crate::db::sqlite::read_setting(&path, CONFIG_SETTING)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<AppConfig>(&json).ok())
        .map(AppConfig::normalized)
        .unwrap_or_default()
}
