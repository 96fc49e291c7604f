use crate::error::PersistenceError;
use crate::model::Difficulty;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "morimori";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_SHARE_BASE_URL: &str = "https://morimori.app/";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub default_difficulty: Difficulty,

    #[serde(default = "default_true")]
    pub analytics_enabled: bool,

    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// Where the score state lives; the settings directory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// Helper functions for default values
fn default_version() -> u32 {
    2
}
fn default_true() -> bool {
    true
}
fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_difficulty: Difficulty::default(),
            analytics_enabled: true,
            share_base_url: default_share_base_url(),
            data_dir: None,
            version: default_version(),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `dir`, writing defaults when it is missing or unreadable.
    pub fn load(dir: &Path) -> Self {
        let path = Self::settings_path(dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(err) => warn!(target: "settings", "Ignoring {}: {err}", path.display()),
            }
        }
        let default = Settings::default();
        if let Err(err) = default.save(dir) {
            warn!(target: "settings", "Could not write default settings: {err}");
        }
        default
    }

    pub fn save(&self, dir: &Path) -> Result<(), PersistenceError> {
        let path = Self::settings_path(dir);
        let io_error = |source: std::io::Error| PersistenceError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(&io_error)?;
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(&io_error)
    }

    pub fn settings_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }

    /// `<user data dir>/morimori`.
    pub fn default_dir() -> Result<PathBuf, PersistenceError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PersistenceError::NoDataDir)
    }

    pub fn state_dir(&self, settings_dir: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| settings_dir.to_path_buf())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn migrate(&mut self) {
        match self.version {
            // version 1 had no share link; an empty one would produce relative links
            0 | 1 => {
                if self.share_base_url.trim().is_empty() {
                    self.share_base_url = default_share_base_url();
                }
                self.version = 2;
            }
            _ => (),
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("MORIMORI_DEBUG")
            .map(|v| v == "1")
            .unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("MORIMORI_SEED")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
    }
}
