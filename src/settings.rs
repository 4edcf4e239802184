use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;
use crate::game::GameConfig;

const SETTINGS_DIR: &str = "memory-pairs";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// User settings read from `settings.json` in the user config directory.
///
/// Only the card symbols can be changed; the grid and timings are fixed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
}

pub fn settings_path() -> PathBuf {
    glib::user_config_dir()
        .join(SETTINGS_DIR)
        .join(SETTINGS_FILE_NAME)
}

impl Settings {
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(&settings_path())
    }

    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source: std::io::Error| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).map_err(write_err)
    }

    pub fn into_config(self) -> Result<GameConfig, SettingsError> {
        match self.symbols {
            Some(symbols) => Ok(GameConfig::with_symbols(symbols)?),
            None => Ok(GameConfig::default()),
        }
    }
}
