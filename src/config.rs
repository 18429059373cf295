use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::{SettingError, SettingField, Settings};

/// Default durations, stored as JSON in the platform config dir
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for Config {
    fn from(s: Settings) -> Self {
        Self {
            work_minutes: s.work_minutes(),
            short_break_minutes: s.short_break_minutes(),
            long_break_minutes: s.long_break_minutes(),
        }
    }
}

impl TryFrom<Config> for Settings {
    type Error = SettingError;

    fn try_from(cfg: Config) -> Result<Self, Self::Error> {
        Settings::new(
            cfg.work_minutes,
            cfg.short_break_minutes,
            cfg.long_break_minutes,
        )
    }
}

impl Config {
    /// Settings from this config; an out-of-range value falls back to its
    /// default without affecting the other fields
    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();
        let values = [
            (SettingField::WorkTime, self.work_minutes),
            (SettingField::ShortBreakTime, self.short_break_minutes),
            (SettingField::LongBreakTime, self.long_break_minutes),
        ];
        for (field, value) in values {
            if let Err(e) = settings.set(field, value) {
                log::warn!("ignoring config value: {e}");
            }
        }
        settings
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "pomotui") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("pomotui_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("unreadable config at {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            work_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 30,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
        assert_eq!(loaded.to_settings(), Settings::new(50, 10, 30).unwrap());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn garbage_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"work_minutes": 45}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.work_minutes, 45);
        assert_eq!(cfg.short_break_minutes, 5);
        assert_eq!(cfg.long_break_minutes, 15);
    }

    #[test]
    fn out_of_range_config_falls_back_to_default_settings() {
        let cfg = Config {
            work_minutes: 90,
            short_break_minutes: 5,
            long_break_minutes: 15,
        };
        assert!(Settings::try_from(cfg).is_err());
        assert_eq!(cfg.to_settings(), Settings::default());
    }

    #[test]
    fn out_of_range_field_keeps_valid_fields() {
        let cfg = Config {
            work_minutes: 50,
            short_break_minutes: 5,
            long_break_minutes: 40,
        };
        let settings = cfg.to_settings();
        assert_eq!(settings.work_minutes(), 50);
        assert_eq!(settings.short_break_minutes(), 5);
        assert_eq!(settings.long_break_minutes(), 15);
    }
}
