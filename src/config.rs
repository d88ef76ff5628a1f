//! sitelog configuration.
//!
//! Loaded from `<home>/config.toml`, where `<home>` is resolved through a
//! chain:
//!
//! 1. `SITELOG_HOME` env var
//! 2. `~/.sitelog`
//!
//! Every key is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::model::Position;

/// sitelog configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Wireless interface to query (e.g. `wlan0`). All interfaces when unset.
    pub interface: Option<String>,

    /// Storage root for observations and the permission record.
    /// Defaults to the sitelog home directory.
    pub store: Option<PathBuf>,

    /// Fixed position served to collections.
    pub position: Option<Position>,
}

impl Config {
    /// Load config from `<home>/config.toml`, or defaults if it is missing.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path, or defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if let Some(p) = &config.position
            && (!(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lon))
        {
            return Err(format!(
                "position out of range in {}: lat {}, lon {}",
                path.display(),
                p.lat,
                p.lon
            ));
        }

        Ok(config)
    }

    /// The sitelog home directory: `SITELOG_HOME`, else `~/.sitelog`.
    pub fn home() -> Option<PathBuf> {
        if let Ok(home) = env::var("SITELOG_HOME")
            && !home.is_empty()
        {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir().map(|h| h.join(".sitelog"))
    }

    /// The config file path: `<home>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        Self::home().map(|h| h.join("config.toml"))
    }

    /// Where observations are stored: `store` if set, else the home directory.
    pub fn storage_root(&self) -> Option<PathBuf> {
        self.store.clone().or_else(Self::home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_every_key() {
        let (_dir, path) = write_config(
            "interface = \"wlan0\"\n\
             store = \"/var/lib/sitelog\"\n\
             [position]\n\
             lat = 37.0\n\
             lon = -122.0\n",
        );
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.interface.as_deref(), Some("wlan0"));
        assert_eq!(config.store, Some(PathBuf::from("/var/lib/sitelog")));
        assert_eq!(
            config.position,
            Some(Position {
                lat: 37.0,
                lon: -122.0,
            })
        );
        assert_eq!(
            config.storage_root(),
            Some(PathBuf::from("/var/lib/sitelog"))
        );
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let (_dir, path) = write_config("interface = \n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config at"), "{err}");
        assert!(err.contains("config.toml"), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_dir, path) = write_config("interfaces = \"wlan0\"\n");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        let (_dir, path) = write_config("[position]\nlat = 91.0\nlon = 0.0\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("out of range"), "{err}");
    }
}
