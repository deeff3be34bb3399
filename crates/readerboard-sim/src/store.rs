//! TOML-backed settings store.
//!
//! Stands in for the EEPROM of the real unit: one TOML file holding
//! the [`DeviceConfig`] fields.

use std::io::ErrorKind;
use std::path::PathBuf;

use readerboard_core::{ConfigStore, DeviceConfig, Error, Result};

pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for TomlStore {
    fn load(&mut self) -> Result<Option<DeviceConfig>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::ConfigStore(e.to_string())),
        };
        let config = toml::from_str(&text).map_err(|e| Error::ConfigStore(e.to_string()))?;
        Ok(Some(config))
    }

    fn save(&mut self, config: &DeviceConfig) -> Result<()> {
        let text =
            toml::to_string_pretty(config).map_err(|e| Error::ConfigStore(e.to_string()))?;
        std::fs::write(&self.path, text).map_err(|e| Error::ConfigStore(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_nothing() {
        let mut store = TomlStore::new(std::env::temp_dir().join("rbsim-no-such-file.toml"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join("rbsim-settings-test.toml");
        let mut store = TomlStore::new(path.clone());
        let mut config = DeviceConfig::default();
        config.unit_address = Some(12);
        config.serial_number = "RB0042".into();
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), Some(config));
        let _ = std::fs::remove_file(path);
    }
}
