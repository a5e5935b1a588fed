use directories::ProjectDirs;
use planscale_core::DisplaySettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: DisplaySettings,
}

/// Accepted on-disk layouts; plain key/value files predate the envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettingsFile {
    Envelope(SettingsEnvelope),
    Flat(DisplaySettings),
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "Planscale", "Planscale")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    pub fn load_settings(&self) -> Result<DisplaySettings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(DisplaySettings::default());
        }

        let bytes = fs::read(path)?;
        let settings = match serde_json::from_slice(&bytes)? {
            SettingsFile::Envelope(envelope) => {
                if envelope.version > SETTINGS_SCHEMA_VERSION {
                    log::warn!(
                        "settings schema version {} is newer than {SETTINGS_SCHEMA_VERSION}, unknown keys are ignored",
                        envelope.version
                    );
                }
                envelope.settings
            }
            SettingsFile::Flat(settings) => settings,
        };

        Ok(settings)
    }

    pub fn save_settings(&self, settings: &DisplaySettings) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        log::debug!("saved settings to {}", self.settings_path().display());
        Ok(())
    }

    /// Remove the stored settings so the defaults apply again
    pub fn reset_settings(&self) -> Result<DisplaySettings, StorageError> {
        match fs::remove_file(self.settings_path()) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(DisplaySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planscale_core::Color;

    #[test]
    fn settings_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path().join("nested"));

        let settings = DisplaySettings {
            measurement_line_color: Color::rgb(0x12, 0x34, 0x56),
            show_rulers: false,
            ruler_size: 40,
            ..DisplaySettings::default()
        };

        store.save_settings(&settings).expect("save should succeed");
        let loaded = store.load_settings().expect("load should succeed");

        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        let loaded = store.load_settings().expect("load should succeed");
        assert_eq!(loaded, DisplaySettings::default());
    }

    #[test]
    fn saved_file_is_versioned_envelope() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        store.save_settings(&DisplaySettings::default()).expect("save should succeed");

        let raw = fs::read_to_string(store.settings_path()).expect("settings file should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["settings"]["crosshair_color"], "#00FF00");
    }

    #[test]
    fn loads_flat_file_with_partial_keys() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(
            store.settings_path(),
            r##"{"calibration_line_color": "#00FF00", "grid_spacing": 25, "window_geometry": "1200x800"}"##,
        )
        .expect("write flat settings");

        let loaded = store.load_settings().expect("flat file should load");
        assert_eq!(loaded.calibration_line_color, Color::GREEN);
        assert_eq!(loaded.grid_spacing, 25);
        assert_eq!(loaded.point_size, 4);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(store.settings_path(), "{ not json").expect("write corrupt settings");

        assert!(matches!(store.load_settings(), Err(StorageError::Serde(_))));
    }

    #[test]
    fn reset_removes_file_and_returns_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        let settings = DisplaySettings { point_size: 9, ..DisplaySettings::default() };
        store.save_settings(&settings).expect("save should succeed");

        let reset = store.reset_settings().expect("reset should succeed");
        assert_eq!(reset, DisplaySettings::default());
        assert!(!store.settings_path().exists());
        store.reset_settings().expect("reset without a file should succeed");
    }
}
