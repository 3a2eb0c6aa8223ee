//! Editor settings loading and saving

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::CommandId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub toolbar: ToolbarConfig,
    #[serde(default)]
    pub shortcuts: ShortcutsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON pose store
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "./Saved/camerapos.json".to_string()
}

/// Which automatic lifecycle hooks are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Apply the saved pose when a level is opened
    #[serde(default = "default_true")]
    pub restore_on_open: bool,
    /// Capture the live pose when a level is saved
    #[serde(default = "default_true")]
    pub capture_on_save: bool,
    /// Capture the live pose when a level is about to close
    #[serde(default = "default_true")]
    pub capture_on_close: bool,
    /// Store and restore the field of view along with the transform
    #[serde(default = "default_true")]
    pub include_fov: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            restore_on_open: true,
            capture_on_save: true,
            capture_on_close: true,
            include_fov: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolbarConfig {
    /// Show the camera position toolbar in the viewport
    #[serde(default)]
    pub show: bool,
}

/// Keyboard chords such as `Ctrl+Shift+Home`
///
/// An empty string means unbound. A missing key takes the default, so
/// `restore = ""` is how the default restore chord is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutsConfig {
    #[serde(default = "default_restore_chord")]
    pub restore: String,
    #[serde(default = "default_save_chord")]
    pub save: String,
    #[serde(default)]
    pub toggle_toolbar: String,
    #[serde(default)]
    pub copy_location: String,
    #[serde(default)]
    pub paste_location: String,
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            restore: default_restore_chord(),
            save: default_save_chord(),
            toggle_toolbar: String::new(),
            copy_location: String::new(),
            paste_location: String::new(),
        }
    }
}

fn default_restore_chord() -> String {
    "Ctrl+Shift+Home".to_string()
}

fn default_save_chord() -> String {
    "Ctrl+Shift+End".to_string()
}

impl ShortcutsConfig {
    /// Configured chord text for a command, if any
    pub fn chord_for(&self, id: CommandId) -> Option<&str> {
        let chord = match id {
            CommandId::RestoreCameraPosition => &self.restore,
            CommandId::SaveCameraPosition => &self.save,
            CommandId::ToggleShowCameraPosWidget => &self.toggle_toolbar,
            CommandId::CopyCameraLocation => &self.copy_location,
            CommandId::PasteCameraLocation => &self.paste_location,
        };
        Some(chord.trim()).filter(|c| !c.is_empty())
    }
}

impl Config {
    /// Store path resolved against the directory holding the settings file
    pub fn store_path(&self, settings_path: &Path) -> PathBuf {
        let store = Path::new(&self.store.path);
        if store.is_absolute() {
            return store.to_path_buf();
        }
        match settings_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(store),
            _ => store.to_path_buf(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded camera position settings");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Settings file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Write configuration to file
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    save_config(path, &Config::default())
}

/// Settings bound to the file they came from
///
/// Changes made through the setters are flushed to disk immediately.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: Option<PathBuf>,
    config: Config,
}

impl SettingsFile {
    /// Load settings from `path`, creating them from defaults if missing
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = load_config(&path)?;
        Ok(Self {
            path: Some(path),
            config,
        })
    }

    /// Settings that are never written anywhere
    pub fn in_memory(config: Config) -> Self {
        Self { path: None, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn show_toolbar(&self) -> bool {
        self.config.toolbar.show
    }

    /// Persist the toolbar visibility flag
    pub fn set_show_toolbar(&mut self, show: bool) -> Result<(), ConfigError> {
        let previous = self.config.toolbar.show;
        self.config.toolbar.show = show;
        if let Err(e) = self.flush() {
            self.config.toolbar.show = previous;
            return Err(e);
        }
        debug!(show = show, "Camera position toolbar visibility changed");
        Ok(())
    }

    fn flush(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => save_config(path, &self.config),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("camerapos.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.behavior.restore_on_open);
        assert!(!config.toolbar.show);
        assert_eq!(config.shortcuts.restore, "Ctrl+Shift+Home");
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camerapos.toml");
        std::fs::write(
            &path,
            r#"
[behavior]
capture_on_close = false
include_fov = false

[shortcuts]
save = "Ctrl+K"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.behavior.restore_on_open);
        assert!(config.behavior.capture_on_save);
        assert!(!config.behavior.capture_on_close);
        assert!(!config.behavior.include_fov);
        assert_eq!(config.shortcuts.save, "Ctrl+K");
        assert_eq!(config.shortcuts.restore, "Ctrl+Shift+Home");
        assert_eq!(config.store.path, "./Saved/camerapos.json");
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camerapos.toml");
        std::fs::write(&path, "[behavior\nrestore_on_open = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_default_config_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camerapos.toml");
        save_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_toolbar_toggle_is_flushed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings").join("camerapos.toml");

        let mut settings = SettingsFile::load(&path).unwrap();
        assert!(!settings.show_toolbar());
        settings.set_show_toolbar(true).unwrap();

        let reloaded = SettingsFile::load(&path).unwrap();
        assert!(reloaded.show_toolbar());
    }

    #[test]
    fn test_store_path_resolution() {
        let config = Config::default();
        assert_eq!(
            config.store_path(Path::new("/project/camerapos.toml")),
            PathBuf::from("/project/./Saved/camerapos.json")
        );
        assert_eq!(
            config.store_path(Path::new("camerapos.toml")),
            PathBuf::from("./Saved/camerapos.json")
        );
    }

    #[test]
    fn test_chord_for_skips_blank_shortcuts() {
        let mut shortcuts = ShortcutsConfig::default();
        shortcuts.copy_location = "  ".to_string();
        assert_eq!(shortcuts.chord_for(CommandId::RestoreCameraPosition), Some("Ctrl+Shift+Home"));
        assert_eq!(shortcuts.chord_for(CommandId::CopyCameraLocation), None);
        assert_eq!(shortcuts.chord_for(CommandId::PasteCameraLocation), None);
    }

    #[test]
    fn test_unbound_default_chord_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camerapos.toml");

        let mut config = Config::default();
        config.shortcuts.restore = String::new();
        save_config(&path, &config).unwrap();

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.shortcuts.chord_for(CommandId::RestoreCameraPosition), None);
        assert_eq!(reloaded.shortcuts.chord_for(CommandId::SaveCameraPosition), Some("Ctrl+Shift+End"));
    }
}
