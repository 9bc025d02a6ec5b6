//! Configuration management (`tasrec.toml`)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory. Missing or unparsable files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::extensions::BUILTIN_FILE_COMMANDS;

const CONFIG_FILE: &str = "tasrec.toml";

/// File extension given to bare TAS file names
pub const TAS_EXTENSION: &str = "mctas";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasConfig {
    /// Flavor used when saving without an explicit one (default: beta1)
    #[serde(default = "default_flavor")]
    pub default_flavor: String,
    /// File-command extensions enabled at startup (default: all built-ins)
    #[serde(default = "default_file_commands")]
    pub enabled_file_commands: Vec<String>,
    /// Write camera values as `~delta` where exact (default: false)
    #[serde(default)]
    pub relative_camera: bool,
    /// Largest per-axis deviation the desync monitor tolerates (default: 0)
    #[serde(default)]
    pub desync_tolerance: f64,
    /// Directory for relative TAS file names (default: `<data_dir>/tasfiles`)
    #[serde(default)]
    pub tas_dir: Option<PathBuf>,
}

fn default_flavor() -> String {
    "beta1".to_string()
}

fn default_file_commands() -> Vec<String> {
    BUILTIN_FILE_COMMANDS.iter().map(|s| s.to_string()).collect()
}

impl Default for TasConfig {
    fn default() -> Self {
        Self {
            default_flavor: default_flavor(),
            enabled_file_commands: default_file_commands(),
            relative_camera: false,
            desync_tolerance: 0.0,
            tas_dir: None,
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/tasrec`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "tasrec", "tasrec").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// On Linux: `~/.local/share/tasrec`
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "tasrec", "tasrec").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> TasConfig {
    config_dir()
        .map(|dir| load_from(&dir.join(CONFIG_FILE)))
        .unwrap_or_default()
}

/// Loads the configuration from an explicit file, with the same fallback
pub fn load_from(path: &Path) -> TasConfig {
    let Ok(content) = std::fs::read_to_string(path) else {
        return TasConfig::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unparsable config: {}", e);
            TasConfig::default()
        }
    }
}

/// Saves the configuration to the platform config directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &TasConfig) -> std::io::Result<()> {
    match config_dir() {
        Some(dir) => save_to(config, &dir.join(CONFIG_FILE)),
        None => Ok(()),
    }
}

pub fn save_to(config: &TasConfig, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

/// Directory that relative TAS file names resolve against
pub fn tas_dir(config: &TasConfig) -> PathBuf {
    config
        .tas_dir
        .clone()
        .or_else(|| data_dir().map(|dir| dir.join("tasfiles")))
        .unwrap_or_else(|| PathBuf::from("tasfiles"))
}

/// Resolve a user-supplied TAS file name.
///
/// Absolute paths are used as is. Relative ones are placed in [`tas_dir`],
/// and a name without extension gets `.mctas`.
pub fn resolve_path(config: &TasConfig, name: &str) -> PathBuf {
    let mut path = PathBuf::from(name);
    if path.extension().is_none() {
        path.set_extension(TAS_EXTENSION);
    }
    if path.is_absolute() {
        path
    } else {
        tas_dir(config).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TasConfig::default();
        assert_eq!(config.default_flavor, "beta1");
        assert_eq!(
            config.enabled_file_commands,
            vec!["desyncMonitor@v1", "label@v1", "options@v1"]
        );
        assert!(!config.relative_camera);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: TasConfig = toml::from_str("").unwrap();
        assert_eq!(config, TasConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml_str = r#"
relative_camera = true
enabled_file_commands = []
"#;
        let config: TasConfig = toml::from_str(toml_str).unwrap();
        assert!(config.relative_camera);
        assert!(config.enabled_file_commands.is_empty());
        assert_eq!(config.default_flavor, "beta1");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = TasConfig {
            desync_tolerance: 0.25,
            tas_dir: Some(dir.path().to_path_buf()),
            ..TasConfig::default()
        };
        save_to(&config, &path).unwrap();
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn test_load_garbage_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "relative_camera = \"yes\"").unwrap();
        assert_eq!(load_from(&path), TasConfig::default());
    }

    #[test]
    fn test_resolve_path() {
        let config = TasConfig {
            tas_dir: Some(PathBuf::from("/tmp/tas")),
            ..TasConfig::default()
        };
        assert_eq!(
            resolve_path(&config, "run1"),
            PathBuf::from("/tmp/tas/run1.mctas")
        );
        assert_eq!(
            resolve_path(&config, "run1.txt"),
            PathBuf::from("/tmp/tas/run1.txt")
        );
        assert_eq!(
            resolve_path(&config, "/abs/run2"),
            PathBuf::from("/abs/run2.mctas")
        );
    }
}
