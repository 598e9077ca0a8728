use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum notifications kept in the inbox
pub const MAX_NOTIFICATIONS: usize = 100;

/// Maximum notifications written to the storage document
pub const MAX_PERSISTED_NOTIFICATIONS: usize = 50;

/// Maximum toasts visible at once
pub const MAX_TOASTS: usize = 5;

/// Auto-close delay for toasts that don't specify one (milliseconds)
pub const DEFAULT_TOAST_MS: u64 = 5000;

/// Fixed name of the storage document
pub const STORAGE_NAME: &str = "notification-storage";

/// Application configuration loaded from file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeraldConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Toast auto-close delays
    #[serde(default)]
    pub toasts: ToastConfig,

    /// Desktop delivery configuration
    #[serde(default)]
    pub desktop: DesktopConfig,
}

/// Where the notification document lives
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the storage file (default: data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved storage file path
    pub fn resolve(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_storage_path)
    }
}

fn default_storage_path() -> PathBuf {
    let file = format!("{STORAGE_NAME}.json");
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/herald").join(&file),
        |dirs| dirs.data_dir().join("herald").join(&file),
    )
}

/// Per-severity default auto-close delays for the show_* wrappers (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,

    #[serde(default = "default_info_ms")]
    pub info_ms: u64,

    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,

    #[serde(default = "default_error_ms")]
    pub error_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            success_ms: default_success_ms(),
            info_ms: default_info_ms(),
            warning_ms: default_warning_ms(),
            error_ms: default_error_ms(),
        }
    }
}

fn default_success_ms() -> u64 {
    3000
}

fn default_info_ms() -> u64 {
    4000
}

fn default_warning_ms() -> u64 {
    DEFAULT_TOAST_MS
}

fn default_error_ms() -> u64 {
    DEFAULT_TOAST_MS
}

/// Desktop notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopConfig {
    /// Application name shown by the notification server
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Icon name or path used when a notification has none
    #[serde(default)]
    pub icon: Option<String>,

    /// Command run when a notification is clicked, to raise the app window
    #[serde(default)]
    pub focus_command: Vec<String>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            icon: None,
            focus_command: Vec::new(),
        }
    }
}

fn default_app_name() -> String {
    "Herald".to_string()
}

impl HeraldConfig {
    /// Load configuration from default path (~/.config/herald/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from("~/.config/herald/config.toml"),
            |dirs| dirs.config_dir().join("herald").join("config.toml"),
        )
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Generate example configuration file content
    pub fn example() -> String {
        r#"# Herald Configuration
# Place this file at ~/.config/herald/config.toml

[storage]
# Storage document (default: ~/.local/share/herald/notification-storage.json)
# path = "/var/lib/herald/notification-storage.json"

[toasts]
# Default auto-close delays in milliseconds
success_ms = 3000
info_ms = 4000
warning_ms = 5000
error_ms = 5000

[desktop]
app_name = "Herald"
# icon = "dialog-information"

# Run when a desktop notification is clicked
# focus_command = ["wmctrl", "-a", "Herald"]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HeraldConfig::load_from_path(dir.path().join("nope.toml"));

        assert_eq!(config.toasts.error_ms, 5000);
        assert_eq!(config.toasts.success_ms, 3000);
        assert_eq!(config.desktop.app_name, "Herald");
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config: HeraldConfig = toml::from_str(&HeraldConfig::example()).unwrap();
        assert_eq!(config.toasts.info_ms, 4000);
        assert_eq!(config.toasts.warning_ms, 5000);
        assert!(config.desktop.focus_command.is_empty());
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[toasts]\nsuccess_ms = 1500\n\n[desktop]\nfocus_command = [\"wmctrl\", \"-a\", \"Shop\"]"
        )
        .unwrap();

        let config = HeraldConfig::load_from_path(file.path().to_path_buf());

        assert_eq!(config.toasts.success_ms, 1500);
        assert_eq!(config.toasts.error_ms, 5000);
        assert_eq!(config.desktop.focus_command, vec!["wmctrl", "-a", "Shop"]);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[toasts\nsuccess_ms = ").unwrap();

        let config = HeraldConfig::load_from_path(file.path().to_path_buf());
        assert_eq!(config.toasts.success_ms, 3000);
    }

    #[test]
    fn test_storage_override() {
        let storage = StorageConfig {
            path: Some(PathBuf::from("/srv/herald/state.json")),
        };
        assert_eq!(storage.resolve(), PathBuf::from("/srv/herald/state.json"));
        assert!(StorageConfig::default()
            .resolve()
            .ends_with("notification-storage.json"));
    }
}
