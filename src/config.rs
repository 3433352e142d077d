//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/wmpick/config.json`
//! or from the path given with `--config <path>`.  The top-level schema uses
//! a `"menu"` key so the file can be extended with additional sections later
//! without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "menu": {
//!     "provider": "rofi",
//!     "title": "wmpick",
//!     "terminal_priority": 0,
//!     "dmenu": { "program": "dmenu", "priority": 20, "args": ["-i"] },
//!     "rofi": { "program": "rofi", "priority": 30 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Selection backend settings.
    #[serde(default)]
    pub menu: MenuConfig,
}

/// Selection backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Registered provider to use instead of the highest-priority one.
    pub provider: Option<String>,
    /// Shown in front of every prompt.
    pub title: String,
    /// Priority of the always-present terminal provider.
    pub terminal_priority: i32,
    pub dmenu: PickerConfig,
    pub rofi: PickerConfig,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            provider: None,
            title: "wmpick".into(),
            terminal_priority: 0,
            dmenu: PickerConfig::default(),
            rofi: PickerConfig::default(),
        }
    }
}

/// Settings for one external picker.
///
/// Unset fields take the picker's built-in defaults (its usual binary name
/// and priority).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Program name looked up on `$PATH`, or an absolute path.
    pub program: Option<String>,
    pub priority: Option<i32>,
    /// Extra arguments inserted before the picker's own arguments.
    pub args: Vec<String>,
    /// Skip this picker even when it is installed.
    pub disabled: bool,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "menu": {
                "provider": "dmenu",
                "title": "i3",
                "terminal_priority": 5,
                "dmenu": { "program": "/opt/dmenu", "priority": 50, "args": ["-i"] },
                "rofi": { "disabled": true }
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.menu.provider.as_deref(), Some("dmenu"));
        assert_eq!(cfg.menu.title, "i3");
        assert_eq!(cfg.menu.terminal_priority, 5);
        assert_eq!(cfg.menu.dmenu.program.as_deref(), Some("/opt/dmenu"));
        assert_eq!(cfg.menu.dmenu.priority, Some(50));
        assert_eq!(cfg.menu.dmenu.args, ["-i"]);
        assert!(cfg.menu.rofi.disabled);
        assert_eq!(cfg.menu.rofi.program, None);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let d = MenuConfig::default();
        assert_eq!(cfg.menu.provider, d.provider);
        assert_eq!(cfg.menu.title, "wmpick");
        assert_eq!(cfg.menu.terminal_priority, 0);
        assert_eq!(cfg.menu.dmenu, PickerConfig::default());
        assert_eq!(cfg.menu.rofi, PickerConfig::default());
    }

    #[test]
    fn deserialize_partial_menu() {
        let json = r#"{ "menu": { "rofi": { "priority": 1 } } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.menu.rofi.priority, Some(1));
        assert!(!cfg.menu.rofi.disabled);
        assert_eq!(cfg.menu.title, "wmpick");
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "menu": {}, "future_section": { "key": 42 } }"#;
        // Should not fail, unknown keys are silently ignored.
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_missing_file_is_error() {
        let err = Config::load(Path::new("/nonexistent/wmpick/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("wmpick-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "menu": { "provider": "terminal" } }"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.menu.provider.as_deref(), Some("terminal"));
        let _ = std::fs::remove_file(&path);
    }
}
