use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKDECK_CONFIG_PATH";
pub const API_URL_ENV_VAR: &str = "TASKDECK_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name) {
        Some(ref name) if name == "noir" => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "solarized" => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        return Some("default".into());
    }

    match trimmed {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Where mutation outcomes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    #[default]
    Console,
    Desktop,
    Off,
}

impl FromStr for NotificationMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "console" | "stderr" => Ok(Self::Console),
            "desktop" => Ok(Self::Desktop),
            "off" | "none" | "quiet" => Ok(Self::Off),
            other => Err(format!(
                "unknown notification mode '{other}' (expected console, desktop or off)"
            )),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub notifications: NotificationMode,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub theme: Option<String>,
    pub notifications: Option<NotificationMode>,
    pub log_level: Option<String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskdeck")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskdeck")
            .join(CONFIG_FILE_NAME))
    }
}

/// Loads the config file, falling back to defaults, then applies
/// `TASKDECK_API_URL` on top of it.
pub fn load_config_with_fallback() -> ConfigLoad {
    let mut load = match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    };
    load.config = apply_env(load.config, std::env::var(API_URL_ENV_VAR).ok());
    load
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_theme(config))
}

fn apply_env(mut config: Config, api_url: Option<String>) -> Config {
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        config.api_url = Some(url.trim().to_string());
    }
    config
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(url) = overrides.api_url.as_ref() {
        merged.api_url = Some(url.clone());
    }

    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    if let Some(mode) = overrides.notifications {
        merged.notifications = mode;
    }

    if let Some(level) = overrides.log_level.as_ref() {
        merged.log_level = Some(level.clone());
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_API_URL, NotificationMode, apply_env,
        canonical_theme_name, load_config_from_path, load_config_with_fallback_from_path,
        merge_overrides, palette_for_theme,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
        assert_eq!(result.config.api_url(), DEFAULT_API_URL);
        assert_eq!(result.config.log_level(), "warn");
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn load_config_reads_valid_file() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "api_url": "http://tasks.internal:9000/api",
            "theme": "Dark Mode",
            "notifications": "desktop"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.api_url(), "http://tasks.internal:9000/api");
        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(loaded.notifications, NotificationMode::Desktop);
    }

    #[test]
    fn env_api_url_replaces_file_value() {
        let base = Config {
            api_url: Some("http://file/api".into()),
            ..Config::default()
        };

        let config = apply_env(base.clone(), Some(" http://env/api ".into()));
        assert_eq!(config.api_url(), "http://env/api");

        let untouched = apply_env(base, Some("   ".into()));
        assert_eq!(untouched.api_url(), "http://file/api");
    }

    #[test]
    fn merge_overrides_updates_fields() {
        let base = Config {
            api_url: Some("http://file/api".into()),
            theme: Some("light".into()),
            notifications: NotificationMode::Console,
            log_level: None,
        };

        let overrides = ConfigOverrides {
            api_url: Some("http://override/api".into()),
            theme: Some("noir".into()),
            notifications: Some(NotificationMode::Off),
            log_level: Some("debug".into()),
        };

        let merged = merge_overrides(&base, &overrides);
        assert_eq!(merged.api_url(), "http://override/api");
        assert_eq!(merged.theme.as_deref(), Some("noir"));
        assert_eq!(merged.notifications, NotificationMode::Off);
        assert_eq!(merged.log_level(), "debug");

        assert_eq!(base.theme.as_deref(), Some("light"));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            theme: Some("light".into()),
            ..Config::default()
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), Some("default".into()));
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("Solarized"), Some("solarized".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name("  "), Some("default".into()));
    }

    #[test]
    fn palette_for_theme_returns_palette() {
        let default_palette = palette_for_theme(Some("vanilla"));
        assert!(default_palette.accent.is_empty());
        assert_eq!(default_palette.accentize("To Do"), "To Do");

        let noir_palette = palette_for_theme(Some("noir"));
        assert_eq!(noir_palette.accent, "\x1b[38;5;208m");
        assert_eq!(noir_palette.accentize("x"), "\x1b[38;5;208mx\x1b[0m");

        let unknown_palette = palette_for_theme(Some("oceanic"));
        assert!(unknown_palette.accent.is_empty());
    }

    #[test]
    fn notification_mode_parses_aliases() {
        assert_eq!("Desktop".parse::<NotificationMode>(), Ok(NotificationMode::Desktop));
        assert_eq!("none".parse::<NotificationMode>(), Ok(NotificationMode::Off));
        assert!("toast".parse::<NotificationMode>().is_err());
    }
}
