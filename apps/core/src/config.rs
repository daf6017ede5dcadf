use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::notify::Notifier;

pub const APP_DIR_NAME: &str = "quickrun";
pub const CONFIG_FILE_NAME: &str = "Launcher.json";
pub const HISTORY_FILE_NAME: &str = "History.json";
pub const MODULES_DIR_NAME: &str = "Modules";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
    Encode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
            Self::Encode(error) => write!(f, "encode error: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub enabled: bool,
    pub global: bool,
    pub priority: f64,
    /// One character; a space means "no prefix".
    pub prefix: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global: true,
            priority: 1.0,
            prefix: " ".to_string(),
        }
    }
}

impl ModuleConfig {
    pub fn new(enabled: bool, global: bool, priority: f64, prefix: char) -> Self {
        Self {
            enabled,
            global,
            priority,
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix_char(&self) -> char {
        self.prefix.chars().next().unwrap_or(' ')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistorySettings {
    /// Multiplier applied to every score once per elapsed calendar day.
    pub decay: f64,
    pub min_score: f64,
    pub increment: f64,
    pub history_score_weight: f64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            decay: 0.95,
            min_score: 0.1,
            increment: 1.0,
            history_score_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub max_visible_results: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_visible_results: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keyed by the camelCase form of each module's name.
    pub modules: BTreeMap<String, ModuleConfig>,
    pub history: HistorySettings,
    pub ui: UiConfig,
    #[serde(skip)]
    pub config_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_dir(stable_app_data_dir())
    }
}

impl AppConfig {
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self {
            modules: BTreeMap::new(),
            history: HistorySettings::default(),
            ui: UiConfig::default(),
            config_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.config_dir.join(HISTORY_FILE_NAME)
    }

    /// Per-module settings file, e.g. `Modules/Apps Search.json`.
    pub fn module_file_path(&self, module_name: &str) -> PathBuf {
        self.config_dir
            .join(MODULES_DIR_NAME)
            .join(format!("{module_name}.json"))
    }

    pub fn module(&self, module_name: &str) -> Option<&ModuleConfig> {
        self.modules.get(&to_camel_case(module_name))
    }

    /// Fills in a module entry without overwriting one the user configured.
    pub fn ensure_module(&mut self, module_name: &str, defaults: ModuleConfig) {
        self.modules
            .entry(to_camel_case(module_name))
            .or_insert(defaults);
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn load(config_dir: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let dir = config_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(stable_app_data_dir);
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(AppConfig::with_dir(dir));
    }

    let raw = std::fs::read_to_string(&path)?;
    let mut cfg: AppConfig = json5::from_str(&raw)
        .map_err(|e| ConfigError::Parse(format!("invalid config '{}': {e}", path.display())))?;
    cfg.config_dir = dir;
    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

/// Loads the application config, falling back to compiled-in defaults when
/// the file is unreadable or invalid. The failure goes to `notifier` and
/// never stops start-up.
pub fn load_or_default(config_dir: Option<&Path>, notifier: &dyn Notifier) -> AppConfig {
    match load(config_dir) {
        Ok(cfg) => cfg,
        Err(error) => {
            let dir = config_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(stable_app_data_dir);
            notifier.notify_error(&format!(
                "Failed to load configuration file {}: {error}",
                dir.join(CONFIG_FILE_NAME).display()
            ));
            AppConfig::with_dir(dir)
        }
    }
}

/// Reads a module's own settings file. A missing file is created from
/// `defaults`; an unreadable one is reported and `defaults` is used without
/// touching the file.
pub fn load_module_file<T, F>(
    cfg: &AppConfig,
    module_name: &str,
    defaults: F,
    notifier: &dyn Notifier,
) -> T
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let path = cfg.module_file_path(module_name);
    match std::fs::read_to_string(&path) {
        Ok(raw) => match json5::from_str::<T>(&raw) {
            Ok(value) => value,
            Err(error) => {
                notifier.notify_error(&format!(
                    "Failed to parse configuration file {}: {error}",
                    path.display()
                ));
                defaults()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            let value = defaults();
            if let Err(error) = write_module_file(&path, &value) {
                crate::logging::warn(&format!(
                    "could not write {}: {error}",
                    path.display()
                ));
            }
            value
        }
        Err(error) => {
            notifier.notify_error(&format!(
                "Failed to read configuration file {}: {error}",
                path.display()
            ));
            defaults()
        }
    }
}

fn write_module_file<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded =
        serde_json::to_string_pretty(value).map_err(|e| ConfigError::Encode(e.to_string()))?;
    std::fs::write(path, encoded)?;
    Ok(())
}

pub fn save(cfg: &AppConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(&cfg.config_dir)?;
    let encoded =
        serde_json::to_string_pretty(cfg).map_err(|e| ConfigError::Encode(e.to_string()))?;
    std::fs::write(cfg.config_path(), encoded)?;
    Ok(())
}

pub fn validate(cfg: &AppConfig) -> Result<(), String> {
    if cfg.ui.max_visible_results == 0 || cfg.ui.max_visible_results > 50 {
        return Err("ui.maxVisibleResults must be between 1 and 50".into());
    }

    let history = &cfg.history;
    if !(history.decay > 0.0 && history.decay <= 1.0) {
        return Err("history.decay must be in (0, 1]".into());
    }
    if !history.min_score.is_finite() || history.min_score < 0.0 {
        return Err("history.minScore must be a non-negative number".into());
    }
    if !history.increment.is_finite() || history.increment <= 0.0 {
        return Err("history.increment must be positive".into());
    }
    if !history.history_score_weight.is_finite() || history.history_score_weight < 0.0 {
        return Err("history.historyScoreWeight must be a non-negative number".into());
    }

    for (name, module) in &cfg.modules {
        if !module.priority.is_finite() || module.priority < 0.0 {
            return Err(format!("modules.{name}.priority must be a non-negative number"));
        }
        if module.prefix.chars().count() > 1 {
            return Err(format!("modules.{name}.prefix must be a single character"));
        }
    }

    Ok(())
}

/// `"Apps Search"` -> `"appsSearch"`.
pub fn to_camel_case(text: &str) -> String {
    let mut out = String::new();
    for (index, word) in text.split_whitespace().enumerate() {
        if index == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{to_camel_case, AppConfig, ModuleConfig};

    #[test]
    fn camel_cases_module_names() {
        assert_eq!(to_camel_case("Apps Search"), "appsSearch");
        assert_eq!(to_camel_case("  launcher   COMMANDS "), "launcherCommands");
        assert_eq!(to_camel_case("Calculator"), "calculator");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn empty_prefix_means_no_prefix() {
        let module = ModuleConfig {
            prefix: String::new(),
            ..Default::default()
        };
        assert_eq!(module.prefix_char(), ' ');
        assert_eq!(ModuleConfig::new(true, false, 1.0, '>').prefix_char(), '>');
    }

    #[test]
    fn ensure_module_keeps_user_values() {
        let mut cfg = AppConfig::with_dir(std::env::temp_dir());
        cfg.modules.insert(
            "appsSearch".to_string(),
            ModuleConfig::new(false, true, 2.0, ' '),
        );

        cfg.ensure_module("Apps Search", ModuleConfig::default());
        cfg.ensure_module("Terminal Profiles", ModuleConfig::new(true, true, 0.8, ' '));

        assert!(!cfg.module("Apps Search").unwrap().enabled);
        assert_eq!(cfg.module("Terminal Profiles").unwrap().priority, 0.8);
    }
}
