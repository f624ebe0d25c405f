//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The catalog of blockable apps
//! - Block duration presets and the default preset
//! - Session clock tick interval
//! - Problem selection seed
//! - Whether default categories are seeded
//!
//! Configuration is stored at `~/.config/calculock/config.toml`. Session
//! and category state are never written here; they live for the process only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::block::{BlockDuration, DEFAULT_MINUTES, PRESET_MINUTES};
use crate::catalog::{AppCatalog, STANDARD_APPS};
use crate::category::CategoryStore;
use crate::error::{ConfigError, Result};
use crate::problem::ProblemBank;

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_apps")]
    pub apps: Vec<String>,
}

/// Block duration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default = "default_durations")]
    pub durations_min: Vec<u32>,
    #[serde(default = "default_duration_min")]
    pub default_duration_min: u32,
}

/// Session clock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Problem bank configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemsConfig {
    /// Fixed RNG seed (None = entropy).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Category configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesConfig {
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calculock/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub block: BlockConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub problems: ProblemsConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
}

// Default functions
fn default_apps() -> Vec<String> {
    STANDARD_APPS.iter().map(|app| app.to_string()).collect()
}
fn default_durations() -> Vec<u32> {
    PRESET_MINUTES.to_vec()
}
fn default_duration_min() -> u32 {
    DEFAULT_MINUTES
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            apps: default_apps(),
        }
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            durations_min: default_durations(),
            default_duration_min: default_duration_min(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match (existing, value) {
                    // Clears optional numbers (e.g. problems.seed); required
                    // fields reject null when the config is rebuilt.
                    (serde_json::Value::Number(_) | serde_json::Value::Null, "none" | "null") => {
                        serde_json::Value::Null
                    }
                    (serde_json::Value::Bool(_), _) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    (serde_json::Value::Number(_) | serde_json::Value::Null, _) => {
                        serde_json::Value::Number(
                            value
                                .parse::<u64>()
                                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                                .into(),
                        )
                    }
                    (serde_json::Value::Object(_) | serde_json::Value::Array(_), _) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key.
    ///
    /// The updated config is validated before it replaces `self`; on error
    /// `self` is unchanged. Call [`Config::save`] to persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject configurations the blocker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.catalog.apps.is_empty() {
            return Err(invalid("catalog.apps", "catalog must list at least one app"));
        }
        if self.catalog.apps.iter().any(|app| app.trim().is_empty()) {
            return Err(invalid("catalog.apps", "app names must not be blank"));
        }
        if AppCatalog::new(self.catalog.apps.iter().cloned()).len() != self.catalog.apps.len() {
            return Err(invalid("catalog.apps", "app names must be unique"));
        }
        if self.block.durations_min.is_empty() {
            return Err(invalid("block.durations_min", "at least one duration is required"));
        }
        if self.block.durations_min.contains(&0) {
            return Err(invalid("block.durations_min", "durations must be positive"));
        }
        if !self.block.durations_min.contains(&self.block.default_duration_min) {
            return Err(invalid(
                "block.default_duration_min",
                "default duration must be one of block.durations_min",
            ));
        }
        if self.clock.tick_interval_ms == 0 {
            return Err(invalid("clock.tick_interval_ms", "tick interval must be positive"));
        }
        Ok(())
    }

    pub fn catalog(&self) -> AppCatalog {
        AppCatalog::new(self.catalog.apps.iter().cloned())
    }

    pub fn durations(&self) -> Vec<BlockDuration> {
        self.block
            .durations_min
            .iter()
            .copied()
            .map(BlockDuration::from_minutes)
            .collect()
    }

    pub fn default_duration(&self) -> BlockDuration {
        BlockDuration::from_minutes(self.block.default_duration_min)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.clock.tick_interval_ms)
    }

    pub fn problem_bank(&self) -> ProblemBank {
        match self.problems.seed {
            Some(seed) => ProblemBank::standard_seeded(seed),
            None => ProblemBank::standard(),
        }
    }

    /// Initial categories, limited to apps present in the catalog.
    pub fn category_store(&self) -> CategoryStore {
        if !self.categories.seed_defaults {
            return CategoryStore::new();
        }
        let mut store = CategoryStore::with_defaults();
        store.restrict_to(&self.catalog());
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AppId;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.catalog.apps.len(), 15);
        assert_eq!(parsed.block.default_duration_min, 60);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[clock]\ntick_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.clock.tick_interval_ms, 250);
        assert_eq!(parsed.block.durations_min, vec![15, 30, 60, 120, 240, 480]);
        assert!(parsed.categories.seed_defaults);
        assert_eq!(parsed.problems.seed, None);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("block.default_duration_min").as_deref(), Some("60"));
        assert_eq!(cfg.get("problems.seed").as_deref(), Some("null"));
        assert_eq!(cfg.get("clock.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_updates_and_validates() {
        let mut cfg = Config::default();
        cfg.set("clock.tick_interval_ms", "500").unwrap();
        assert_eq!(cfg.clock.tick_interval_ms, 500);

        cfg.set("problems.seed", "42").unwrap();
        assert_eq!(cfg.problems.seed, Some(42));
        cfg.set("problems.seed", "none").unwrap();
        assert_eq!(cfg.problems.seed, None);
        cfg.set("problems.seed", "7").unwrap();
        cfg.set("problems.seed", "null").unwrap();
        assert_eq!(cfg.problems.seed, None);
        assert!(matches!(
            cfg.set("clock.tick_interval_ms", "none"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.clock.tick_interval_ms, 500);

        cfg.set("categories.seed_defaults", "false").unwrap();
        assert!(!cfg.categories.seed_defaults);

        cfg.set("block.durations_min", "[10, 20]").unwrap_err();
        assert_eq!(cfg.block.durations_min, vec![15, 30, 60, 120, 240, 480]);

        cfg.set("block.durations_min", "[10, 60]").unwrap();
        assert_eq!(cfg.durations().len(), 2);

        assert!(matches!(
            cfg.set("clock.tick_interval_ms", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("clock.speed", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("clock.tick_interval_ms", "fast"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_catalogs() {
        let mut cfg = Config::default();
        cfg.catalog.apps.clear();
        assert!(cfg.validate().is_err());

        cfg.catalog.apps = vec!["Games".into(), "Games".into()];
        assert!(cfg.validate().is_err());

        cfg.catalog.apps = vec!["Games".into(), "  ".into()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn category_store_follows_catalog() {
        let mut cfg = Config::default();
        cfg.catalog.apps = vec!["Games".into(), "Chrome".into()];
        let store = cfg.category_store();
        assert_eq!(store.members("Games"), Some(&[AppId::from("Games")][..]));
        assert_eq!(store.members("Browsers"), Some(&[AppId::from("Chrome")][..]));

        cfg.categories.seed_defaults = false;
        assert!(cfg.category_store().is_empty());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("block.default_duration_min", "30").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), changed);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "catalog = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
