//! Configuration system: TOML file + env var overrides + first-run defaults.
//!
//! The config is loaded once at process start and handed to the scanner,
//! pointer tracker and selection driver. Nothing reads it through a global.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::core::errors::{KcmError, Result};
use crate::core::paths::{self, expand_home};

/// Full kcm configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Symlink that downstream tools read as their kubeconfig.
    pub pointer_path: PathBuf,
    /// Directories scanned for kubeconfig files.
    pub watch: Vec<WatchSpec>,
    pub logging: LoggingConfig,
    /// File this config was loaded from (not serialized).
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// One directory to scan and how to interpret the file names found there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchSpec {
    pub dir: PathBuf,
    /// Only files whose name ends with this suffix are considered.
    pub suffix: String,
    /// chrono format string matched against the whole file name. A missing
    /// or empty value means names carry no timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_pattern"
    )]
    pub pattern: Option<String>,
    /// Minutes the file stays valid after its timestamp (0 = never expires).
    pub lifespan_minutes: u32,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub jsonl_log: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pointer_path: PathBuf::from("$HOME/.cluster"),
            watch: vec![WatchSpec::default()],
            logging: LoggingConfig::default(),
            config_file: PathBuf::new(),
        }
    }
}

impl Default for WatchSpec {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("$HOME/Downloads"),
            suffix: ".kubeconfig.txt".to_string(),
            pattern: Some("cluster-bot-%Y-%m-%d-%H%M%S.kubeconfig.txt".to_string()),
            lifespan_minutes: 150,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_log: PathBuf::from("$HOME/.local/share/kcm/activity.jsonl"),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path under `home`.
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(".config").join("kcm").join("config.toml")
    }

    /// Load the config, creating it with defaults on first run.
    ///
    /// Resolves `$HOME` from the environment; failing to do so is a bootstrap
    /// error.
    pub fn ensure(path: Option<&Path>) -> Result<Self> {
        let home = paths::home_dir()?;
        Self::ensure_with_home(path, &home)
    }

    /// Same as [`Config::ensure`] with an explicit home directory.
    pub fn ensure_with_home(path: Option<&Path>, home: &Path) -> Result<Self> {
        let path_buf = path.map_or_else(|| Self::default_path(home), Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            Self::read_file(&path_buf)?
        } else {
            let defaults = Self::defaults_for(home);
            defaults.write_to(&path_buf)?;
            defaults
        };

        cfg.config_file = path_buf;
        cfg.expand_home(home);
        cfg.apply_env_overrides_from(env_var)?;
        cfg.expand_home(home);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Built-in defaults with `$HOME` substituted.
    #[must_use]
    pub fn defaults_for(home: &Path) -> Self {
        let mut cfg = Self::default();
        cfg.expand_home(home);
        cfg
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this config to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| KcmError::io(parent, source))?;
        }
        let raw = self.to_toml_string()?;
        fs::write(path, raw).map_err(|source| KcmError::io(path, source))
    }

    /// Replace `$HOME` placeholders in every configured path.
    pub fn expand_home(&mut self, home: &Path) {
        self.pointer_path = expand_home(&self.pointer_path, home);
        self.logging.jsonl_log = expand_home(&self.logging.jsonl_log, home);
        for spec in &mut self.watch {
            spec.dir = expand_home(&spec.dir, home);
        }
    }

    /// Deterministic hash of the effective config for diagnostics.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn read_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| KcmError::io(path, source))?;
        Ok(toml::from_str(&raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("KCM_POINTER_PATH") {
            self.pointer_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("KCM_LOG_ENABLED") {
            self.logging.enabled = parse_env_bool("KCM_LOG_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("KCM_JSONL_LOG") {
            self.logging.jsonl_log = PathBuf::from(raw);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.pointer_path.as_os_str().is_empty() {
            return Err(KcmError::InvalidConfig {
                details: "pointer_path must not be empty".to_string(),
            });
        }
        if self.watch.is_empty() {
            return Err(KcmError::InvalidConfig {
                details: "at least one [[watch]] entry is required".to_string(),
            });
        }
        for (idx, spec) in self.watch.iter().enumerate() {
            spec.validate()
                .map_err(|details| KcmError::InvalidConfig {
                    details: format!("watch[{idx}] ({}): {details}", spec.dir.display()),
                })?;
        }
        if self.logging.enabled && self.logging.max_size_bytes == 0 {
            return Err(KcmError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

impl WatchSpec {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.dir.as_os_str().is_empty() {
            return Err("dir must not be empty".to_string());
        }
        if self.suffix.is_empty() {
            return Err("suffix must not be empty".to_string());
        }
        if let Some(pattern) = &self.pattern {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(format!("pattern {pattern:?} is not a valid strftime format"));
            }
            // A name must pass the suffix filter before the pattern is tried.
            if !pattern.ends_with(&self.suffix) {
                return Err(format!(
                    "pattern {pattern:?} must end with suffix {:?}",
                    self.suffix
                ));
            }
        }
        Ok(())
    }
}

fn deserialize_pattern<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|pattern| !pattern.trim().is_empty()))
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| KcmError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
