//! Process-local configuration: ignore extensions/globs, commit delay,
//! and base directory, loaded from a TOML file with environment
//! overrides. Unlike the teacher's global → project → env layering this
//! crate has only one config file per process (source and target run as
//! separate processes, each with its own base directory) — env vars are
//! still the highest-priority override.

pub mod logging;

use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new(Config::load().unwrap_or_else(|e| {
        eprintln!("[msync-config] WARNING: failed to load config: {e}. Using defaults.");
        Config::default()
    }))
});

/// Read the global config.
pub fn config() -> std::sync::RwLockReadGuard<'static, Config> {
    CONFIG.read().unwrap()
}

/// Reload the global config from disk, reapplying env overrides.
pub fn reload() -> Result<(), ConfigError> {
    *CONFIG.write().unwrap() = Config::load()?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Default debounce before a batch of pending changes is committed.
pub const DEFAULT_COMMIT_DELAY_MS: u64 = 200;

/// Env var naming a config file to load instead of `./msync.toml`.
pub const ENV_CONFIG_PATH: &str = "MSYNC_CONFIG";
/// Env var overriding the commit delay, in milliseconds.
pub const ENV_COMMIT_DELAY_MS: &str = "MSYNC_COMMIT_DELAY_MS";
/// Env var overriding the base directory.
pub const ENV_BASE_DIR: &str = "MSYNC_BASE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_dir: PathBuf,
    pub extensions: Vec<String>,
    pub glob_ignore: Vec<String>,
    pub commit_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            extensions: msync_filters::DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            glob_ignore: msync_filters::DEFAULT_GLOB_IGNORE
                .iter()
                .map(|s| s.to_string())
                .collect(),
            commit_delay_ms: DEFAULT_COMMIT_DELAY_MS,
        }
    }
}

impl Config {
    /// Load from `./msync.toml` (or the path named by `MSYNC_CONFIG`),
    /// falling back to defaults if no file is present, then apply env
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("msync.toml"));
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            debug!(path = %path.display(), "loading config");
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_dir) = std::env::var(ENV_BASE_DIR) {
            self.base_dir = PathBuf::from(base_dir);
        }
        if let Ok(delay) = std::env::var(ENV_COMMIT_DELAY_MS) {
            if let Ok(ms) = delay.parse() {
                self.commit_delay_ms = ms;
            }
        }
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    pub fn ignore_policy(&self) -> Result<msync_filters::IgnorePolicy, msync_filters::FilterError> {
        msync_filters::IgnorePolicy::new(&self.extensions, &self.glob_ignore)
    }
}
