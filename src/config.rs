//! Configuration loading for Pulse.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.pulse/config.toml`)
//! 3. User config (`~/.pulse/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. Every feature is enabled by default.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{PulseError, Result};
use crate::util::read_to_string_limited;

/// Main configuration struct for Pulse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Per-widget feature flags.
    pub features: FeaturesConfig,
    /// Trending list configuration.
    pub trending: TrendingConfig,
    /// Email prompt configuration.
    pub prompt: PromptConfig,
    /// Key-value store location.
    pub storage: StorageConfig,
}

/// Feature flags, one per gallery widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Share buttons and share-to-unlock rewards.
    pub social_share: bool,
    /// Email capture prompt.
    pub email_prompt: bool,
    /// Trending list.
    pub trending: bool,
    /// Membership badge.
    pub membership: bool,
    /// Achievements granted for sharing and subscribing.
    pub achievements: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            social_share: true,
            email_prompt: true,
            trending: true,
            membership: true,
            achievements: true,
        }
    }
}

/// Trending list configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrendingConfig {
    /// Number of items in the trending list.
    pub limit: usize,
}

/// Smallest useful trending list.
pub const MIN_TRENDING_LIMIT: usize = 1;

impl TrendingConfig {
    pub fn is_valid_limit(value: usize) -> bool {
        value >= MIN_TRENDING_LIMIT
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

/// Email prompt configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// Hours to wait before showing the prompt again.
    pub cooldown_hours: u32,
}

impl PromptConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cooldown_hours))
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { cooldown_hours: 24 }
    }
}

/// Key-value store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Store directory. Defaults to `$PULSE_HOME/store`.
    pub dir: Option<PathBuf>,
}

/// One config file as written. Only the fields it sets are `Some`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    features: FeaturesLayer,
    trending: TrendingLayer,
    prompt: PromptLayer,
    storage: StorageConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeaturesLayer {
    social_share: Option<bool>,
    email_prompt: Option<bool>,
    trending: Option<bool>,
    membership: Option<bool>,
    achievements: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrendingLayer {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PromptLayer {
    cooldown_hours: Option<u32>,
}

impl ConfigLayer {
    fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_limited(path)?;
        let layer: ConfigLayer =
            toml::from_str(&content).map_err(|e| PulseError::config(e.to_string()))?;

        if let Some(limit) = layer.trending.limit {
            if !TrendingConfig::is_valid_limit(limit) {
                return Err(PulseError::config(format!(
                    "trending.limit must be >= {}",
                    MIN_TRENDING_LIMIT
                )));
            }
        }
        Ok(layer)
    }
}

impl Config {
    /// Load configuration with full precedence chain, using the current
    /// directory for the project layer.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    fn load_user_config() -> Option<ConfigLayer> {
        let config_path = pulse_home()?.join("config.toml");
        Self::load_optional(&config_path)
    }

    fn load_project_config(cwd: &Path) -> Option<ConfigLayer> {
        Self::load_optional(&project_pulse_dir(cwd).join("config.toml"))
    }

    /// Load a config layer, warning when a file exists but is unusable.
    fn load_optional(path: &Path) -> Option<ConfigLayer> {
        if !path.exists() {
            return None;
        }
        match ConfigLayer::load(path) {
            Ok(layer) => Some(layer),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path, on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Ok(Config::default().merge(ConfigLayer::load(path)?))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        let flags: [(&str, &mut bool); 5] = [
            ("PULSE_ENABLE_SOCIAL_SHARE", &mut self.features.social_share),
            ("PULSE_ENABLE_EMAIL_PROMPT", &mut self.features.email_prompt),
            ("PULSE_ENABLE_TRENDING", &mut self.features.trending),
            ("PULSE_ENABLE_MEMBERSHIP", &mut self.features.membership),
            ("PULSE_ENABLE_ACHIEVEMENTS", &mut self.features.achievements),
        ];
        for (name, flag) in flags {
            if let Ok(val) = env::var(name) {
                match parse_bool(&val) {
                    Some(b) => *flag = b,
                    None => tracing::warn!(
                        var = name,
                        value = %val,
                        "expected true/false/1/0, keeping {}",
                        flag
                    ),
                }
            }
        }

        // PULSE_TRENDING_LIMIT
        if let Ok(val) = env::var("PULSE_TRENDING_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) if TrendingConfig::is_valid_limit(n) => self.trending.limit = n,
                _ => tracing::warn!(
                    value = %val,
                    "invalid PULSE_TRENDING_LIMIT, expected an integer >= {}, keeping {}",
                    MIN_TRENDING_LIMIT,
                    self.trending.limit
                ),
            }
        }

        // PULSE_PROMPT_COOLDOWN_HOURS
        if let Ok(val) = env::var("PULSE_PROMPT_COOLDOWN_HOURS") {
            match val.parse::<u32>() {
                Ok(n) => self.prompt.cooldown_hours = n,
                Err(_) => tracing::warn!(
                    value = %val,
                    "invalid PULSE_PROMPT_COOLDOWN_HOURS, expected a non-negative integer, keeping {}",
                    self.prompt.cooldown_hours
                ),
            }
        }

        // PULSE_STORE_DIR
        if let Ok(val) = env::var("PULSE_STORE_DIR") {
            if val.is_empty() {
                tracing::warn!("PULSE_STORE_DIR is empty, ignoring");
            } else {
                self.storage.dir = Some(PathBuf::from(val));
            }
        }
    }

    /// Apply a config layer on top of this one.
    ///
    /// Field by field: every value the layer sets wins, including a value
    /// equal to the default. Unset fields keep the lower layer's value.
    fn merge(mut self, layer: ConfigLayer) -> Self {
        let features = layer.features;
        let flags = [
            (features.social_share, &mut self.features.social_share),
            (features.email_prompt, &mut self.features.email_prompt),
            (features.trending, &mut self.features.trending),
            (features.membership, &mut self.features.membership),
            (features.achievements, &mut self.features.achievements),
        ];
        for (value, flag) in flags {
            if let Some(value) = value {
                *flag = value;
            }
        }

        if let Some(limit) = layer.trending.limit {
            self.trending.limit = limit;
        }

        if let Some(hours) = layer.prompt.cooldown_hours {
            self.prompt.cooldown_hours = hours;
        }

        if layer.storage.dir.is_some() {
            self.storage.dir = layer.storage.dir;
        }

        self
    }

    /// Resolve the store directory: `storage.dir` if set, otherwise
    /// `$PULSE_HOME/store`.
    pub fn store_dir(&self) -> Option<PathBuf> {
        self.storage
            .dir
            .clone()
            .or_else(|| pulse_home().map(|home| home.join("store")))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the Pulse home directory.
///
/// Checks the `PULSE_HOME` environment variable first, then falls back to
/// `~/.pulse`. An empty `PULSE_HOME` is ignored.
pub fn pulse_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("PULSE_HOME") {
        if home.is_empty() {
            tracing::warn!("PULSE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("PULSE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".pulse"))
}

/// The project-level `.pulse` directory.
pub fn project_pulse_dir(cwd: &Path) -> PathBuf {
    cwd.join(".pulse")
}
