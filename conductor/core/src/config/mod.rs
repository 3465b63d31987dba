//! TOML Configuration File Support
//!
//! Stage settings live in a TOML file at `~/.config/hydrant/stage.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! Timing values are resolved per key: a value that does not parse keeps the
//! lower-priority value and logs a warning. Only an unreadable or malformed
//! file is an error.
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! fade = 900
//! hold = "2.5s"
//! type_speed = "60ms"
//!
//! [stars]
//! preset = "subtle"
//! count = 800
//! drift = false
//!
//! [motion]
//! preference = "reduced"
//!
//! [copy]
//! user_message = "hello?"
//! ai_response = "<strong>Hi.</strong> Welcome."
//! ```
//!
//! # Environment Variables
//!
//! - `HYDRANT_<KEY>` for every timing key (`HYDRANT_TYPE_SPEED=40ms`)
//! - `HYDRANT_STAR_PRESET`, `HYDRANT_STAR_COUNT`, `HYDRANT_STAR_DRIFT`
//! - `REDUCE_MOTION` (see [`accessibility`](crate::accessibility))

mod timing;

pub use timing::{parse_duration_str, parse_duration_value, TimingConfig, TimingUpdate};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accessibility::{parse_motion_preference, MotionPreference, REDUCE_MOTION_ENV};
use crate::stars::{StarFieldConfig, StarPreset};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Stars section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsToml {
    /// Named preset applied before the individual keys
    pub preset: Option<String>,
    /// Number of stars
    pub count: Option<usize>,
    /// Base drift duration in seconds
    pub base_duration: Option<f32>,
    /// Star diameter in pixels
    pub star_size: Option<f32>,
    /// Stream delay in seconds
    pub stream_delay: Option<f32>,
    /// Drift distance multiplier
    pub distance_multiplier: Option<f32>,
    /// Scale at the end of the drift
    pub end_scale: Option<f32>,
    /// Whether stars drift
    pub drift: Option<bool>,
}

/// Motion section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionToml {
    /// `full`, `reduced` or `none`
    pub preference: Option<MotionPreference>,
}

/// Copy section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyToml {
    /// The question typed into the chat
    pub user_message: Option<String>,
    /// The answer, with inline markup
    pub ai_response: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageToml {
    /// Timing values by key; each may be an integer, float or string
    pub timing: BTreeMap<String, toml::Value>,

    /// Star field section
    pub stars: StarsToml,

    /// Motion section
    pub motion: MotionToml,

    /// Copy section
    pub copy: CopyToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Static text shown in the chat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCopy {
    /// The question, typed character by character
    pub user_message: String,
    /// The answer, revealed over a fixed total duration
    pub ai_response: String,
}

impl Default for StageCopy {
    fn default() -> Self {
        Self {
            user_message: "hello, what is Silver Hydrant?".to_string(),
            ai_response: concat!(
                "<strong>Silver Hydrant</strong> is a team of consultants inspired by a ",
                "<strong>simple but powerful idea</strong>.<br><br>",
                "In a world flooded with noise, hype, and endless tools, we focus on ",
                "<strong>clarity</strong>. We spotlight the systems and decisions that ",
                "actually <strong>move the needle</strong>.<br><br>",
                "<strong>We do not add complexity.</strong><br>",
                "<strong>We remove it.</strong>"
            )
            .to_string(),
        }
    }
}

/// Everything a stage needs to run
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct StageConfig {
    /// Narrative durations
    pub timing: TimingConfig,

    /// Background star field
    pub stars: StarFieldConfig,

    /// Reduced-motion preference
    pub motion: MotionPreference,

    /// Chat text
    pub copy: StageCopy,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            stars: StarFieldConfig::default(),
            motion: MotionPreference::Full,
            copy: StageCopy::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StageConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Use a motion preference
    #[must_use]
    pub fn with_motion(mut self, motion: MotionPreference) -> Self {
        self.motion = motion;
        self
    }

    /// Use a timing table
    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Use star field settings
    #[must_use]
    pub fn with_stars(mut self, stars: StarFieldConfig) -> Self {
        self.stars = stars;
        self
    }

    /// Use chat copy
    #[must_use]
    pub fn with_copy(mut self, copy: StageCopy) -> Self {
        self.copy = copy;
        self
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/hydrant/stage.toml` or
/// `~/.config/hydrant/stage.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hydrant").join("stage.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read, parsed, or
/// names an unknown star preset. A missing config file is not an error.
pub fn load_config() -> Result<StageConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StageConfig, ConfigError> {
    let mut config = StageConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: StageToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Parse a TOML document into a configuration (no environment)
///
/// # Errors
///
/// Returns an error if the document is malformed or names an unknown preset.
pub fn parse_config(toml_content: &str) -> Result<StageConfig, ConfigError> {
    let mut config = StageConfig::default();
    let toml_config: StageToml = toml::from_str(toml_content)?;
    apply_toml_config(&mut config, &toml_config)?;
    config.source = ConfigSource::File;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StageConfig, toml: &StageToml) -> Result<(), ConfigError> {
    for (key, value) in &toml.timing {
        match config.timing.apply_value(key, value) {
            TimingUpdate::Applied => {}
            TimingUpdate::Invalid => {
                tracing::warn!(key = %key, value = %value, "Unparsable timing value, keeping default");
            }
            TimingUpdate::UnknownKey => {
                tracing::warn!(key = %key, "Unknown timing key ignored");
            }
        }
    }

    if let Some(ref name) = toml.stars.preset {
        let preset: StarPreset = name
            .parse()
            .map_err(|e: crate::stars::UnknownPreset| ConfigError::ValidationError(e.to_string()))?;
        config.stars = preset.config();
    }
    let stars = &toml.stars;
    if let Some(count) = stars.count {
        config.stars.count = count;
    }
    if let Some(value) = stars.base_duration {
        config.stars.base_duration = value;
    }
    if let Some(value) = stars.star_size {
        config.stars.star_size = value;
    }
    if let Some(value) = stars.stream_delay {
        config.stars.stream_delay = value;
    }
    if let Some(value) = stars.distance_multiplier {
        config.stars.distance_multiplier = value;
    }
    if let Some(value) = stars.end_scale {
        config.stars.end_scale = value;
    }
    if let Some(drift) = stars.drift {
        config.stars.drift = drift;
    }

    if let Some(preference) = toml.motion.preference {
        config.motion = preference;
    }

    if let Some(ref text) = toml.copy.user_message {
        config.copy.user_message = text.clone();
    }
    if let Some(ref text) = toml.copy.ai_response {
        config.copy.ai_response = text.clone();
    }

    Ok(())
}

/// Environment variable name for a timing key
#[must_use]
pub fn timing_env_var(key: &str) -> String {
    format!("HYDRANT_{}", key.to_uppercase())
}

/// Apply environment overrides through `lookup`
///
/// `lookup` returns the value of a variable if it is set. Loading passes
/// `std::env::var`; tests pass a map so they never touch the process
/// environment.
pub fn apply_env_overrides(config: &mut StageConfig, lookup: impl Fn(&str) -> Option<String>) {
    for key in TimingConfig::KEYS {
        let var = timing_env_var(key);
        if let Some(value) = lookup(&var) {
            match config.timing.apply_str(key, &value) {
                TimingUpdate::Applied => config.source = ConfigSource::Env,
                _ => tracing::warn!(var = %var, value = %value, "Unparsable timing override ignored"),
            }
        }
    }

    if let Some(name) = lookup("HYDRANT_STAR_PRESET") {
        match name.parse::<StarPreset>() {
            Ok(preset) => {
                config.stars = preset.config();
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring HYDRANT_STAR_PRESET"),
        }
    }
    if let Some(count) = lookup("HYDRANT_STAR_COUNT") {
        if let Ok(n) = count.trim().parse::<usize>() {
            config.stars.count = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(drift) = lookup("HYDRANT_STAR_DRIFT") {
        let drift = drift.trim();
        config.stars.drift = drift != "0" && !drift.eq_ignore_ascii_case("false");
        config.source = ConfigSource::Env;
    }

    if let Some(value) = lookup(REDUCE_MOTION_ENV) {
        config.motion = parse_motion_preference(&value);
        config.source = ConfigSource::Env;
    }
}
