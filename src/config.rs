//! Engine configuration.
//!
//! Tuning constants live here as named defaults; [`EngineConfig`] bundles them
//! so a deployment can override any of them from `config.toml` or the
//! environment without touching the scheduling code.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::clock::DayBoundary;

// ==================== SM-2 Configuration ====================

/// Easiness factor given to a card that has never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lower bound for the easiness factor; failures never push it below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Upper bound that success bonuses stop at
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// Added to the easiness factor on a successful review
pub const EASE_BONUS: f64 = 0.1;

/// Subtracted from the easiness factor on a failed review
pub const EASE_PENALTY: f64 = 0.2;

/// Longest interval a card can be scheduled out (100 years)
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

// ==================== Deck Configuration ====================

/// Default daily cap on never-seen cards per deck
pub const DEFAULT_MAX_NEW_CARDS: i64 = 20;

/// Default daily cap on lapsed and mature cards per deck
pub const DEFAULT_MAX_REVIEW_CARDS: i64 = 100;

// ==================== Progress Configuration ====================

/// XP needed to go from level 1 to level 2
pub const BASE_XP_TO_LEVEL_UP: i64 = 100;

/// How much the XP requirement grows with every level gained
pub const LEVEL_XP_INCREMENT: i64 = 100;

/// Environment variable overriding the calendar-day offset
pub const UTC_OFFSET_ENV: &str = "VIETCARD_UTC_OFFSET_MINUTES";

/// Default config file consulted by [`load_engine_config`]
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid engine config: {0}")]
    Invalid(String),
}

/// SM-2 tuning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Sm2Params {
    pub default_ease_factor: f64,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub ease_bonus: f64,
    pub ease_penalty: f64,
    pub max_interval_days: i64,
}

impl Default for Sm2Params {
    fn default() -> Self {
        Self {
            default_ease_factor: DEFAULT_EASE_FACTOR,
            min_ease_factor: MIN_EASE_FACTOR,
            max_ease_factor: MAX_EASE_FACTOR,
            ease_bonus: EASE_BONUS,
            ease_penalty: EASE_PENALTY,
            max_interval_days: MAX_INTERVAL_DAYS,
        }
    }
}

/// Caps given to freshly created decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeckDefaults {
    pub max_new_cards: i64,
    pub max_review_cards: i64,
}

impl Default for DeckDefaults {
    fn default() -> Self {
        Self {
            max_new_cards: DEFAULT_MAX_NEW_CARDS,
            max_review_cards: DEFAULT_MAX_REVIEW_CARDS,
        }
    }
}

/// Leveling curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProgressParams {
    pub base_xp_to_level_up: i64,
    pub level_xp_increment: i64,
}

impl Default for ProgressParams {
    fn default() -> Self {
        Self {
            base_xp_to_level_up: BASE_XP_TO_LEVEL_UP,
            level_xp_increment: LEVEL_XP_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DayConfig {
    /// Minutes east of UTC at which calendar days start
    pub utc_offset_minutes: i32,
}

/// Order in which due candidates are considered for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrder {
    /// Never-reviewed cards first, then by due date ascending; ties keep input order
    #[default]
    DueFirst,
    /// Exactly the order the caller supplied
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sm2: Sm2Params,
    pub deck: DeckDefaults,
    pub progress: ProgressParams,
    pub day: DayConfig,
    pub session_order: SessionOrder,
}

/// Top-level shape of config.toml; only the `[engine]` table is ours
#[derive(Debug, Deserialize)]
struct ConfigFile {
    engine: Option<EngineConfig>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sm2 = &self.sm2;
        if sm2.min_ease_factor.is_nan() || sm2.min_ease_factor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_ease_factor must be positive, got {}",
                sm2.min_ease_factor
            )));
        }
        if sm2.default_ease_factor < sm2.min_ease_factor {
            return Err(ConfigError::Invalid(format!(
                "default_ease_factor {} is below min_ease_factor {}",
                sm2.default_ease_factor, sm2.min_ease_factor
            )));
        }
        if sm2.max_ease_factor < sm2.default_ease_factor {
            return Err(ConfigError::Invalid(format!(
                "max_ease_factor {} is below default_ease_factor {}",
                sm2.max_ease_factor, sm2.default_ease_factor
            )));
        }
        if sm2.ease_bonus < 0.0 || sm2.ease_penalty < 0.0 {
            return Err(ConfigError::Invalid(
                "ease_bonus and ease_penalty must not be negative".to_string(),
            ));
        }
        if !(1..=MAX_INTERVAL_DAYS).contains(&sm2.max_interval_days) {
            return Err(ConfigError::Invalid(format!(
                "max_interval_days must be between 1 and {}, got {}",
                MAX_INTERVAL_DAYS, sm2.max_interval_days
            )));
        }
        if self.deck.max_new_cards < 0 || self.deck.max_review_cards < 0 {
            return Err(ConfigError::Invalid(
                "deck caps must not be negative".to_string(),
            ));
        }
        if self.progress.base_xp_to_level_up <= 0 || self.progress.level_xp_increment <= 0 {
            return Err(ConfigError::Invalid(
                "base_xp_to_level_up and level_xp_increment must be positive".to_string(),
            ));
        }
        if DayBoundary::from_offset_minutes(self.day.utc_offset_minutes).is_none() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes {} is outside ±24h",
                self.day.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Calendar-day boundary for this configuration (UTC if the offset is invalid)
    pub fn day_boundary(&self) -> DayBoundary {
        DayBoundary::from_offset_minutes(self.day.utc_offset_minutes).unwrap_or_else(|| {
            tracing::warn!(
                "Ignoring out-of-range utc_offset_minutes {}, using UTC",
                self.day.utc_offset_minutes
            );
            DayBoundary::utc()
        })
    }
}

/// Parse and validate the `[engine]` table of a TOML document.
/// A document without the table yields the defaults.
pub fn parse_engine_config(contents: &str) -> Result<EngineConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(contents)?;
    let config = file.engine.unwrap_or_default();
    config.validate()?;
    Ok(config)
}

/// Load and validate a specific config file
pub fn load_engine_config_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_engine_config(&contents)
}

/// Load engine config with priority: config.toml > .env / environment > default
pub fn load_engine_config() -> EngineConfig {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        match load_engine_config_from(path) {
            Ok(config) => {
                tracing::info!("Using engine config from {}", CONFIG_FILE);
                return config;
            }
            Err(e) => tracing::warn!("Ignoring {}: {}", CONFIG_FILE, e),
        }
    }

    // Priority 2: environment
    let mut config = EngineConfig::default();
    if let Ok(raw) = std::env::var(UTC_OFFSET_ENV) {
        match raw.trim().parse::<i32>() {
            Ok(minutes) if DayBoundary::from_offset_minutes(minutes).is_some() => {
                tracing::info!("Using day offset from {} env: {} minutes", UTC_OFFSET_ENV, minutes);
                config.day.utc_offset_minutes = minutes;
                return config;
            }
            _ => tracing::warn!("Ignoring invalid {}={:?}", UTC_OFFSET_ENV, raw),
        }
    }

    tracing::info!("Using default engine config");
    config
}
