// Configuration management for the B-Sides engine
// Handles loading/saving settings, with sensible defaults when config is missing

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Weights may drift this far from 1.0 before we reject them (float noise from TOML)
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Longest decay/window we accept, about a century
pub const MAX_WINDOW_DAYS: f64 = 36_500.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,
    #[error("config I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("scoring weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_count: usize,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Blend of the four personalized sub-scores. Kept summing to 1 so the final
/// score stays in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub recency: f64,
    pub popularity: f64,
    pub user_preference: f64,
    pub freshness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub overplay_threshold: usize,  // plays before an unliked track is rested
    pub artist_cap_ratio: f64,      // share of `count` one artist may take
    pub candidate_multiplier: usize, // diverse pool size as a multiple of `count`
    pub deterministic_ratio: f64,   // head of the list kept in score order
    pub pick_window: usize,         // random picks come from this many top candidates
    pub recency_horizon_days: f64,
    pub trending_window_days: f64,
    pub trending_recency_floor: f64,
    pub new_release_window_days: f64,
    pub tracks_per_genre: usize,
    pub strict_artist_cap: bool, // skip the cap-ignoring top-up pass
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub filter: String,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency: 0.3,
            popularity: 0.2,
            user_preference: 0.4,
            freshness: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.recency + self.popularity + self.user_preference + self.freshness
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts = [
            ("weights.recency", self.recency),
            ("weights.popularity", self.popularity),
            ("weights.user_preference", self.user_preference),
            ("weights.freshness", self.freshness),
        ];
        for (field, value) in parts {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne(sum));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overplay_threshold: 5,
            artist_cap_ratio: 0.3,
            candidate_multiplier: 2,
            deterministic_ratio: 0.5,
            pick_window: 10,
            recency_horizon_days: 365.0,
            trending_window_days: 30.0,
            trending_recency_floor: 0.5,
            new_release_window_days: 30.0,
            tracks_per_genre: 2,
            strict_artist_cap: false,
            weights: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        for (field, value) in [
            ("artist_cap_ratio", self.artist_cap_ratio),
            ("deterministic_ratio", self.deterministic_ratio),
            ("trending_recency_floor", self.trending_recency_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within [0, 1], got {}", value),
                });
            }
        }

        for (field, value) in [
            ("recency_horizon_days", self.recency_horizon_days),
            ("trending_window_days", self.trending_window_days),
            ("new_release_window_days", self.new_release_window_days),
        ] {
            if !value.is_finite() || value <= 0.0 || value > MAX_WINDOW_DAYS {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!(
                        "must be between 0 and {} days, got {}",
                        MAX_WINDOW_DAYS, value
                    ),
                });
            }
        }

        for (field, value) in [
            ("overplay_threshold", self.overplay_threshold),
            ("candidate_multiplier", self.candidate_multiplier),
            ("pick_window", self.pick_window),
            ("tracks_per_genre", self.tracks_per_genre),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            filter: "info,bsides=debug".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_count: 10,
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from the user config dir, writing defaults on first run
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.engine.validate()?;
        Ok(config)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("bsides");

        Ok(config_dir.join("config.toml"))
    }
}
