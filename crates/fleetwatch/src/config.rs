//! Configuration management for fleetwatch.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::SortKey;
use crate::table::FieldMappingEntry;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fleetwatch";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fleet.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETWATCH_`)
/// 2. TOML config file at `~/.config/fleetwatch/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Status thresholds.
    pub status: StatusConfig,
    /// List view defaults.
    pub view: ViewConfig,
    /// Override edit policy.
    pub overrides: OverrideConfig,
    /// Vessel list cache.
    pub cache: CacheConfig,
    /// Session identity.
    pub session: SessionConfig,
    /// Table columns, keyed by field id.
    pub columns: BTreeMap<String, FieldMappingEntry>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fleetwatch/fleet.db`
    pub database_path: Option<PathBuf>,
}

/// Thresholds for the status engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Age in years at which a vessel turns yellow.
    pub age_yellow_years: u32,
    /// Age in years at which a vessel turns red.
    pub age_red_years: u32,
    /// An inspection at most this many months old is green.
    pub inspection_green_months: u32,
    /// An inspection at most this many months old is yellow.
    pub inspection_yellow_months: u32,
}

/// Defaults for the vessel list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Date field to sort by.
    pub sort_key: String,
    /// Sort newest first.
    pub descending: bool,
    /// Show overdue vessels before the rest.
    pub overdue_first: bool,
    /// Rows per page.
    pub page_size: usize,
    /// Hide vessels whose ETD is more than this many days past.
    /// Set to 0 to show all.
    pub hide_departed_after_days: u32,
}

/// Policy for schedule override edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    /// Reject edits that leave ETB before ETA instead of only warning.
    pub block_invalid: bool,
}

/// Vessel list cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a fetched vessel list stays fresh. 0 disables caching.
    pub ttl_seconds: u64,
}

/// Session identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// User id that owns flags.
    pub user_id: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            age_yellow_years: 5,
            age_red_years: 10,
            inspection_green_months: 3,
            inspection_yellow_months: 6,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort_key: "eta".to_string(),
            descending: false,
            overdue_first: true,
            page_size: 25,
            hide_departed_after_days: 0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLEETWATCH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.status.age_yellow_years > self.status.age_red_years {
            return Err(Error::ConfigValidation {
                message: format!(
                    "age_yellow_years ({}) cannot be greater than age_red_years ({})",
                    self.status.age_yellow_years, self.status.age_red_years
                ),
            });
        }

        if self.status.inspection_green_months > self.status.inspection_yellow_months {
            return Err(Error::ConfigValidation {
                message: format!(
                    "inspection_green_months ({}) cannot be greater than inspection_yellow_months ({})",
                    self.status.inspection_green_months, self.status.inspection_yellow_months
                ),
            });
        }

        if self.view.page_size == 0 {
            return Err(Error::ConfigValidation {
                message: "page_size must be greater than 0".to_string(),
            });
        }

        if self.view.sort_key.parse::<SortKey>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid sort_key: {}", self.view.sort_key),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the configured sort key, falling back to ETA.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        self.view.sort_key.parse().unwrap_or(SortKey::Eta)
    }

    /// Get the cache TTL, or `None` when caching is disabled.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.cache.ttl_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache.ttl_seconds))
        }
    }

    /// Get the departed horizon in days, or `None` when disabled.
    #[must_use]
    pub fn departed_horizon_days(&self) -> Option<u32> {
        match self.view.hide_departed_after_days {
            0 => None,
            days => Some(days),
        }
    }

    /// Column mapping to use: the configured one, or the built-in layout.
    #[must_use]
    pub fn column_mapping(&self) -> BTreeMap<String, FieldMappingEntry> {
        if self.columns.is_empty() {
            crate::table::default_vessel_columns()
        } else {
            self.columns.clone()
        }
    }
}
