//! Pipeline configuration.
//!
//! Values come from, in increasing priority: built-in defaults, the TOML
//! config file, `TAXI_NBHD_*` environment variables, and command-line
//! flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taxi_nbhd_geography_models::{DEFAULT_ROUNDING_DECIMALS, MAX_ROUNDING_DECIMALS};
use taxi_nbhd_neighborhood_models::NeighborhoodFieldMapping;
use taxi_nbhd_storage::paths::DEFAULT_DATA_DIR;
use taxi_nbhd_trip::discover::DEFAULT_PATTERNS;
use thiserror::Error;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "taxi_nbhd.toml";

/// Overrides `rounding_decimals`.
pub const ENV_ROUNDING_DECIMALS: &str = "TAXI_NBHD_ROUNDING_DECIMALS";

/// Overrides `data_dir`.
pub const ENV_DATA_DIR: &str = "TAXI_NBHD_DATA_DIR";

/// Errors that can occur while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`PipelineConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
    },

    /// Rounding precision outside `0..=9`.
    #[error("rounding_decimals must be between 0 and {max}, got {0}", max = MAX_ROUNDING_DECIMALS)]
    InvalidDecimals(u32),

    /// A worker count of zero.
    #[error("threads must be at least 1")]
    InvalidThreads,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Decimal places coordinates are rounded to.
    pub rounding_decimals: u32,
    /// Directory holding inputs and generated artifacts.
    pub data_dir: PathBuf,
    /// Neighborhood boundary `GeoJSON`, relative to `data_dir` unless
    /// absolute.
    pub neighborhoods: PathBuf,
    /// File-name patterns selecting trip files in `data_dir`.
    pub trip_globs: Vec<String>,
    /// Whether dropoff locations are resolved along with pickups.
    pub include_dropoffs: bool,
    /// Worker threads for resolution.
    pub threads: usize,
    /// Feature properties carrying the names.
    pub properties: NeighborhoodFieldMapping,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rounding_decimals: DEFAULT_ROUNDING_DECIMALS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            neighborhoods: PathBuf::from("nyc_neighborhoods.json"),
            trip_globs: DEFAULT_PATTERNS.iter().map(ToString::to_string).collect(),
            include_dropoffs: true,
            threads: 1,
            properties: NeighborhoodFieldMapping::default(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--config`
    pub config: Option<PathBuf>,
    /// `--data-dir`
    pub data_dir: Option<PathBuf>,
    /// `--decimals`
    pub decimals: Option<u32>,
}

impl PipelineConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or mistyped keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the config file at `path`, or [`DEFAULT_CONFIG_FILE`] if it
    /// exists when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly named file is missing or
    /// any file fails to parse.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if the decimals variable is not
    /// a number.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ROUNDING_DECIMALS) {
            self.rounding_decimals = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_ROUNDING_DECIMALS,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(value);
        }
        Ok(())
    }

    /// Applies command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(dir) = &overrides.data_dir {
            self.data_dir.clone_from(dir);
        }
        if let Some(decimals) = overrides.decimals {
            self.rounding_decimals = decimals;
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for out-of-range decimals or zero threads.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounding_decimals > MAX_ROUNDING_DECIMALS {
            return Err(ConfigError::InvalidDecimals(self.rounding_decimals));
        }
        if self.threads == 0 {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }

    /// File, then process environment, then `overrides`, validated.
    ///
    /// # Errors
    ///
    /// See [`Self::from_file`], [`Self::apply_env`], [`Self::validate`].
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(overrides.config.as_deref())?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Location of the boundary file.
    #[must_use]
    pub fn neighborhoods_path(&self) -> PathBuf {
        if self.neighborhoods.is_absolute() {
            self.neighborhoods.clone()
        } else {
            self.data_dir.join(&self.neighborhoods)
        }
    }
}
