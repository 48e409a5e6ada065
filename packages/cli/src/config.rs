//! TOML configuration for the `bedah_gang` binary.
//!
//! The config file is found in this order: the `--config` argument, the
//! `BEDAH_GANG_CONFIG` environment variable, then `bedah_gang.toml` in the
//! working directory. With no file, built-in defaults are used. The data
//! paths can be overridden independently through `LOCATIONS_PATH` and
//! `RULES_PATH`.
//!
//! ```toml
//! [data]
//! locations = "data/flood_risk.geojson"
//! rules = "data/design_rules.csv"
//!
//! [fields]
//! name = "kelurahan"
//! score = "Score"
//!
//! [resolver]
//! width_tolerance = 0.05
//!
//! [estimate]
//! unit_cost_paving = 400000
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bedah_gang_estimate_models::CostParameter;
use bedah_gang_location_models::LocationFieldMapping;
use serde::Deserialize;
use thiserror::Error;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bedah_gang.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,
    /// Property names in the location data.
    pub fields: LocationFieldMapping,
    pub resolver: ResolverConfig,
    /// Cost parameter overrides keyed by parameter name.
    pub estimate: BTreeMap<String, f64>,
}

/// Where the location data and rule table are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// `GeoJSON` `FeatureCollection` of kelurahan flood-risk records.
    pub locations: PathBuf,
    /// Rule table CSV. The embedded matrix is used when unset.
    pub rules: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            locations: PathBuf::from("data/flood_risk.geojson"),
            rules: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Width tolerance in meters. Widths match exactly when unset.
    pub width_tolerance: Option<f64>,
}

impl Config {
    /// Loads configuration from `explicit`, the environment, or defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file that was asked for cannot
    /// be read, fails to parse, or holds invalid values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("BEDAH_GANG_CONFIG").ok().map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            });

        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(&path)?)?
            }
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid TOML or has
    /// unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `LOCATIONS_PATH` and `RULES_PATH` as looked up by `var`.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("LOCATIONS_PATH") {
            self.data.locations = PathBuf::from(path);
        }
        if let Some(path) = var("RULES_PATH") {
            self.data.rules = Some(PathBuf::from(path));
        }
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown cost parameter or a
    /// negative or non-finite width tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tolerance) = self
            .resolver
            .width_tolerance
            .filter(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(ConfigError::Invalid {
                message: format!("resolver.width_tolerance must be >= 0, got {tolerance}"),
            });
        }

        for key in self.estimate.keys() {
            if key.parse::<CostParameter>().is_err() {
                return Err(ConfigError::Invalid {
                    message: format!("unknown cost parameter 'estimate.{key}'"),
                });
            }
        }

        Ok(())
    }

    /// Cost parameter overrides in the estimator's input form.
    #[must_use]
    pub fn estimate_overrides(&self) -> BTreeMap<String, Option<f64>> {
        self.estimate
            .iter()
            .map(|(key, value)| (key.clone(), Some(*value)))
            .collect()
    }
}
