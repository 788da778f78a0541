//! Engine and tolerance configuration.
//!
//! Configuration is read from YAML:
//!
//! ```yaml
//! reversal_threshold: 0.06
//! lookback_window: 126
//! tolerance:
//!   default_pct: 0.01
//!   instruments:
//!     "^GSPC": { ret618_abs: 15.0, ext1618_abs: 15.0 }
//! ```
//!
//! Every key is optional; omitted keys take the built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::proximity::DEFAULT_GENERIC_PCT;
use crate::swing::{DEFAULT_LOOKBACK_WINDOW, DEFAULT_REVERSAL_THRESHOLD, MIN_POINTS};
use crate::{SwingDetector, Symbol, ToleranceProfile, ToleranceTable, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid tolerance for '{symbol}': {source}")]
    Instrument {
        symbol: String,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Swing detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineConfig {
    pub reversal_threshold: f64,
    pub lookback_window: usize,
    pub min_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reversal_threshold: DEFAULT_REVERSAL_THRESHOLD,
            lookback_window: DEFAULT_LOOKBACK_WINDOW,
            min_points: MIN_POINTS,
        }
    }
}

impl EngineConfig {
    pub fn new(reversal_threshold: f64, lookback_window: usize) -> Result<Self, ValidationError> {
        let config = Self {
            reversal_threshold,
            lookback_window,
            min_points: MIN_POINTS,
        };
        config.detector()?;
        Ok(config)
    }

    pub fn detector(&self) -> Result<SwingDetector, ValidationError> {
        SwingDetector::new(self.reversal_threshold, self.lookback_window)
    }
}

/// Effective configuration: engine parameters plus the tolerance table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FibswingConfig {
    pub engine: EngineConfig,
    pub tolerances: ToleranceTable,
}

impl FibswingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(input)?;
        raw.into_config()
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        reversal_threshold: Option<f64>,
        lookback_window: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let threshold = reversal_threshold.unwrap_or(self.engine.reversal_threshold);
        let lookback = lookback_window.unwrap_or(self.engine.lookback_window);
        self.engine = EngineConfig::new(threshold, lookback)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_threshold")]
    reversal_threshold: f64,
    #[serde(default = "default_lookback")]
    lookback_window: usize,
    #[serde(default)]
    tolerance: RawTolerance,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTolerance {
    #[serde(default = "default_pct")]
    default_pct: f64,
    #[serde(default)]
    instruments: BTreeMap<String, RawInstrument>,
}

impl Default for RawTolerance {
    fn default() -> Self {
        Self {
            default_pct: DEFAULT_GENERIC_PCT,
            instruments: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInstrument {
    ret618_abs: Option<f64>,
    ext1618_abs: Option<f64>,
    generic_pct: Option<f64>,
}

fn default_threshold() -> f64 {
    DEFAULT_REVERSAL_THRESHOLD
}

fn default_lookback() -> usize {
    DEFAULT_LOOKBACK_WINDOW
}

fn default_pct() -> f64 {
    DEFAULT_GENERIC_PCT
}

impl RawConfig {
    fn into_config(self) -> Result<FibswingConfig, ConfigError> {
        let engine = EngineConfig::new(self.reversal_threshold, self.lookback_window)?;

        let default_pct = self.tolerance.default_pct;
        let mut tolerances = ToleranceTable::new(ToleranceProfile::percentage(default_pct))?;
        for (name, raw) in self.tolerance.instruments {
            let instrument_error = |source| ConfigError::Instrument {
                symbol: name.clone(),
                source,
            };
            let symbol = Symbol::parse(&name).map_err(instrument_error)?;
            let profile = ToleranceProfile {
                ret618_abs: raw.ret618_abs,
                ext1618_abs: raw.ext1618_abs,
                generic_pct: raw.generic_pct.unwrap_or(default_pct),
            };
            tolerances = tolerances
                .with_instrument(symbol, profile)
                .map_err(instrument_error)?;
        }

        Ok(FibswingConfig { engine, tolerances })
    }
}
