//! "At a key level" evaluation under per-instrument tolerance rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FibonacciLevelSet, Symbol, ValidationError};

pub const DEFAULT_GENERIC_PCT: f64 = 0.01;

/// Tolerance rules for one instrument.
///
/// Absolute tolerances (price units) apply only to `retrace_618` and
/// `ext_1618`; every other level, and those two when no absolute value is
/// set, use `generic_pct` of the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret618_abs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext1618_abs: Option<f64>,
    #[serde(default = "default_generic_pct")]
    pub generic_pct: f64,
}

fn default_generic_pct() -> f64 {
    DEFAULT_GENERIC_PCT
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self::percentage(DEFAULT_GENERIC_PCT)
    }
}

impl ToleranceProfile {
    pub const fn percentage(generic_pct: f64) -> Self {
        Self {
            ret618_abs: None,
            ext1618_abs: None,
            generic_pct,
        }
    }

    pub const fn with_absolute(ret618_abs: f64, ext1618_abs: f64, generic_pct: f64) -> Self {
        Self {
            ret618_abs: Some(ret618_abs),
            ext1618_abs: Some(ext1618_abs),
            generic_pct,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_tolerance("generic_pct", Some(self.generic_pct))?;
        validate_tolerance("ret618_abs", self.ret618_abs)?;
        validate_tolerance("ext1618_abs", self.ext1618_abs)
    }
}

fn validate_tolerance(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(value) if !value.is_finite() => Err(ValidationError::NonFiniteValue { field }),
        Some(value) if value < 0.0 => Err(ValidationError::NegativeValue { field }),
        _ => Ok(()),
    }
}

/// Explicit per-symbol tolerance lookup with a percentage-only default.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ToleranceTable {
    default: ToleranceProfile,
    instruments: BTreeMap<Symbol, ToleranceProfile>,
}

impl ToleranceTable {
    pub fn new(default: ToleranceProfile) -> Result<Self, ValidationError> {
        default.validate()?;
        Ok(Self {
            default,
            instruments: BTreeMap::new(),
        })
    }

    pub fn with_instrument(
        mut self,
        symbol: Symbol,
        profile: ToleranceProfile,
    ) -> Result<Self, ValidationError> {
        profile.validate()?;
        self.instruments.insert(symbol, profile);
        Ok(self)
    }

    pub fn default_profile(&self) -> &ToleranceProfile {
        &self.default
    }

    pub fn profile_for(&self, symbol: &Symbol) -> &ToleranceProfile {
        self.instruments.get(symbol).unwrap_or(&self.default)
    }

    pub fn instruments(&self) -> impl Iterator<Item = (&Symbol, &ToleranceProfile)> {
        self.instruments.iter()
    }
}

/// Proximity flags used to trigger downstream alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProximityFlags {
    pub near_retrace_618: bool,
    pub near_ext_1618: bool,
    pub near_any_major: bool,
}

/// `|price - level| <= tol_abs`, or `<= tol_pct * price` when no absolute tolerance is given.
pub fn near(price: f64, level: f64, tol_abs: Option<f64>, tol_pct: f64) -> bool {
    let tolerance = tol_abs.unwrap_or(tol_pct * price);
    (price - level).abs() <= tolerance
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityEvaluator;

impl ProximityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        current_price: f64,
        levels: &FibonacciLevelSet,
        tolerance: &ToleranceProfile,
    ) -> ProximityFlags {
        let pct = tolerance.generic_pct;
        let near_retrace_618 = near(current_price, levels.retrace_618, tolerance.ret618_abs, pct);
        let near_ext_1618 = near(current_price, levels.ext_1618, tolerance.ext1618_abs, pct);

        let near_any_major = near(current_price, levels.retrace_382, None, pct)
            || near(current_price, levels.retrace_50, None, pct)
            || near_retrace_618
            || near(current_price, levels.ext_100, None, pct)
            || near_ext_1618;

        debug!(
            current_price,
            near_retrace_618, near_ext_1618, near_any_major, "proximity evaluated"
        );

        ProximityFlags {
            near_retrace_618,
            near_ext_1618,
            near_any_major,
        }
    }
}
