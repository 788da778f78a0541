//! Fibonacci retracement/extension ladder anchored to a swing.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Direction, Swing, SwingError};

/// Named level in the closed Fibonacci ladder.
///
/// Serialized names match the [`FibonacciLevelSet`] field keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FibLevel {
    #[serde(rename = "retrace_236")]
    Retrace236,
    #[serde(rename = "retrace_382")]
    Retrace382,
    #[serde(rename = "retrace_50")]
    Retrace50,
    #[serde(rename = "retrace_618")]
    Retrace618,
    #[serde(rename = "retrace_786")]
    Retrace786,
    #[serde(rename = "ext_100")]
    Ext100,
    #[serde(rename = "ext_1236")]
    Ext1236,
    #[serde(rename = "ext_1382")]
    Ext1382,
    #[serde(rename = "ext_1618")]
    Ext1618,
    #[serde(rename = "ext_200")]
    Ext200,
    #[serde(rename = "ext_2618")]
    Ext2618,
}

impl FibLevel {
    pub const ALL: [Self; 11] = [
        Self::Retrace236,
        Self::Retrace382,
        Self::Retrace50,
        Self::Retrace618,
        Self::Retrace786,
        Self::Ext100,
        Self::Ext1236,
        Self::Ext1382,
        Self::Ext1618,
        Self::Ext200,
        Self::Ext2618,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retrace236 => "retrace_236",
            Self::Retrace382 => "retrace_382",
            Self::Retrace50 => "retrace_50",
            Self::Retrace618 => "retrace_618",
            Self::Retrace786 => "retrace_786",
            Self::Ext100 => "ext_100",
            Self::Ext1236 => "ext_1236",
            Self::Ext1382 => "ext_1382",
            Self::Ext1618 => "ext_1618",
            Self::Ext200 => "ext_200",
            Self::Ext2618 => "ext_2618",
        }
    }

    /// Fibonacci ratio of the level.
    ///
    /// Retracements sit `ratio` of the range back from the latest extreme.
    /// Extensions sit `ratio` of the range from the swing's origin, so
    /// `ext_100` is the latest extreme itself.
    pub const fn ratio(self) -> f64 {
        match self {
            Self::Retrace236 => 0.236,
            Self::Retrace382 => 0.382,
            Self::Retrace50 => 0.5,
            Self::Retrace618 => 0.618,
            Self::Retrace786 => 0.786,
            Self::Ext100 => 1.0,
            Self::Ext1236 => 1.236,
            Self::Ext1382 => 1.382,
            Self::Ext1618 => 1.618,
            Self::Ext200 => 2.0,
            Self::Ext2618 => 2.618,
        }
    }

    pub const fn is_retracement(self) -> bool {
        matches!(
            self,
            Self::Retrace236
                | Self::Retrace382
                | Self::Retrace50
                | Self::Retrace618
                | Self::Retrace786
        )
    }
}

impl Display for FibLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fibonacci prices for one swing. Unrounded IEEE-754 values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevelSet {
    pub retrace_236: f64,
    pub retrace_382: f64,
    pub retrace_50: f64,
    pub retrace_618: f64,
    pub retrace_786: f64,
    pub ext_100: f64,
    pub ext_1236: f64,
    pub ext_1382: f64,
    pub ext_1618: f64,
    pub ext_200: f64,
    pub ext_2618: f64,
}

impl FibonacciLevelSet {
    pub const fn get(&self, level: FibLevel) -> f64 {
        match level {
            FibLevel::Retrace236 => self.retrace_236,
            FibLevel::Retrace382 => self.retrace_382,
            FibLevel::Retrace50 => self.retrace_50,
            FibLevel::Retrace618 => self.retrace_618,
            FibLevel::Retrace786 => self.retrace_786,
            FibLevel::Ext100 => self.ext_100,
            FibLevel::Ext1236 => self.ext_1236,
            FibLevel::Ext1382 => self.ext_1382,
            FibLevel::Ext1618 => self.ext_1618,
            FibLevel::Ext200 => self.ext_200,
            FibLevel::Ext2618 => self.ext_2618,
        }
    }

    /// `(level, price)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FibLevel, f64)> + '_ {
        FibLevel::ALL
            .into_iter()
            .map(|level| (level, self.get(level)))
    }

    /// Closest level to `price`; ties resolve to the earlier level in canonical order.
    pub fn nearest(&self, price: f64) -> (FibLevel, f64) {
        self.iter()
            .min_by(|a, b| (a.1 - price).abs().total_cmp(&(b.1 - price).abs()))
            .unwrap_or((FibLevel::Ext100, self.ext_100))
    }
}

/// Builds [`FibonacciLevelSet`]s from swings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FibonacciCalculator;

impl FibonacciCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn levels(&self, swing: &Swing) -> Result<FibonacciLevelSet, SwingError> {
        self.levels_for(swing.swing_low, swing.swing_high, swing.direction)
    }

    /// Ladder for an explicit low/high pair.
    ///
    /// For an up swing retracements pull back down from the high and
    /// extensions project above it; a down swing mirrors around the low.
    pub fn levels_for(
        &self,
        swing_low: f64,
        swing_high: f64,
        direction: Direction,
    ) -> Result<FibonacciLevelSet, SwingError> {
        let range = swing_high - swing_low;
        if range.is_nan() || range <= 0.0 {
            return Err(SwingError::DegenerateSwing {
                low: swing_low,
                high: swing_high,
            });
        }

        let (anchor, sign) = match direction {
            Direction::Up => (swing_high, 1.0),
            Direction::Down => (swing_low, -1.0),
        };
        // Offsets are measured from the anchor; ext_100 has offset 0 and lands on it exactly.
        let price = |level: FibLevel| {
            if level.is_retracement() {
                anchor - sign * level.ratio() * range
            } else {
                anchor + sign * (level.ratio() - 1.0) * range
            }
        };

        let [r236, r382, r50, r618, r786, e100, e1236, e1382, e1618, e200, e2618] =
            FibLevel::ALL.map(price);

        Ok(FibonacciLevelSet {
            retrace_236: r236,
            retrace_382: r382,
            retrace_50: r50,
            retrace_618: r618,
            retrace_786: r786,
            ext_100: e100,
            ext_1236: e1236,
            ext_1382: e1382,
            ext_1618: e1618,
            ext_200: e200,
            ext_2618: e2618,
        })
    }
}
