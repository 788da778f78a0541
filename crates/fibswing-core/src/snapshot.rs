//! Daily swing snapshot assembly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, FibswingConfig};
use crate::{
    CoreError, FibLevel, FibonacciCalculator, FibonacciLevelSet, PriceHistorySource,
    PriceSeries, ProximityEvaluator, ProximityFlags, Swing, SwingDetector, SwingError, Symbol,
    ToleranceTable, TradingDate, ValidationError,
};

/// Fibonacci level closest to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestLevel {
    pub level: FibLevel,
    pub price: f64,
    /// Distance as a percent of the current price; absent when the price is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_pct: Option<f64>,
}

impl NearestLevel {
    pub fn find(levels: &FibonacciLevelSet, current_price: f64) -> Self {
        let (level, price) = levels.nearest(current_price);
        let distance_pct =
            (current_price != 0.0).then(|| 100.0 * (current_price - price).abs() / current_price);
        Self {
            level,
            price,
            distance_pct,
        }
    }
}

/// Technical-analysis record for one `(symbol, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingSnapshot {
    pub date: TradingDate,
    pub symbol: Symbol,
    pub swing: Swing,
    pub levels: FibonacciLevelSet,
    pub current_price: f64,
    /// Position within the swing, 0 at the low and 100 at the high. May leave `[0, 100]`.
    pub swing_position_pct: f64,
    pub days_since_swing: i64,
    pub near_retrace_618: bool,
    pub near_ext_1618: bool,
    pub near_any_major: bool,
    pub nearest_level: NearestLevel,
    pub reversal_threshold: f64,
    pub lookback_window: usize,
}

impl SwingSnapshot {
    pub fn flags(&self) -> ProximityFlags {
        ProximityFlags {
            near_retrace_618: self.near_retrace_618,
            near_ext_1618: self.near_ext_1618,
            near_any_major: self.near_any_major,
        }
    }
}

/// Composes detection, level arithmetic, and proximity into a [`SwingSnapshot`].
///
/// Holds only immutable configuration; one assembler can serve any number
/// of threads.
#[derive(Debug, Clone)]
pub struct SnapshotAssembler {
    config: EngineConfig,
    detector: SwingDetector,
    calculator: FibonacciCalculator,
    evaluator: ProximityEvaluator,
    tolerances: ToleranceTable,
}

impl SnapshotAssembler {
    pub fn new(config: EngineConfig, tolerances: ToleranceTable) -> Result<Self, ValidationError> {
        Ok(Self {
            detector: config.detector()?,
            config,
            calculator: FibonacciCalculator::new(),
            evaluator: ProximityEvaluator::new(),
            tolerances,
        })
    }

    pub fn from_config(config: &FibswingConfig) -> Result<Self, ValidationError> {
        Self::new(config.engine, config.tolerances.clone())
    }

    pub fn detector(&self) -> &SwingDetector {
        &self.detector
    }

    /// Fetch history once from `source` and assemble the snapshot.
    pub fn assemble_from_source(
        &self,
        source: &dyn PriceHistorySource,
        symbol: &Symbol,
        as_of: TradingDate,
    ) -> Result<SwingSnapshot, CoreError> {
        let series = source.history(symbol, as_of, self.config.lookback_window)?;
        debug!(%symbol, %as_of, source = source.name(), points = series.len(), "history loaded");
        self.assemble(symbol, as_of, &series)
    }

    /// Assemble from an in-hand series. Points dated after `as_of` are ignored.
    pub fn assemble(
        &self,
        symbol: &Symbol,
        as_of: TradingDate,
        series: &PriceSeries,
    ) -> Result<SwingSnapshot, CoreError> {
        let points = series.up_to(as_of);
        let Some(current) = points.last() else {
            return Err(SwingError::MissingPriceData {
                symbol: symbol.to_string(),
            }
            .into());
        };
        let current_price = current.close;

        let swing = self.detector.detect(points)?;
        let levels = self.calculator.levels(&swing)?;
        let profile = self.tolerances.profile_for(symbol);
        let flags = self.evaluator.evaluate(current_price, &levels, profile);

        let swing_position_pct = 100.0 * (current_price - swing.swing_low) / swing.range();
        let days_since_swing = swing.anchor_date().days_until(as_of);

        let nearest_level = NearestLevel::find(&levels, current_price);

        debug!(
            %symbol,
            direction = swing.direction.as_str(),
            swing_low = swing.swing_low,
            swing_high = swing.swing_high,
            swing_position_pct,
            "snapshot assembled"
        );

        Ok(SwingSnapshot {
            date: as_of,
            symbol: symbol.clone(),
            swing,
            levels,
            current_price,
            swing_position_pct,
            days_since_swing,
            near_retrace_618: flags.near_retrace_618,
            near_ext_1618: flags.near_ext_1618,
            near_any_major: flags.near_any_major,
            nearest_level,
            reversal_threshold: self.detector.reversal_threshold(),
            lookback_window: self.detector.lookback_window(),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, Duration, Month};

    use super::*;
    use crate::{Direction, InMemoryPriceSource, PricePoint, SwingSource, ToleranceProfile};

    fn start() -> Date {
        Date::from_calendar_date(2024, Month::January, 1).expect("start date")
    }

    fn day(offset: i64) -> TradingDate {
        TradingDate::new(start() + Duration::days(offset))
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(offset, close)| PricePoint::new(day(offset as i64), *close).expect("close"))
            .collect();
        PriceSeries::new(points).expect("series")
    }

    /// Rally from 100 (day 0) to 200 (day 30), then a steady decline to `last` on day 44.
    fn rally_then_pullback(last: f64) -> Vec<f64> {
        let mut closes = Vec::with_capacity(45);
        closes.extend((0..=30_i32).map(|i| 100.0 + 100.0 * f64::from(i) / 30.0));
        closes.extend((1..=14_i32).map(|i| 200.0 + (last - 200.0) * f64::from(i) / 14.0));
        closes
    }

    fn assembler() -> SnapshotAssembler {
        SnapshotAssembler::new(EngineConfig::default(), ToleranceTable::default())
            .expect("assembler")
    }

    #[test]
    fn assembles_reference_up_swing_snapshot() {
        let symbol = Symbol::parse("SPY").expect("symbol");

        let snapshot = assembler()
            .assemble(&symbol, day(44), &series(&rally_then_pullback(150.0)))
            .expect("snapshot");

        assert_eq!(snapshot.swing.swing_low, 100.0);
        assert_eq!(snapshot.swing.swing_high, 200.0);
        assert_eq!(snapshot.swing.direction, Direction::Up);
        assert_eq!(snapshot.swing.source, SwingSource::Zigzag);
        assert_eq!(snapshot.levels.retrace_50, 150.0);
        assert_eq!(snapshot.current_price, 150.0);
        assert_eq!(snapshot.swing_position_pct, 50.0);
        assert!(snapshot.near_any_major);
        assert_eq!(snapshot.days_since_swing, 44, "low on day 0, as-of day 44");
        assert_eq!(snapshot.nearest_level.level, FibLevel::Retrace50);
        assert_eq!(snapshot.nearest_level.distance_pct, Some(0.0));
        assert_eq!(snapshot.lookback_window, 126);
    }

    #[test]
    fn position_can_fall_below_the_swing_low() {
        // High 150 (day 0), low 100 (day 20), +6% bounce to 106 confirms the low,
        // then a 5.75% dip to 99.9 that is too small to confirm a new pivot.
        let mut closes = vec![150.0; 11];
        closes.extend((1..=10_i32).map(|i| 150.0 - 5.0 * f64::from(i)));
        closes.extend([102.0, 104.0, 106.0]);
        closes.extend([99.9; 22]);
        let symbol = Symbol::parse("IWM").expect("symbol");
        let as_of = day(closes.len() as i64 - 1);

        let snapshot = assembler()
            .assemble(&symbol, as_of, &series(&closes))
            .expect("snapshot");
        assert_eq!(snapshot.swing.direction, Direction::Down);
        assert_eq!(snapshot.swing.swing_low, 100.0);
        assert_eq!(snapshot.swing.swing_high, 150.0);
        assert!(snapshot.swing_position_pct < 0.0);
        assert_eq!(snapshot.days_since_swing, 45, "counted from the day-0 high");
    }

    #[test]
    fn ignores_points_after_as_of() {
        let closes = rally_then_pullback(150.0);
        let symbol = Symbol::parse("SPY").expect("symbol");

        let snapshot = assembler()
            .assemble(&symbol, day(43), &series(&closes))
            .expect("snapshot");
        assert_eq!(snapshot.date, day(43));
        assert_eq!(snapshot.current_price, closes[43]);
        assert_eq!(snapshot.days_since_swing, 43);
    }

    #[test]
    fn empty_history_is_missing_price_data() {
        let symbol = Symbol::parse("SPY").expect("symbol");
        let err = assembler()
            .assemble(&symbol, day(0), &PriceSeries::empty())
            .expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Swing(SwingError::MissingPriceData { .. })
        ));
    }

    #[test]
    fn short_history_propagates_insufficient_data() {
        let symbol = Symbol::parse("SPY").expect("symbol");
        let err = assembler()
            .assemble(&symbol, day(100), &series(&[100.0; 10]))
            .expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Swing(SwingError::InsufficientData { got: 10, .. })
        ));
    }

    #[test]
    fn uses_instrument_tolerance_profile() {
        // 141.0 is 2.8 above retrace_618 (138.2): outside 1% of price, inside 3.0 absolute.
        let closes = rally_then_pullback(141.0);
        let symbol = Symbol::parse("^GSPC").expect("symbol");

        let plain = assembler()
            .assemble(&symbol, day(44), &series(&closes))
            .expect("snapshot");
        assert!(!plain.near_retrace_618);

        let tolerances = ToleranceTable::default()
            .with_instrument(
                symbol.clone(),
                ToleranceProfile::with_absolute(3.0, 3.0, 0.01),
            )
            .expect("table");
        let tuned = SnapshotAssembler::new(EngineConfig::default(), tolerances)
            .expect("assembler")
            .assemble(&symbol, day(44), &series(&closes))
            .expect("snapshot");
        assert!(tuned.near_retrace_618);
        assert!(tuned.near_any_major);
        assert_eq!(tuned.flags().near_retrace_618, tuned.near_retrace_618);
    }

    #[test]
    fn assembles_from_source() {
        let symbol = Symbol::parse("QQQ").expect("symbol");
        let source = InMemoryPriceSource::new()
            .with_series(symbol.clone(), series(&rally_then_pullback(150.0)));

        let snapshot = assembler()
            .assemble_from_source(&source, &symbol, day(60))
            .expect("snapshot");
        assert_eq!(snapshot.current_price, 150.0);
        assert_eq!(snapshot.days_since_swing, 60);
    }
}
