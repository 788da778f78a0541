//! Percentage-threshold zigzag swing detection.
//!
//! The detector walks the tail window of a price series once, confirming a
//! pivot each time price reverses by at least the reversal threshold from
//! the running extreme. The most recent confirmed LOW/HIGH pair becomes the
//! [`Swing`]. Windows that never cross the threshold fall back to the
//! window's global minimum and maximum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PricePoint, SwingError, TradingDate, ValidationError};

/// Smallest tail window the detector will evaluate.
pub const MIN_POINTS: usize = 40;
pub const DEFAULT_REVERSAL_THRESHOLD: f64 = 0.06;
pub const DEFAULT_LOOKBACK_WINDOW: usize = 126;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    Low,
    High,
}

/// Swing direction. `Up` when the low precedes the high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Confirmed local extreme. `index` is relative to the evaluated window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub kind: PivotKind,
    pub price: f64,
}

/// Which detection path produced a swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingSource {
    /// Last two confirmed zigzag pivots.
    Zigzag,
    /// Window argmin/argmax; no reversal ever crossed the threshold.
    GlobalExtrema,
}

/// Most recent directional low/high pair. `swing_high > swing_low` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub low_index: usize,
    pub high_index: usize,
    pub low_date: TradingDate,
    pub high_date: TradingDate,
    pub swing_low: f64,
    pub swing_high: f64,
    pub direction: Direction,
    pub source: SwingSource,
}

impl Swing {
    pub fn range(&self) -> f64 {
        self.swing_high - self.swing_low
    }

    /// Date the swing started from: the low for an up swing, the high for a down swing.
    pub fn anchor_date(&self) -> TradingDate {
        match self.direction {
            Direction::Up => self.low_date,
            Direction::Down => self.high_date,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Extreme {
    index: usize,
    price: f64,
}

#[derive(Debug, Clone, Copy)]
enum ZigzagState {
    Undetermined,
    TrackingUp(Extreme),
    TrackingDown(Extreme),
}

/// Zigzag swing detector over the last `lookback_window` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingDetector {
    reversal_threshold: f64,
    lookback_window: usize,
}

impl Default for SwingDetector {
    fn default() -> Self {
        Self {
            reversal_threshold: DEFAULT_REVERSAL_THRESHOLD,
            lookback_window: DEFAULT_LOOKBACK_WINDOW,
        }
    }
}

impl SwingDetector {
    pub fn new(reversal_threshold: f64, lookback_window: usize) -> Result<Self, ValidationError> {
        validate_threshold(reversal_threshold)?;
        validate_lookback(lookback_window)?;
        Ok(Self {
            reversal_threshold,
            lookback_window,
        })
    }

    pub const fn reversal_threshold(&self) -> f64 {
        self.reversal_threshold
    }

    pub const fn lookback_window(&self) -> usize {
        self.lookback_window
    }

    /// Tail window the detector evaluates, or `InsufficientData` below [`MIN_POINTS`].
    pub fn window<'a>(&self, points: &'a [PricePoint]) -> Result<&'a [PricePoint], SwingError> {
        let start = points.len().saturating_sub(self.lookback_window);
        let window = &points[start..];
        if window.len() < MIN_POINTS {
            return Err(SwingError::InsufficientData {
                required: MIN_POINTS,
                got: window.len(),
            });
        }
        Ok(window)
    }

    /// Confirmed pivots in chronological order, indexed within the window.
    pub fn pivots(&self, points: &[PricePoint]) -> Result<Vec<Pivot>, SwingError> {
        let window = self.window(points)?;
        Ok(zigzag_pivots(window, self.reversal_threshold))
    }

    pub fn detect(&self, points: &[PricePoint]) -> Result<Swing, SwingError> {
        let window = self.window(points)?;
        let pivots = zigzag_pivots(window, self.reversal_threshold);

        let (low_index, high_index, source) = match pivots.as_slice() {
            [.., previous, last] => {
                debug_assert_ne!(previous.kind, last.kind, "zigzag pivots must alternate");
                let (low, high) = match last.kind {
                    PivotKind::Low => (last, previous),
                    PivotKind::High => (previous, last),
                };
                (low.index, high.index, SwingSource::Zigzag)
            }
            _ => {
                let (min_index, max_index) = global_extrema(window);
                debug!(
                    pivots = pivots.len(),
                    min_index, max_index, "zigzag found no swing, using window extrema"
                );
                (min_index, max_index, SwingSource::GlobalExtrema)
            }
        };

        let low = window[low_index];
        let high = window[high_index];
        if high.close <= low.close {
            return Err(SwingError::DegenerateSwing {
                low: low.close,
                high: high.close,
            });
        }

        let direction = if low_index < high_index {
            Direction::Up
        } else {
            Direction::Down
        };

        Ok(Swing {
            low_index,
            high_index,
            low_date: low.date,
            high_date: high.date,
            swing_low: low.close,
            swing_high: high.close,
            direction,
            source,
        })
    }
}

fn zigzag_pivots(window: &[PricePoint], threshold: f64) -> Vec<Pivot> {
    let mut pivots = Vec::new();
    let Some(first) = window.first() else {
        return pivots;
    };
    let origin = first.close;
    let mut state = ZigzagState::Undetermined;

    for (index, point) in window.iter().enumerate().skip(1) {
        let price = point.close;
        let current = Extreme { index, price };

        state = match state {
            ZigzagState::Undetermined => {
                if rise(origin, price) >= threshold {
                    confirm(&mut pivots, 0, PivotKind::Low, origin);
                    ZigzagState::TrackingUp(current)
                } else if fall(origin, price) >= threshold {
                    confirm(&mut pivots, 0, PivotKind::High, origin);
                    ZigzagState::TrackingDown(current)
                } else {
                    ZigzagState::Undetermined
                }
            }
            ZigzagState::TrackingUp(extreme) => {
                if price >= extreme.price {
                    ZigzagState::TrackingUp(current)
                } else if fall(extreme.price, price) >= threshold {
                    confirm(&mut pivots, extreme.index, PivotKind::High, extreme.price);
                    ZigzagState::TrackingDown(current)
                } else {
                    ZigzagState::TrackingUp(extreme)
                }
            }
            ZigzagState::TrackingDown(extreme) => {
                if price <= extreme.price {
                    ZigzagState::TrackingDown(current)
                } else if rise(extreme.price, price) >= threshold {
                    confirm(&mut pivots, extreme.index, PivotKind::Low, extreme.price);
                    ZigzagState::TrackingUp(current)
                } else {
                    ZigzagState::TrackingDown(extreme)
                }
            }
        };
    }

    pivots
}

fn confirm(pivots: &mut Vec<Pivot>, index: usize, kind: PivotKind, price: f64) {
    debug!(index, ?kind, price, "pivot confirmed");
    pivots.push(Pivot { index, kind, price });
}

fn rise(from: f64, to: f64) -> f64 {
    (to - from) / from
}

fn fall(from: f64, to: f64) -> f64 {
    (from - to) / from
}

/// First-occurrence argmin and argmax of the window closes.
fn global_extrema(window: &[PricePoint]) -> (usize, usize) {
    let mut min_index = 0;
    let mut max_index = 0;
    for (index, point) in window.iter().enumerate() {
        if point.close < window[min_index].close {
            min_index = index;
        }
        if point.close > window[max_index].close {
            max_index = index;
        }
    }
    (min_index, max_index)
}

fn validate_threshold(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(ValidationError::InvalidParameter {
            name: "reversal_threshold",
            reason: format!("must be a fraction in (0, 1), got {value}"),
        });
    }
    Ok(())
}

fn validate_lookback(value: usize) -> Result<(), ValidationError> {
    if value < MIN_POINTS {
        return Err(ValidationError::InvalidParameter {
            name: "lookback_window",
            reason: format!("must be at least {MIN_POINTS}, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::{Date, Duration, Month};

    use super::*;

    fn points(closes: &[f64]) -> Vec<PricePoint> {
        let start = Date::from_calendar_date(2024, Month::January, 1).expect("start date");
        closes
            .iter()
            .enumerate()
            .map(|(offset, close)| {
                let date = TradingDate::new(start + Duration::days(offset as i64));
                PricePoint::new(date, *close).expect("finite close")
            })
            .collect()
    }

    /// Piecewise-linear closes through `(index, price)` anchors.
    fn ramp(anchors: &[(usize, f64)]) -> Vec<f64> {
        let mut closes = vec![anchors[0].1];
        for pair in anchors.windows(2) {
            let (from_index, from_price) = pair[0];
            let (to_index, to_price) = pair[1];
            let steps = (to_index - from_index) as f64;
            for step in 1..=(to_index - from_index) {
                closes.push(from_price + (to_price - from_price) * step as f64 / steps);
            }
        }
        closes
    }

    #[test]
    fn takes_last_two_confirmed_pivots() {
        let closes = ramp(&[
            (0, 100.0),
            (10, 120.0),
            (20, 100.0),
            (30, 115.0),
            (49, 114.0),
        ]);
        let detector = SwingDetector::default();

        let pivots = detector.pivots(&points(&closes)).expect("pivots");
        let summary: Vec<_> = pivots.iter().map(|p| (p.index, p.kind)).collect();
        assert_eq!(
            summary,
            vec![(0, PivotKind::Low), (10, PivotKind::High), (20, PivotKind::Low)]
        );

        let swing = detector.detect(&points(&closes)).expect("swing");
        assert_eq!(swing.high_index, 10);
        assert_eq!(swing.low_index, 20);
        assert_eq!(swing.swing_high, 120.0);
        assert_eq!(swing.swing_low, 100.0);
        assert_eq!(swing.direction, Direction::Down);
        assert_eq!(swing.source, SwingSource::Zigzag);
        assert_eq!(swing.anchor_date(), swing.high_date);
    }

    #[test]
    fn confirms_pivot_at_previous_extreme_not_reversal_bar() {
        let closes = ramp(&[(0, 100.0), (5, 90.0), (15, 110.0), (45, 108.0)]);
        let swing = SwingDetector::default()
            .detect(&points(&closes))
            .expect("swing");

        assert_eq!(swing.low_index, 5);
        assert_eq!(swing.high_index, 0);
        assert_eq!(swing.direction, Direction::Down);
    }

    #[test]
    fn reversal_of_exactly_threshold_confirms_pivot() {
        let mut closes = vec![100.0; 45];
        closes[1] = 106.0;
        let pivots = SwingDetector::default()
            .pivots(&points(&closes))
            .expect("pivots");

        // 106 is exactly +6% from the origin; 100 is then a -5.66% fall, no reversal.
        assert_eq!(pivots.len(), 1);
        assert_eq!(pivots[0].kind, PivotKind::Low);
        assert_eq!(pivots[0].index, 0);
    }

    #[test]
    fn falls_back_to_window_extrema_in_quiet_market() {
        let mut closes: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 98.0 } else { 102.0 })
            .collect();
        closes[0] = 100.0;
        closes[5] = 95.0;
        closes[40] = 105.0;

        let swing = SwingDetector::default()
            .detect(&points(&closes))
            .expect("swing");

        assert_eq!(swing.source, SwingSource::GlobalExtrema);
        assert_eq!(swing.low_index, 5);
        assert_eq!(swing.high_index, 40);
        assert_eq!(swing.swing_low, 95.0);
        assert_eq!(swing.swing_high, 105.0);
        assert_eq!(swing.direction, Direction::Up);
    }

    #[test]
    fn constant_window_is_degenerate() {
        let err = SwingDetector::default()
            .detect(&points(&[100.0; 60]))
            .expect_err("must fail");
        assert_eq!(
            err,
            SwingError::DegenerateSwing {
                low: 100.0,
                high: 100.0
            }
        );
    }

    #[test]
    fn minimum_window_boundary() {
        let detector = SwingDetector::default();
        let closes = ramp(&[(0, 100.0), (39, 139.0)]);
        assert_eq!(closes.len(), 40);
        assert!(detector.detect(&points(&closes)).is_ok());

        let err = detector
            .detect(&points(&closes[1..]))
            .expect_err("39 points must fail");
        assert!(matches!(
            err,
            SwingError::InsufficientData {
                required: 40,
                got: 39
            }
        ));
    }

    #[test]
    fn evaluates_only_the_lookback_tail() {
        // A deep early crash sits outside a 40-point lookback.
        let mut closes = ramp(&[(0, 100.0), (20, 100.0), (69, 149.0)]);
        closes[3] = 10.0;
        let detector = SwingDetector::new(0.06, 40).expect("detector");

        let swing = detector.detect(&points(&closes)).expect("swing");
        assert!(swing.swing_low > 10.0);
        assert_eq!(swing.low_date, points(&closes)[30].date);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            SwingDetector::new(0.0, 126),
            Err(ValidationError::InvalidParameter {
                name: "reversal_threshold",
                ..
            })
        ));
        assert!(SwingDetector::new(f64::NAN, 126).is_err());
        assert!(SwingDetector::new(1.5, 126).is_err());
        assert!(matches!(
            SwingDetector::new(0.06, 39),
            Err(ValidationError::InvalidParameter {
                name: "lookback_window",
                ..
            })
        ));
    }
}
