//! Behavior-driven tests for swing detection
//!
//! These tests verify WHICH swing a user gets back for typical price shapes,
//! focusing on observable pivots and directions.

use fibswing_tests::{
    price_points, quiet_market, rally_then_pullback, Direction, PivotKind, SwingDetector,
    SwingError, SwingSource,
};

// =============================================================================
// Swing Detection: Trending Markets
// =============================================================================

#[test]
fn when_price_rallies_then_pulls_back_system_reports_up_swing_from_the_rally() {
    // Given: A 100 -> 200 rally followed by a slide to 150
    let points = price_points(&rally_then_pullback(150.0));

    // When: The default detector evaluates the series
    let swing = SwingDetector::default().detect(&points).expect("swing");

    // Then: The rally is the swing, anchored on its low
    assert_eq!(swing.direction, Direction::Up);
    assert_eq!((swing.low_index, swing.high_index), (0, 30));
    assert_eq!((swing.swing_low, swing.swing_high), (100.0, 200.0));
    assert_eq!(swing.source, SwingSource::Zigzag);
    assert_eq!(swing.anchor_date(), points[0].date);
}

#[test]
fn when_several_legs_occur_system_uses_only_the_last_two_pivots() {
    // Given: 100 -> 130 -> 110 -> 140 -> 120 -> 130 with each leg past 6%
    let mut closes = Vec::new();
    for (from, to, steps) in [
        (100.0, 130.0, 10_i32),
        (130.0, 110.0, 10),
        (110.0, 140.0, 10),
        (140.0, 120.0, 10),
    ] {
        for step in 0..steps {
            closes.push(from + (to - from) * f64::from(step) / f64::from(steps));
        }
    }
    closes.extend([120.0, 124.0, 128.0, 129.0, 130.0]);
    let points = price_points(&closes);
    let detector = SwingDetector::default();

    // When: Pivots and the swing are computed
    let pivots = detector.pivots(&points).expect("pivots");
    let swing = detector.detect(&points).expect("swing");

    // Then: Pivots alternate and the swing is the final confirmed pair
    let kinds: Vec<_> = pivots.iter().map(|pivot| pivot.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PivotKind::Low,
            PivotKind::High,
            PivotKind::Low,
            PivotKind::High,
            PivotKind::Low
        ]
    );
    assert_eq!(swing.swing_high, 140.0);
    assert_eq!(swing.swing_low, 120.0);
    assert_eq!(swing.direction, Direction::Down);
}

// =============================================================================
// Swing Detection: Quiet and Degenerate Markets
// =============================================================================

#[test]
fn when_no_move_crosses_threshold_system_falls_back_to_window_extrema() {
    // Given: A quiet market oscillating between 98 and 102
    let points = price_points(&quiet_market());

    // When: The detector runs
    let swing = SwingDetector::default().detect(&points).expect("swing");

    // Then: The global low (day 5) and high (day 40) form an up swing
    assert_eq!(swing.source, SwingSource::GlobalExtrema);
    assert_eq!((swing.low_index, swing.high_index), (5, 40));
    assert_eq!(swing.direction, Direction::Up);
}

#[test]
fn when_price_never_changes_system_refuses_a_zero_range_swing() {
    // Given: Sixty identical closes
    let points = price_points(&[100.0; 60]);

    // When: The detector runs
    let error = SwingDetector::default()
        .detect(&points)
        .expect_err("flat series must fail");

    // Then: The failure is a degenerate swing with a stable code
    assert!(matches!(error, SwingError::DegenerateSwing { .. }));
    assert_eq!(error.code(), "swing.degenerate");
}

// =============================================================================
// Swing Detection: Window Boundaries
// =============================================================================

#[test]
fn when_exactly_forty_points_are_available_system_detects_a_swing() {
    // Given: Forty points of a clear rally
    let closes: Vec<f64> = (0..40_i32).map(|i| 100.0 + f64::from(i)).collect();

    // When/Then: Detection succeeds
    SwingDetector::default()
        .detect(&price_points(&closes))
        .expect("forty points are enough");
}

#[test]
fn when_thirty_nine_points_are_available_system_reports_insufficient_data() {
    // Given: One point short of the minimum
    let closes: Vec<f64> = (0..39_i32).map(|i| 100.0 + f64::from(i)).collect();

    // When: Detection runs
    let error = SwingDetector::default()
        .detect(&price_points(&closes))
        .expect_err("must fail");

    // Then: The error names what was required and what was seen
    assert_eq!(
        error,
        SwingError::InsufficientData {
            required: 40,
            got: 39
        }
    );
}

#[test]
fn when_history_exceeds_lookback_system_ignores_older_points() {
    // Given: Thirty old closes at 10 followed by the 45-day reference rally
    let mut closes = vec![10.0; 30];
    closes.extend(rally_then_pullback(150.0));
    let detector = SwingDetector::new(0.06, 45).expect("detector");

    // When: Only the last 45 points are evaluated
    let swing = detector.detect(&price_points(&closes)).expect("swing");

    // Then: The old low is invisible and indices are window-relative
    assert_eq!(swing.swing_low, 100.0);
    assert_eq!(swing.low_index, 0);
}
