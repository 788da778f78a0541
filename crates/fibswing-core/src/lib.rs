//! Core engine for fibswing.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Zigzag swing detection over daily closes
//! - Fibonacci retracement/extension levels and proximity flags
//! - Snapshot assembly, batch runs, and price history sources
//! - Response envelope and structured errors

pub mod adapters;
pub mod batch;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fibonacci;
pub mod proximity;
pub mod snapshot;
pub mod source;
pub mod swing;

pub use adapters::{CsvPriceSource, InMemoryPriceSource};
pub use batch::{BatchReport, BatchRunner, SymbolFailure};
pub use config::{ConfigError, EngineConfig, FibswingConfig};
pub use domain::{PricePoint, PriceSeries, Symbol, TradingDate, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, SwingError, ValidationError};
pub use fibonacci::{FibLevel, FibonacciCalculator, FibonacciLevelSet};
pub use proximity::{near, ProximityEvaluator, ProximityFlags, ToleranceProfile, ToleranceTable};
pub use snapshot::{NearestLevel, SnapshotAssembler, SwingSnapshot};
pub use source::{PriceHistorySource, SourceError, SourceErrorKind};
pub use swing::{
    Direction, Pivot, PivotKind, Swing, SwingDetector, SwingSource, DEFAULT_LOOKBACK_WINDOW,
    DEFAULT_REVERSAL_THRESHOLD, MIN_POINTS,
};
