//! # Domain Models
//!
//! Canonical value types shared by the swing engine.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated instrument ticker |
//! | [`TradingDate`] | Calendar date (`YYYY-MM-DD`) |
//! | [`PricePoint`] | One daily close |
//! | [`PriceSeries`] | Strictly ascending closes for one instrument |
//! | [`UtcDateTime`] | UTC timestamp for output metadata |
//!
//! ## Validation
//!
//! All domain types enforce invariants at construction time:
//!
//! ```rust
//! use fibswing_core::{PricePoint, PriceSeries, TradingDate, ValidationError};
//!
//! let day = TradingDate::parse("2024-01-02").unwrap();
//! let points = vec![
//!     PricePoint::new(day, 101.0).unwrap(),
//!     PricePoint::new(day, 102.0).unwrap(),
//! ];
//!
//! // Duplicate dates are rejected.
//! assert!(matches!(
//!     PriceSeries::new(points),
//!     Err(ValidationError::UnorderedSeries { index: 1 })
//! ));
//! ```

mod date;
mod price;
mod symbol;
mod timestamp;

pub use date::TradingDate;
pub use price::{PricePoint, PriceSeries};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
