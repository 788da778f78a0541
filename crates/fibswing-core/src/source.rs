use std::fmt::{Display, Formatter};

use crate::{PriceSeries, Symbol, TradingDate};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    Unavailable,
    InvalidData,
    Internal,
}

/// Structured price history error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn not_found(symbol: &Symbol) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: format!("no price history for '{symbol}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidData,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidData => "source.invalid_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Read-only supplier of daily closes.
///
/// Implementations return points dated on or before `as_of`, ascending, and
/// should cover at least `min_points` trading days when the data exists.
/// Retries and caching are the implementation's concern.
pub trait PriceHistorySource: Send + Sync {
    fn name(&self) -> &'static str;

    fn history(
        &self,
        symbol: &Symbol,
        as_of: TradingDate,
        min_points: usize,
    ) -> Result<PriceSeries, SourceError>;
}
