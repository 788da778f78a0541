use thiserror::Error;

use crate::SourceError;

/// Validation and contract errors exposed by `fibswing-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("price series dates must be strictly ascending (violated at index {index})")]
    UnorderedSeries { index: usize },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Conditions under which a `(symbol, date)` unit of work produces no snapshot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwingError {
    #[error("insufficient data: required {required} points, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("no price data returned for '{symbol}'")]
    MissingPriceData { symbol: String },

    #[error("degenerate swing: high {high} is not above low {low}")]
    DegenerateSwing { low: f64, high: f64 },
}

impl SwingError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "swing.insufficient_data",
            Self::MissingPriceData { .. } => "swing.missing_price_data",
            Self::DegenerateSwing { .. } => "swing.degenerate",
        }
    }
}

/// Why a `(symbol, date)` produced no snapshot: the engine or its price source.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Swing(#[from] SwingError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl CoreError {
    /// Stable dotted code used in envelopes and batch failure reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Swing(error) => error.code(),
            Self::Source(error) => error.code(),
        }
    }
}
