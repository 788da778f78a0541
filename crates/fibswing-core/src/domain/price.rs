use serde::{Deserialize, Serialize};

use crate::{TradingDate, ValidationError};

/// Daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: TradingDate, close: f64) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        Ok(Self { date, close })
    }
}

/// Chronological sequence of closes, strictly ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedSeries { index: index + 1 });
            }
        }
        if points.iter().any(|point| !point.close.is_finite()) {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The last `n` points, or the whole series when it is shorter.
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Prefix of the series dated on or before `as_of`.
    pub fn up_to(&self, as_of: TradingDate) -> &[PricePoint] {
        let end = self.points.partition_point(|point| point.date <= as_of);
        &self.points[..end]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}
