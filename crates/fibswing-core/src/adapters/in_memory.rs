use std::collections::HashMap;

use crate::{PriceHistorySource, PriceSeries, SourceError, Symbol, TradingDate};

/// Price source backed by series held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<Symbol, PriceSeries>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: Symbol, series: PriceSeries) -> Self {
        self.insert(symbol, series);
        self
    }

    pub fn insert(&mut self, symbol: Symbol, series: PriceSeries) {
        self.series.insert(symbol, series);
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl PriceHistorySource for InMemoryPriceSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn history(
        &self,
        symbol: &Symbol,
        as_of: TradingDate,
        _min_points: usize,
    ) -> Result<PriceSeries, SourceError> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| SourceError::not_found(symbol))?;

        PriceSeries::new(series.up_to(as_of).to_vec())
            .map_err(|error| SourceError::internal(error.to_string()))
    }
}
