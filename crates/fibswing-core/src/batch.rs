//! Parallel multi-symbol snapshot runs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{CoreError, PriceHistorySource, SnapshotAssembler, SwingSnapshot, Symbol, TradingDate};

/// A symbol that produced no snapshot for the run date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: Symbol,
    pub code: String,
    pub message: String,
}

impl SymbolFailure {
    pub fn new(symbol: Symbol, error: &CoreError) -> Self {
        Self {
            symbol,
            code: error.code().to_owned(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one batch run, sorted by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub as_of: TradingDate,
    pub snapshots: Vec<SwingSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SymbolFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the assembler for many symbols concurrently.
///
/// Each symbol is an independent unit of work: one symbol's error is
/// recorded in [`BatchReport::failures`] and never affects the others.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    assembler: SnapshotAssembler,
}

impl BatchRunner {
    pub fn new(assembler: SnapshotAssembler) -> Self {
        Self { assembler }
    }

    pub fn run(
        &self,
        source: &dyn PriceHistorySource,
        symbols: &[Symbol],
        as_of: TradingDate,
    ) -> BatchReport {
        let outcomes: Vec<_> = symbols
            .par_iter()
            .map(|symbol| {
                let result = self.assembler.assemble_from_source(source, symbol, as_of);
                (symbol.clone(), result)
            })
            .collect();

        let mut snapshots = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (symbol, result) in outcomes {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(error) => {
                    warn!(%symbol, %as_of, code = error.code(), %error, "skipping symbol");
                    failures.push(SymbolFailure::new(symbol, &error));
                }
            }
        }

        snapshots.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        info!(
            %as_of,
            source = source.name(),
            requested = symbols.len(),
            produced = snapshots.len(),
            skipped = failures.len(),
            "batch complete"
        );

        BatchReport {
            as_of,
            snapshots,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, Duration, Month};

    use super::*;
    use crate::config::EngineConfig;
    use crate::{InMemoryPriceSource, PricePoint, PriceSeries, ToleranceTable};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Date::from_calendar_date(2024, Month::January, 1).expect("start");
        let points = closes
            .iter()
            .enumerate()
            .map(|(offset, close)| {
                PricePoint::new(
                    TradingDate::new(start + Duration::days(offset as i64)),
                    *close,
                )
                .expect("close")
            })
            .collect();
        PriceSeries::new(points).expect("series")
    }

    fn runner() -> BatchRunner {
        let assembler = SnapshotAssembler::new(EngineConfig::default(), ToleranceTable::default())
            .expect("assembler");
        BatchRunner::new(assembler)
    }

    #[test]
    fn isolates_failures_per_symbol() {
        let trending: Vec<f64> = (0..60_i32).map(|i| 100.0 + f64::from(i)).collect();
        let good = Symbol::parse("GOOD").expect("symbol");
        let flat = Symbol::parse("FLAT").expect("symbol");
        let short = Symbol::parse("SHORT").expect("symbol");
        let missing = Symbol::parse("MISSING").expect("symbol");
        let source = InMemoryPriceSource::new()
            .with_series(good.clone(), series(&trending))
            .with_series(flat.clone(), series(&[50.0; 60]))
            .with_series(short.clone(), series(&trending[..20]));

        let as_of = TradingDate::parse("2024-12-31").expect("date");
        let report = runner().run(&source, &[short, missing, good, flat], as_of);

        assert_eq!(report.snapshots.len(), 1);
        assert_eq!(report.snapshots[0].symbol.as_str(), "GOOD");
        assert!(!report.is_complete());

        let codes: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.symbol.as_str(), f.code.as_str()))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("FLAT", "swing.degenerate"),
                ("MISSING", "source.not_found"),
                ("SHORT", "swing.insufficient_data"),
            ]
        );
    }

    #[test]
    fn empty_symbol_list_yields_empty_report() {
        let as_of = TradingDate::parse("2024-12-31").expect("date");
        let report = runner().run(&InMemoryPriceSource::new(), &[], as_of);
        assert!(report.snapshots.is_empty());
        assert!(report.is_complete());
    }
}
