use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{PriceHistorySource, PricePoint, PriceSeries, SourceError, Symbol, TradingDate};

const DATE_COLUMNS: [&str; 1] = ["date"];
const CLOSE_COLUMNS: [&str; 3] = ["close", "adj_close", "adj close"];

/// Reads `<dir>/<SYMBOL>.csv` files with `date` and `close` columns.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.as_str()))
    }

    /// Symbols for every `*.csv` file in the directory, sorted.
    ///
    /// Files whose stem is not a valid symbol are skipped.
    pub fn symbols(&self) -> Result<Vec<Symbol>, SourceError> {
        let entries = fs::read_dir(&self.dir).map_err(|error| {
            SourceError::unavailable(format!("cannot read '{}': {error}", self.dir.display()))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|error| SourceError::unavailable(error.to_string()))?
                .path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            let parsed = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(Symbol::parse);
            match parsed {
                Some(Ok(symbol)) => symbols.push(symbol),
                _ => debug!(path = %path.display(), "skipping file without a valid symbol name"),
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl PriceHistorySource for CsvPriceSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn history(
        &self,
        symbol: &Symbol,
        as_of: TradingDate,
        _min_points: usize,
    ) -> Result<PriceSeries, SourceError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(SourceError::not_found(symbol));
        }
        let file = File::open(&path).map_err(|error| {
            SourceError::unavailable(format!("cannot open '{}': {error}", path.display()))
        })?;
        let points = read_points(BufReader::new(file), &path, as_of)?;
        debug!(%symbol, points = points.len(), "loaded csv history");

        PriceSeries::new(points).map_err(|error| {
            SourceError::invalid_data(format!("'{}': {error}", path.display()))
        })
    }
}

fn read_points<R: std::io::Read>(
    reader: R,
    path: &Path,
    as_of: TradingDate,
) -> Result<Vec<PricePoint>, SourceError> {
    let invalid =
        |detail: String| SourceError::invalid_data(format!("'{}': {detail}", path.display()));

    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|error| invalid(error.to_string()))?
        .clone();
    let date_idx = find_column(&headers, &DATE_COLUMNS)
        .ok_or_else(|| invalid(String::from("missing 'date' column")))?;
    let close_idx = find_column(&headers, &CLOSE_COLUMNS)
        .ok_or_else(|| invalid(String::from("missing 'close' column")))?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|error| invalid(error.to_string()))?;
        let line = row + 2;

        let date_field = record.get(date_idx).unwrap_or_default();
        let date = TradingDate::parse(date_field)
            .map_err(|error| invalid(format!("line {line}: {error}")))?;
        if date > as_of {
            continue;
        }

        let close_field = record.get(close_idx).unwrap_or_default();
        let close = close_field
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                invalid(format!(
                    "line {line}: close '{close_field}' is not a number"
                ))
            })?;
        let point = PricePoint::new(date, close)
            .map_err(|error| invalid(format!("line {line}: {error}")))?;
        points.push(point);
    }

    Ok(points)
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(candidate))
    })
}
