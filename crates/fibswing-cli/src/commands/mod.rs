mod batch;
mod config;
mod levels;
mod pivots;
mod snapshot;

use fibswing_core::{
    CoreError, CsvPriceSource, Envelope, EnvelopeError, EnvelopeMeta, FibswingConfig,
    PriceHistorySource, PriceSeries, SwingError, Symbol, SymbolFailure, TradingDate,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Result for a single-symbol command whose core operation failed.
    pub fn failed(symbol: &Symbol, error: &CoreError) -> Self {
        let failure = SymbolFailure::new(symbol.clone(), error);
        Self::ok(Value::Null).with_errors(vec![EnvelopeError::from(failure)])
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let config = load_config(cli)?;

    let command_result = match &cli.command {
        Command::Snapshot(args) => snapshot::run(args, &config)?,
        Command::Batch(args) => batch::run(args, &config)?,
        Command::Levels(args) => levels::run(args, &config)?,
        Command::Pivots(args) => pivots::run(args, &config)?,
        Command::Config => config::run(&config)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
    } = command_result;

    let mut meta = EnvelopeMeta::generate();
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Built-in defaults, then `--config`, then `--threshold`/`--lookback`.
fn load_config(cli: &Cli) -> Result<FibswingConfig, CliError> {
    let base = match &cli.config {
        Some(path) => FibswingConfig::load(path)?,
        None => FibswingConfig::default(),
    };
    Ok(base.with_overrides(cli.threshold, cli.lookback)?)
}

fn parse_as_of(value: Option<&str>) -> Result<Option<TradingDate>, CliError> {
    value
        .map(TradingDate::parse)
        .transpose()
        .map_err(CliError::from)
}

/// Load history up to `as_of`, or everything when no date was given.
///
/// Returns the resolved date: the explicit one, or the last date in the data.
fn load_history(
    source: &CsvPriceSource,
    symbol: &Symbol,
    as_of: Option<TradingDate>,
    min_points: usize,
) -> Result<(TradingDate, PriceSeries), CoreError> {
    let series = source.history(symbol, as_of.unwrap_or(TradingDate::MAX), min_points)?;
    let resolved = match as_of {
        Some(date) => date,
        None => series
            .last()
            .map(|point| point.date)
            .ok_or_else(|| SwingError::MissingPriceData {
                symbol: symbol.to_string(),
            })?,
    };
    debug!(%symbol, as_of = %resolved, points = series.len(), "history resolved");
    Ok((resolved, series))
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::fs;
    use std::path::Path;

    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    /// 100 -> 200 over 30 days from 2024-01-01, then down to 150 by day 44.
    fn write_rally(dir: &Path, symbol: &str) {
        let mut body = String::from("date,close\n");
        for day in 0..=44_i32 {
            let (date, close) = if day <= 30 {
                (format!("2024-01-{:02}", day + 1), 100.0 + 100.0 * f64::from(day) / 30.0)
            } else {
                (format!("2024-02-{:02}", day - 30), 200.0 - 50.0 * f64::from(day - 30) / 14.0)
            };
            writeln!(body, "{date},{close}").expect("format row");
        }
        fs::write(dir.join(format!("{symbol}.csv")), body).expect("write csv");
    }

    fn run_args(args: &[&str]) -> Envelope<Value> {
        let cli = Cli::try_parse_from(args).expect("parse");
        run(&cli).expect("command")
    }

    #[test]
    fn snapshot_defaults_as_of_to_last_row() {
        let dir = tempdir().expect("tempdir");
        write_rally(dir.path(), "SPY");
        let data_dir = dir.path().to_string_lossy().into_owned();

        let envelope = run_args(&["fibswing", "snapshot", "spy", "--data-dir", &data_dir]);

        assert!(envelope.errors.is_empty());
        assert_eq!(envelope.data["date"], "2024-02-14");
        assert_eq!(envelope.data["swing_position_pct"], 50.0);
        assert_eq!(envelope.meta.schema_version, "v1.0.0");
    }

    #[test]
    fn snapshot_failure_becomes_envelope_error() {
        let dir = tempdir().expect("tempdir");
        let data_dir = dir.path().to_string_lossy().into_owned();

        let envelope = run_args(&["fibswing", "snapshot", "MSFT", "--data-dir", &data_dir]);

        assert!(envelope.data.is_null());
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, "source.not_found");
        assert_eq!(
            envelope.errors[0].symbol.as_ref().map(Symbol::as_str),
            Some("MSFT")
        );
    }

    #[test]
    fn batch_reports_failures_per_symbol() {
        let dir = tempdir().expect("tempdir");
        write_rally(dir.path(), "SPY");
        fs::write(dir.path().join("FLAT.csv"), "date,close\n2024-01-01,5\n").expect("write");
        let data_dir = dir.path().to_string_lossy().into_owned();

        let envelope = run_args(&["fibswing", "batch", "--data-dir", &data_dir]);

        assert_eq!(envelope.data["as_of"], "2024-02-14");
        assert_eq!(envelope.data["snapshots"][0]["symbol"], "SPY");
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, "swing.insufficient_data");
    }

    #[test]
    fn levels_with_price_adds_flags() {
        let envelope = run_args(&[
            "fibswing",
            "levels",
            "--low",
            "100",
            "--high",
            "200",
            "--direction",
            "up",
            "--price",
            "150",
        ]);

        assert_eq!(envelope.data["levels"]["retrace_50"], 150.0);
        assert_eq!(envelope.data["flags"]["near_any_major"], true);
        assert_eq!(envelope.data["nearest_level"]["level"], "retrace_50");
    }

    #[test]
    fn levels_rejects_inverted_swing() {
        let cli = Cli::try_parse_from([
            "fibswing",
            "levels",
            "--low",
            "200",
            "--high",
            "100",
            "--direction",
            "down",
        ])
        .expect("parse");

        let error = run(&cli).expect_err("must fail");
        assert!(matches!(error, CliError::Command(_)));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn pivots_lists_confirmed_pivots_with_dates() {
        let dir = tempdir().expect("tempdir");
        write_rally(dir.path(), "SPY");
        let data_dir = dir.path().to_string_lossy().into_owned();

        let envelope = run_args(&["fibswing", "pivots", "SPY", "--data-dir", &data_dir]);

        assert_eq!(envelope.data["pivots"][0]["kind"], "low");
        assert_eq!(envelope.data["pivots"][0]["date"], "2024-01-01");
        assert_eq!(envelope.data["pivots"][1]["kind"], "high");
        assert_eq!(envelope.data["pivots"][1]["index"], 30);
        assert!(envelope.meta.warnings.is_empty());
    }

    #[test]
    fn config_command_reflects_flag_overrides() {
        let envelope = run_args(&["fibswing", "config", "--lookback", "60"]);

        assert_eq!(envelope.data["engine"]["lookback_window"], 60);
        assert_eq!(envelope.data["engine"]["reversal_threshold"], 0.06);
    }
}
