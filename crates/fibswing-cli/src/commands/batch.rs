use fibswing_core::{
    BatchRunner, CsvPriceSource, EnvelopeError, FibswingConfig, PriceHistorySource,
    SnapshotAssembler, Symbol, TradingDate,
};
use serde_json::json;

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &BatchArgs, config: &FibswingConfig) -> Result<CommandResult, CliError> {
    let source = CsvPriceSource::new(&args.data_dir);
    let mut symbols = if args.symbols.is_empty() {
        source
            .symbols()
            .map_err(|error| CliError::Command(error.to_string()))?
    } else {
        args.symbols
            .iter()
            .map(|symbol| Symbol::parse(symbol))
            .collect::<Result<Vec<_>, _>>()?
    };
    symbols.sort();
    symbols.dedup();

    if symbols.is_empty() {
        return Ok(CommandResult::ok(json!({ "snapshots": [] })).with_warning(format!(
            "no price files found in '{}'",
            args.data_dir.display()
        )));
    }

    let as_of = match super::parse_as_of(args.as_of.as_deref())? {
        Some(date) => date,
        None => latest_date(&source, &symbols, config.engine.lookback_window)?,
    };

    let runner = BatchRunner::new(SnapshotAssembler::from_config(config)?);
    let report = runner.run(&source, &symbols, as_of);

    let data = json!({
        "as_of": report.as_of,
        "snapshots": report.snapshots,
    });
    let errors = report
        .failures
        .into_iter()
        .map(EnvelopeError::from)
        .collect();
    Ok(CommandResult::ok(data).with_errors(errors))
}

/// Latest date present in any readable file; unreadable files are left to the batch run to report.
fn latest_date(
    source: &CsvPriceSource,
    symbols: &[Symbol],
    min_points: usize,
) -> Result<TradingDate, CliError> {
    symbols
        .iter()
        .filter_map(|symbol| source.history(symbol, TradingDate::MAX, min_points).ok())
        .filter_map(|series| series.last().map(|point| point.date))
        .max()
        .ok_or_else(|| {
            CliError::Command(String::from(
                "no price data found to infer --as-of; pass it explicitly",
            ))
        })
}
