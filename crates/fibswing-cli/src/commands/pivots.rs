use fibswing_core::{CoreError, CsvPriceSource, FibswingConfig, PricePoint, Symbol, TradingDate};
use serde_json::{json, Value};

use crate::cli::PivotsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &PivotsArgs, config: &FibswingConfig) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let as_of = super::parse_as_of(args.as_of.as_deref())?;
    let detector = config.engine.detector()?;
    let source = CsvPriceSource::new(&args.data_dir);

    let outcome = super::load_history(&source, &symbol, as_of, config.engine.lookback_window)
        .and_then(|(as_of, series)| {
            let points = series.up_to(as_of);
            let window = detector.window(points)?;
            let pivots = detector.pivots(points)?;
            let rows: Vec<Value> = pivots
                .iter()
                .map(|pivot| {
                    json!({
                        "index": pivot.index,
                        "date": window[pivot.index].date,
                        "kind": pivot.kind,
                        "price": pivot.price,
                    })
                })
                .collect();
            Ok::<_, CoreError>((as_of, window_bounds(window), rows))
        });

    let (as_of, (start, end), rows) = match outcome {
        Ok(resolved) => resolved,
        Err(error) => return Ok(CommandResult::failed(&symbol, &error)),
    };

    let confirmed = rows.len();
    let result = CommandResult::ok(json!({
        "symbol": symbol,
        "as_of": as_of,
        "window_start": start,
        "window_end": end,
        "reversal_threshold": detector.reversal_threshold(),
        "pivots": rows,
    }));

    Ok(if confirmed < 2 {
        result.with_warning(format!(
            "only {confirmed} confirmed pivot(s); snapshots fall back to window extrema"
        ))
    } else {
        result
    })
}

fn window_bounds(window: &[PricePoint]) -> (Option<TradingDate>, Option<TradingDate>) {
    (
        window.first().map(|point| point.date),
        window.last().map(|point| point.date),
    )
}
