use fibswing_core::{CsvPriceSource, FibswingConfig, SnapshotAssembler, Symbol};

use crate::cli::SnapshotArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &SnapshotArgs, config: &FibswingConfig) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let as_of = super::parse_as_of(args.as_of.as_deref())?;
    let assembler = SnapshotAssembler::from_config(config)?;
    let source = CsvPriceSource::new(&args.data_dir);

    let outcome = super::load_history(&source, &symbol, as_of, config.engine.lookback_window)
        .and_then(|(as_of, series)| assembler.assemble(&symbol, as_of, &series));

    match outcome {
        Ok(snapshot) => Ok(CommandResult::ok(serde_json::to_value(snapshot)?)),
        Err(error) => Ok(CommandResult::failed(&symbol, &error)),
    }
}
