use fibswing_core::{
    Direction, FibonacciCalculator, FibswingConfig, NearestLevel, ProximityEvaluator, Symbol,
};
use serde_json::json;

use crate::cli::LevelsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &LevelsArgs, config: &FibswingConfig) -> Result<CommandResult, CliError> {
    if !args.low.is_finite() || !args.high.is_finite() {
        return Err(CliError::Command(String::from(
            "--low and --high must be finite numbers",
        )));
    }

    let direction = Direction::from(args.direction);
    let levels = FibonacciCalculator::new()
        .levels_for(args.low, args.high, direction)
        .map_err(|error| CliError::Command(error.to_string()))?;

    let symbol = args.symbol.as_deref().map(Symbol::parse).transpose()?;

    let mut data = json!({
        "swing_low": args.low,
        "swing_high": args.high,
        "direction": direction.as_str(),
        "levels": levels,
    });

    let Some(price) = args.price else {
        let result = CommandResult::ok(data);
        return Ok(match symbol {
            Some(_) => result.with_warning("--symbol has no effect without --price"),
            None => result,
        });
    };
    if !price.is_finite() {
        return Err(CliError::Command(String::from(
            "--price must be a finite number",
        )));
    }

    let profile = match &symbol {
        Some(symbol) => config.tolerances.profile_for(symbol),
        None => config.tolerances.default_profile(),
    };
    let flags = ProximityEvaluator::new().evaluate(price, &levels, profile);

    data["current_price"] = json!(price);
    data["flags"] = serde_json::to_value(flags)?;
    data["nearest_level"] = serde_json::to_value(NearestLevel::find(&levels, price))?;
    if let Some(symbol) = symbol {
        data["symbol"] = json!(symbol);
    }

    Ok(CommandResult::ok(data))
}
