use fibswing_core::FibswingConfig;

use crate::error::CliError;

use super::CommandResult;

pub fn run(config: &FibswingConfig) -> Result<CommandResult, CliError> {
    Ok(CommandResult::ok(serde_json::to_value(config)?))
}
