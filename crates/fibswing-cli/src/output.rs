pub mod stream_writer;

use std::io;

use fibswing_core::Envelope;
use serde_json::{json, Number, Value};

use self::stream_writer::NdjsonStreamWriter;
use crate::cli::OutputFormat;
use crate::error::CliError;

const TABLE_DECIMALS: i32 = 4;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => render_stream(envelope)?,
        OutputFormat::Table => render_table(envelope)?,
    }

    Ok(())
}

/// Emit the envelope as `start`, `chunk`, `error`, `end` events.
///
/// Batch results produce one chunk per snapshot; everything else is a single chunk.
fn render_stream(envelope: &Envelope<Value>) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_stream(envelope, stdout.lock())
}

fn write_stream<W: io::Write>(envelope: &Envelope<Value>, sink: W) -> Result<(), CliError> {
    let mut writer = NdjsonStreamWriter::new(sink);

    writer.start(&json!({
        "request_id": envelope.meta.request_id,
        "schema_version": envelope.meta.schema_version,
    }))?;

    let chunks: &[Value] = match envelope.data.get("snapshots").and_then(Value::as_array) {
        Some(snapshots) => snapshots,
        None if envelope.data.is_null() => &[],
        None => std::slice::from_ref(&envelope.data),
    };
    for chunk in chunks {
        writer.chunk(chunk)?;
    }

    for error in &envelope.errors {
        writer.error(error)?;
    }

    writer.end(&json!({
        "status": if envelope.errors.is_empty() { "ok" } else { "error" },
        "chunk_count": chunks.len(),
        "warnings": envelope.meta.warnings,
        "error_count": envelope.errors.len(),
    }))
}

fn render_table(envelope: &Envelope<Value>) -> Result<(), CliError> {
    println!("request_id  : {}", envelope.meta.request_id);
    println!("schema      : {}", envelope.meta.schema_version);
    println!("generated_at: {}", envelope.meta.generated_at);

    if !envelope.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }

    println!("data:");
    let pretty_data = serde_json::to_string_pretty(&round_numbers(&envelope.data))?;
    for line in pretty_data.lines() {
        println!("  {line}");
    }

    if !envelope.errors.is_empty() {
        println!("errors:");
        for error in &envelope.errors {
            match &error.symbol {
                Some(symbol) => println!("  - [{symbol}] {}: {}", error.code, error.message),
                None => println!("  - {}: {}", error.code, error.message),
            }
        }
    }

    Ok(())
}

/// Copy of `value` with every non-integer number rounded for display.
fn round_numbers(value: &Value) -> Value {
    match value {
        Value::Number(number) if number.is_f64() => number
            .as_f64()
            .map(round_display)
            .and_then(Number::from_f64)
            .map_or_else(|| value.clone(), Value::Number),
        Value::Array(items) => Value::Array(items.iter().map(round_numbers).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), round_numbers(field)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn round_display(value: f64) -> f64 {
    let scale = 10_f64.powi(TABLE_DECIMALS);
    (value * scale).round() / scale
}
