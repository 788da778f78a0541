//! Line-delimited event stream for `--format ndjson`.

use std::io::Write;

use fibswing_core::{EnvelopeError, UtcDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Chunk,
    Error,
    End,
}

#[derive(Serialize)]
struct Event<'a> {
    event: EventKind,
    seq: u64,
    ts: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a EnvelopeError>,
}

/// Serializes events one per line; `seq` starts at 1 and never repeats.
pub struct NdjsonStreamWriter<W: Write> {
    sink: W,
    seq: u64,
}

impl<W: Write> NdjsonStreamWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, seq: 0 }
    }

    /// Number of events written so far.
    pub fn written(&self) -> u64 {
        self.seq
    }

    pub fn start(&mut self, data: &Value) -> Result<(), CliError> {
        self.write_event(EventKind::Start, Some(data), None)
    }

    pub fn chunk(&mut self, data: &Value) -> Result<(), CliError> {
        self.write_event(EventKind::Chunk, Some(data), None)
    }

    pub fn error(&mut self, error: &EnvelopeError) -> Result<(), CliError> {
        self.write_event(EventKind::Error, None, Some(error))
    }

    pub fn end(&mut self, summary: &Value) -> Result<(), CliError> {
        self.write_event(EventKind::End, Some(summary), None)?;
        self.sink.flush()?;
        Ok(())
    }

    fn write_event(
        &mut self,
        event: EventKind,
        data: Option<&Value>,
        error: Option<&EnvelopeError>,
    ) -> Result<(), CliError> {
        self.seq += 1;
        let line = serde_json::to_string(&Event {
            event,
            seq: self.seq,
            ts: UtcDateTime::now(),
            data,
            error,
        })?;
        writeln!(self.sink, "{line}")?;
        Ok(())
    }
}
