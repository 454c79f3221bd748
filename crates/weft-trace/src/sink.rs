//! Trace sinks: where begin/end/exception records go.
//!
//! `emit` is infallible by contract. Sinks that can fail internally (file
//! writes, serialization) swallow those failures; only sink construction
//! returns an error.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::TraceRecord;

/// Error type for sink construction and offline record reading.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for trace records.
pub trait TraceSink: Send + Sync {
    /// Emit one record. Must not panic and must not propagate failures.
    fn emit(&self, record: &TraceRecord);
}

/// Default sink: one `tracing` info line per record, with structured fields
/// for log-based correlation tooling.
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&self, record: &TraceRecord) {
        tracing::info!(
            trace_id = %record.trace_id,
            level = record.level,
            direction = record.direction.marker(),
            "{}",
            record.render()
        );
    }
}

/// In-memory sink for tests and in-process inspection.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<TraceRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

impl TraceSink for MemorySink {
    fn emit(&self, record: &TraceRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// File sink: appends one JSON object per record.
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<std::fs::File>,
}

impl JsonlSink {
    /// Open (or create) the record file, creating parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read records back from a file, skipping blank lines.
    pub fn read_records(path: &Path) -> Result<Vec<TraceRecord>, SinkError> {
        let content = fs::read_to_string(path)?;
        let records: Result<Vec<TraceRecord>, _> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect();
        Ok(records?)
    }
}

impl TraceSink for JsonlSink {
    fn emit(&self, record: &TraceRecord) {
        // Write failures are swallowed: telemetry never affects the call.
        if let Ok(line) = serde_json::to_string(record) {
            let mut file = self.file.lock().unwrap();
            let _ = writeln!(file, "{}", line);
        }
    }
}
