//! Advisory record sinks
//!
//! - [`JsonLinesSink`]: append-only file, one JSON record per line
//! - [`MemorySink`]: in-process vector, for tests and library callers
//! - [`read_records`]: reads a JSON-lines file back for aggregation

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::record::AdvisoryRecord;

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Malformed record at {path}:{line}: {source}")]
    Malformed {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Sink '{0}' is closed")]
    Closed(String),
}

/// Destination for advisory records
pub trait AdvisorySink {
    /// Persists one record. The record must be durable when this returns.
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()>;

    /// Names the sink in error messages
    fn describe(&self) -> String;
}

impl<S: AdvisorySink + ?Sized> AdvisorySink for &mut S {
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()> {
        (**self).record(record)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Append-only JSON-lines file
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    /// Opens or creates the file, appending to existing content
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl AdvisorySink for JsonLinesSink {
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()> {
        let line = record.to_json_line()?;
        writeln!(self.writer, "{}", line).map_err(|e| self.io_error(e))?;
        self.writer.flush().map_err(|e| self.io_error(e))?;
        self.writer.get_ref().sync_data().map_err(|e| self.io_error(e))
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<AdvisoryRecord>,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every write, as a misconfigured destination would
    pub fn closed() -> Self {
        Self {
            records: Vec::new(),
            closed: true,
        }
    }

    pub fn records(&self) -> &[AdvisoryRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AdvisoryRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AdvisorySink for MemorySink {
    fn record(&mut self, record: &AdvisoryRecord) -> SinkResult<()> {
        if self.closed {
            return Err(SinkError::Closed(self.describe()));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Reads every record from a JSON-lines file. Blank lines are skipped.
pub fn read_records(path: impl AsRef<Path>) -> SinkResult<Vec<AdvisoryRecord>> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| SinkError::Io {
        path: display.clone(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| SinkError::Io {
            path: display.clone(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| SinkError::Malformed {
            path: display.clone(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
