//! Sink picked at run time
//!
//! Callers that cannot name a sink type (the Python bindings) hold a
//! `StepSink`: rows either stay in memory until drained, or go straight to a
//! CSV step log in a fresh run directory.

use super::{new_run_id, CsvStepLog, LogSink, MemorySink, SinkError, StepRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

pub enum StepSink {
    Memory(MemorySink),
    Csv {
        log: CsvStepLog<File>,
        path: PathBuf,
        run_id: String,
    },
}

impl StepSink {
    pub fn memory() -> Self {
        StepSink::Memory(MemorySink::new())
    }

    /// Write to `<log_dir>/testing_log_<run_id>/step_log_<run_id>.csv`
    pub fn csv_in_run_directory<P: AsRef<Path>>(log_dir: P) -> Result<Self, SinkError> {
        let run_id = new_run_id();
        let (log, path) = CsvStepLog::in_run_directory(log_dir, &run_id)?;
        Ok(StepSink::Csv { log, path, run_id })
    }

    /// CSV sink when a log directory is given, memory otherwise
    pub fn open(log_dir: Option<&Path>) -> Result<Self, SinkError> {
        match log_dir {
            Some(dir) => Self::csv_in_run_directory(dir),
            None => Ok(Self::memory()),
        }
    }

    /// Step log file, if rows go to disk
    pub fn path(&self) -> Option<&Path> {
        match self {
            StepSink::Memory(_) => None,
            StepSink::Csv { path, .. } => Some(path.as_path()),
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        match self {
            StepSink::Memory(_) => None,
            StepSink::Csv { run_id, .. } => Some(run_id.as_str()),
        }
    }

    /// Rows held in memory; always empty for the CSV sink
    pub fn records(&self) -> &[StepRecord] {
        match self {
            StepSink::Memory(memory) => memory.records(),
            StepSink::Csv { .. } => &[],
        }
    }

    /// Take the rows held in memory, leaving the sink empty
    pub fn drain(&mut self) -> Vec<StepRecord> {
        match self {
            StepSink::Memory(memory) => memory.take(),
            StepSink::Csv { .. } => Vec::new(),
        }
    }

    /// Rows written to the CSV file
    pub fn rows_written(&self) -> usize {
        match self {
            StepSink::Memory(_) => 0,
            StepSink::Csv { log, .. } => log.rows(),
        }
    }
}

impl LogSink for StepSink {
    fn record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        match self {
            StepSink::Memory(memory) => memory.record(record),
            StepSink::Csv { log, .. } => log.record(record),
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        match self {
            StepSink::Memory(memory) => memory.flush(),
            StepSink::Csv { log, .. } => log.flush(),
        }
    }
}
