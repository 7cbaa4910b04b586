//! In-memory sink, mainly for tests and Python callers

use super::{LogSink, SinkError, StepRecord};

/// Keeps every record in a vector
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<StepRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Records belonging to one episode
    pub fn episode(&self, episode: usize) -> Vec<&StepRecord> {
        self.records.iter().filter(|r| r.episode == episode).collect()
    }

    /// Hand back every record kept so far and start empty
    pub fn take(&mut self) -> Vec<StepRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl LogSink for MemorySink {
    fn record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}
