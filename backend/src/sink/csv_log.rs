//! CSV step log writer and reader

use super::{LogSink, SinkError, StepRecord, STEP_LOG_HEADER};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Fresh identifier for a run directory
pub fn new_run_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Step log written as CSV with a header row
pub struct CsvStepLog<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CsvStepLog<W> {
    /// Wrap a writer and emit the header row
    pub fn new(writer: W) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(STEP_LOG_HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Rows written so far (header excluded)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl CsvStepLog<File> {
    /// Create (or truncate) a step log file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        Self::new(File::create(path)?)
    }

    /// Create `<log_dir>/testing_log_<run_id>/step_log_<run_id>.csv`
    ///
    /// Returns the sink and the file path.
    pub fn in_run_directory<P: AsRef<Path>>(
        log_dir: P,
        run_id: &str,
    ) -> Result<(Self, PathBuf), SinkError> {
        let dir = log_dir.as_ref().join(format!("testing_log_{}", run_id));
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("step_log_{}.csv", run_id));
        let sink = Self::create(&path)?;
        info!(path = %path.display(), "Writing step log");
        Ok((sink, path))
    }
}

impl<W: Write> LogSink for CsvStepLog<W> {
    fn record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        self.writer.write_record(record.to_fields())?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a step log back into records
pub fn read_step_log<R: Read>(reader: R) -> Result<Vec<StepRecord>, SinkError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let records = rdr.deserialize().collect::<Result<Vec<StepRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: usize, ttc: f64) -> StepRecord {
        StepRecord {
            episode: 0,
            step,
            bv_x: 1.0 / 3.0,
            bv_y: 4.0,
            bv_speed: 30.0,
            bv_heading: 0.0,
            bv_acceleration: 0.5,
            bv_steering: -1.25,
            av_x: 50.0,
            av_y: 8.0,
            av_speed: 25.0,
            ttc_lon: ttc,
            crash: false,
            distance: 49.8,
        }
    }

    #[test]
    fn test_writes_header_and_fixed_precision_rows() {
        let mut sink = CsvStepLog::new(Vec::new()).unwrap();
        sink.record(&record(1, f64::INFINITY)).unwrap();
        sink.record(&record(2, 9.0)).unwrap();
        assert_eq!(sink.rows(), 2);

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], STEP_LOG_HEADER.join(","));
        assert_eq!(
            lines[1],
            "0,1,0.333333,4.000000,30.000000,0.000000,0.500000,-1.250000,50.000000,8.000000,25.000000,inf,false,49.800000"
        );
        assert!(lines[2].contains(",9.000000,"));
    }

    #[test]
    fn test_read_back_preserves_infinite_ttc() {
        let mut sink = CsvStepLog::new(Vec::new()).unwrap();
        sink.record(&record(1, f64::INFINITY)).unwrap();
        sink.record(&record(2, 3.5)).unwrap();
        let bytes = sink.into_inner().unwrap();

        let rows = read_step_log(bytes.as_slice()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ttc_lon.is_infinite());
        assert_eq!(rows[1].ttc_lon, 3.5);
        assert!((rows[0].bv_x - 0.333333).abs() < 1e-12);
    }

    #[test]
    fn test_run_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let (mut sink, path) = CsvStepLog::in_run_directory(dir.path(), "abc").unwrap();
        sink.record(&record(1, 2.0)).unwrap();
        sink.flush().unwrap();

        assert_eq!(
            path,
            dir.path().join("testing_log_abc").join("step_log_abc.csv")
        );
        let rows = read_step_log(File::open(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
