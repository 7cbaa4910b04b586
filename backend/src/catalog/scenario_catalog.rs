//! Round-robin scenario catalog

use super::source::{parse_records, CatalogError};
use crate::models::ScenarioRecord;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Outcome of one catalog draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    /// The record handed out
    pub record: ScenarioRecord,
    /// Position of the record in the catalog
    pub index: usize,
    /// True when this draw starts a new pass, i.e. hands out record 0 again
    pub cycle_restarted: bool,
}

/// Ordered, validated set of scenario records with a wrapping cursor
///
/// # Determinism
///
/// Records are handed out in file order. After the last record the cursor
/// wraps to the first one, so a campaign of any length replays the same
/// fixed scenario sequence.
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::{ScenarioCatalog, ScenarioRecord};
///
/// let mut catalog = ScenarioCatalog::from_records(vec![
///     ScenarioRecord::new(50.0, 30.0, 25.0, 1),
///     ScenarioRecord::new(20.0, 28.0, 27.0, -1),
/// ])
/// .unwrap();
///
/// assert_eq!(catalog.next().initial_gap(), 50.0);
/// assert_eq!(catalog.next().initial_gap(), 20.0);
/// assert_eq!(catalog.next().initial_gap(), 50.0); // wrapped
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    records: Vec<ScenarioRecord>,
    /// Index of the record the next draw returns; always < records.len()
    cursor: usize,
    cycles_completed: usize,
    fingerprint: String,
}

impl ScenarioCatalog {
    /// Load and validate a scenario CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            scenarios = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            "Loaded scenario catalog"
        );
        Ok(catalog)
    }

    /// Load from any CSV byte stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::from_records(parse_records(reader)?)
    }

    /// Build from already-parsed records
    ///
    /// # Errors
    /// `CatalogError::Empty` if `records` is empty: an empty catalog has no
    /// record to return from `next`.
    pub fn from_records(records: Vec<ScenarioRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        let fingerprint = compute_fingerprint(&records);
        Ok(Self {
            records,
            cursor: 0,
            cycles_completed: 0,
            fingerprint,
        })
    }

    /// Return the record at the cursor and advance, wrapping at the end
    pub fn next(&mut self) -> ScenarioRecord {
        self.draw().record
    }

    /// Like [`next`](Self::next) but also reports position and wrap-around
    pub fn draw(&mut self) -> Draw {
        let index = self.cursor;
        let record = self.records[index];
        let cycle_restarted = index == 0 && self.cycles_completed > 0;

        self.cursor += 1;
        if self.cursor == self.records.len() {
            self.cursor = 0;
            self.cycles_completed += 1;
            info!(
                cycles_completed = self.cycles_completed,
                scenarios = self.records.len(),
                "Scenario catalog exhausted, starting new cycle"
            );
        }

        Draw {
            record,
            index,
            cycle_restarted,
        }
    }

    /// Position the catalog as if `draws` records had been drawn since load
    pub(crate) fn seek(&mut self, draws: usize) {
        self.cursor = draws % self.records.len();
        self.cycles_completed = draws / self.records.len();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index the next draw will return
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of full passes over the catalog so far
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }

    /// Total draws made since load
    pub fn draws(&self) -> usize {
        self.cycles_completed * self.records.len() + self.cursor
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ScenarioRecord> {
        self.records.get(index)
    }

    /// SHA256 over the record contents, hex encoded
    ///
    /// Two catalogs with the same records in the same order share a
    /// fingerprint regardless of formatting in the source file.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn compute_fingerprint(records: &[ScenarioRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(record.initial_gap().to_le_bytes());
        hasher.update(record.aggressor_speed().to_le_bytes());
        hasher.update(record.target_speed().to_le_bytes());
        hasher.update(record.lane_offset().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_records() -> Vec<ScenarioRecord> {
        vec![
            ScenarioRecord::new(10.0, 30.0, 25.0, 1),
            ScenarioRecord::new(20.0, 31.0, 26.0, -1),
            ScenarioRecord::new(30.0, 32.0, 27.0, 1),
        ]
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = ScenarioCatalog::from_records(vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_restart_reported_on_first_record_of_next_pass() {
        let mut catalog = ScenarioCatalog::from_records(three_records()).unwrap();

        assert!(!catalog.draw().cycle_restarted);
        assert!(!catalog.draw().cycle_restarted);
        let last = catalog.draw();
        assert!(!last.cycle_restarted);
        assert_eq!(last.index, 2);
        // Cursor wraps as soon as the last record is handed out
        assert_eq!(catalog.cursor(), 0);
        assert_eq!(catalog.cycles_completed(), 1);
        assert_eq!(catalog.draws(), 3);

        let first = catalog.draw();
        assert!(first.cycle_restarted);
        assert_eq!(first.index, 0);
    }

    #[test]
    fn test_single_record_catalog_always_wraps() {
        let mut catalog =
            ScenarioCatalog::from_records(vec![ScenarioRecord::new(5.0, 1.0, 1.0, 0)]).unwrap();
        for n in 1..=5 {
            let draw = catalog.draw();
            assert_eq!(draw.index, 0);
            assert_eq!(draw.cycle_restarted, n > 1);
            assert_eq!(catalog.cycles_completed(), n);
        }
    }

    #[test]
    fn test_seek_matches_drawing() {
        let mut drawn = ScenarioCatalog::from_records(three_records()).unwrap();
        for _ in 0..7 {
            drawn.next();
        }

        let mut seeked = ScenarioCatalog::from_records(three_records()).unwrap();
        seeked.seek(7);

        assert_eq!(seeked.cursor(), drawn.cursor());
        assert_eq!(seeked.cycles_completed(), drawn.cycles_completed());
        assert_eq!(seeked.draws(), 7);
        assert_eq!(seeked.draw(), drawn.draw());
    }

    #[test]
    fn test_seek_far_ahead_is_immediate() {
        let mut catalog = ScenarioCatalog::from_records(three_records()).unwrap();
        catalog.seek(1_000_000_000_000_001);

        assert_eq!(catalog.cursor(), 2);
        assert_eq!(catalog.cycles_completed(), 333_333_333_333_333);
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let forward = ScenarioCatalog::from_records(three_records()).unwrap();
        let mut reversed_records = three_records();
        reversed_records.reverse();
        let reversed = ScenarioCatalog::from_records(reversed_records).unwrap();

        assert_eq!(forward.fingerprint().len(), 64);
        assert_ne!(forward.fingerprint(), reversed.fingerprint());
        assert_eq!(
            forward.fingerprint(),
            ScenarioCatalog::from_records(three_records()).unwrap().fingerprint()
        );
    }
}
