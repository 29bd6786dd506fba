//! Tab-separated tabular sources
//!
//! Every input file carries a header row naming its columns. A source
//! checks the header against the columns its record type requires and then
//! yields typed records lazily, one per data row.

use super::records::FromRow;
use crate::error::{PipelineError, PipelineResult};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Header of an opened source: column name to field position
#[derive(Debug)]
struct Columns {
    path: PathBuf,
    positions: HashMap<String, usize>,
}

impl Columns {
    fn from_header(path: &Path, header: &StringRecord) -> Self {
        let positions = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), idx))
            .collect();
        Self {
            path: path.to_path_buf(),
            positions,
        }
    }

    fn require(&self, required: &[&str]) -> PipelineResult<()> {
        match required.iter().find(|column| !self.positions.contains_key(**column)) {
            Some(column) => Err(PipelineError::MissingSource {
                path: self.path.clone(),
                reason: format!("required column '{}' not found", column),
            }),
            None => Ok(()),
        }
    }
}

/// One data row, addressed by column name
#[derive(Debug)]
pub struct Row {
    columns: Arc<Columns>,
    record: StringRecord,
    line: u64,
}

impl Row {
    /// Line number of the row in its file (header is line 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Path of the file the row was read from
    pub fn path(&self) -> &Path {
        &self.columns.path
    }

    /// Trimmed cell text. Short rows read as empty cells.
    pub fn text(&self, column: &str) -> &str {
        self.columns
            .positions
            .get(column)
            .and_then(|idx| self.record.get(*idx))
            .unwrap_or("")
    }

    /// Cell text, or `None` when the cell is blank
    pub fn optional_text(&self, column: &str) -> Option<&str> {
        Some(self.text(column)).filter(|value| !value.is_empty())
    }

    /// Parse a key column as a 64-bit integer
    pub fn int_key(&self, column: &str) -> PipelineResult<i64> {
        let raw = self.text(column);
        raw.parse::<i64>().map_err(|_| PipelineError::TypeCoercion {
            path: self.columns.path.clone(),
            line: self.line,
            column: column.to_string(),
            value: if raw.is_empty() { "<missing key>".to_string() } else { raw.to_string() },
            expected: "integer key",
        })
    }

    #[cfg(test)]
    pub(crate) fn from_cells(header: &[&str], cells: &[&str]) -> Self {
        let header = StringRecord::from(header.to_vec());
        Self {
            columns: Arc::new(Columns::from_header(Path::new("test.tsv"), &header)),
            record: StringRecord::from(cells.to_vec()),
            line: 2,
        }
    }
}

/// A tab-separated file yielding records of type `R`
#[derive(Debug)]
pub struct TsvSource<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: FromRow> TsvSource<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and validate its header.
    ///
    /// Each call reopens the file, so a source can be read more than once.
    pub fn records(&self) -> PipelineResult<Records<R>> {
        let file = File::open(&self.path).map_err(|e| PipelineError::MissingSource {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);

        let header = reader.headers().map_err(|e| PipelineError::MissingSource {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let columns = Columns::from_header(&self.path, header);
        columns.require(R::COLUMNS)?;

        debug!("Opened {} with {} columns", self.path.display(), columns.positions.len());

        Ok(Records {
            reader,
            columns: Arc::new(columns),
            finished: false,
            _record: PhantomData,
        })
    }
}

/// Lazy iterator over the records of one source
pub struct Records<R> {
    reader: Reader<File>,
    columns: Arc<Columns>,
    finished: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: FromRow> Iterator for Records<R> {
    type Item = PipelineResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map_or(0, |pos| pos.line());
                let row = Row {
                    columns: Arc::clone(&self.columns),
                    record,
                    line,
                };
                Some(R::from_row(&row))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(PipelineError::MissingSource {
                    path: self.columns.path.clone(),
                    reason: e.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::records::{AssignmentRecord, RegionRecord};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_rows_and_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "Region.csv",
            "SalesTerritoryKey\tRegion\tCountry\tGroup\tExtra\n\
             1\tNorthwest\tUnited States\tNorth America\tx\n\
             \n\
             10\t United Kingdom \tUnited Kingdom\tEurope\ty\n",
        );

        let source = TsvSource::<RegionRecord>::new(&path);
        let records: Vec<RegionRecord> = source
            .records()
            .unwrap()
            .collect::<PipelineResult<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, 1);
        assert_eq!(records[1].key, 10);
        assert_eq!(records[1].name, "United Kingdom");

        // Reopens on every call
        assert_eq!(source.records().unwrap().count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = TsvSource::<RegionRecord>::new(dir.path().join("Region.csv"));
        let err = source.records().err().unwrap();
        assert!(matches!(err, PipelineError::MissingSource { .. }));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "SalespersonRegion.csv", "EmployeeKey\tTerritory\n1\t2\n");

        let err = TsvSource::<AssignmentRecord>::new(&path).records().err().unwrap();
        match err {
            PipelineError::MissingSource { reason, .. } => {
                assert!(reason.contains("SalesTerritoryKey"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_key_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "SalespersonRegion.csv",
            "EmployeeKey\tSalesTerritoryKey\n1\t2\nabc\t3\n",
        );

        let mut records = TsvSource::<AssignmentRecord>::new(&path).records().unwrap();
        assert!(records.next().unwrap().is_ok());
        match records.next().unwrap() {
            Err(PipelineError::TypeCoercion { line, column, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "EmployeeKey");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::from_cells(&["A", "B", "C"], &["7", ""]);
        assert_eq!(row.int_key("A").unwrap(), 7);
        assert_eq!(row.optional_text("B"), None);
        assert_eq!(row.text("C"), "");
        assert!(row.int_key("C").is_err());
    }
}
