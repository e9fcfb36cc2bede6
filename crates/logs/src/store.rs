use chrono::{Local, NaiveDateTime, Timelike};
use csv::StringRecord;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use summarybench_common::{Result, SummaryBenchError};
use tracing::{debug, info, warn};

/// Column layout version shared by both logs
pub const SCHEMA_VERSION: u32 = 1;

/// Wall-clock timestamp format used in every log row
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Spellings accepted on read; spreadsheet re-saves often drop the seconds
const LENIENT_TIMESTAMP_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a timestamp cell, trying the written format first
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    LENIENT_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cell.trim(), format).ok())
}

/// Timestamp cell as written; empty when the time is unknown
pub fn timestamp_cell(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Local wall-clock time truncated to whole seconds
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Shortest round-trip form, with a trailing `.0` for integral values
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// A categorical cell: a known value, or raw text this build does not recognise
///
/// Hand-edited or older logs may carry values outside the current enums;
/// those rows are kept and their text is carried through to the summaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Recorded<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: FromStr> Recorded<T> {
    pub fn parse(cell: &str) -> Self {
        cell.parse::<T>()
            .map(Recorded::Known)
            .unwrap_or_else(|_| Recorded::Unrecognized(cell.trim().to_string()))
    }
}

impl<T> Recorded<T> {
    /// Unrecognised and empty
    pub fn is_blank(&self) -> bool {
        matches!(self, Recorded::Unrecognized(raw) if raw.is_empty())
    }
}

impl<T> From<T> for Recorded<T> {
    fn from(value: T) -> Self {
        Recorded::Known(value)
    }
}

impl<T: fmt::Display> fmt::Display for Recorded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recorded::Known(value) => value.fmt(f),
            Recorded::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// A row type with a fixed, ordered column schema
pub trait LogRecord: Sized {
    /// Column names in persisted order
    const COLUMNS: &'static [&'static str];

    /// Encode as cells in `COLUMNS` order
    fn to_row(&self) -> Vec<String>;

    /// Decode a row; `None` when the row is unreadable as a whole
    fn from_row(row: &RowView<'_>) -> Option<Self>;
}

/// Append-only store of records
pub trait LogStore<R>: Send + Sync {
    /// Persist one record after all previous ones
    fn append(&self, record: &R) -> Result<()>;

    /// Every readable record, in append order
    fn read_all(&self) -> Result<Vec<R>>;
}

/// One data row addressed by header name
pub struct RowView<'a> {
    headers: &'a StringRecord,
    cells: &'a StringRecord,
}

impl<'a> RowView<'a> {
    pub fn new(headers: &'a StringRecord, cells: &'a StringRecord) -> Self {
        Self { headers, cells }
    }

    /// Raw cell, trimmed
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h.trim() == column)?;
        self.cells.get(index).map(str::trim)
    }

    pub fn f64_opt(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(|cell| cell.parse::<f64>().ok())
    }

    /// Parsed float, `0.0` when missing or malformed
    pub fn f64_or_zero(&self, column: &str) -> f64 {
        self.f64_opt(column).unwrap_or_else(|| {
            debug!("Column '{}' unreadable, using 0.0", column);
            0.0
        })
    }

    /// Parsed count; accepts float spellings such as `12.0`
    pub fn usize_or_zero(&self, column: &str) -> usize {
        let Some(cell) = self.get(column) else {
            return 0;
        };
        cell.parse::<usize>()
            .ok()
            .or_else(|| {
                cell.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as usize)
            })
            .unwrap_or(0)
    }

    pub fn timestamp(&self, column: &str) -> Option<NaiveDateTime> {
        self.get(column).and_then(parse_timestamp)
    }

    /// Categorical cell; a missing cell reads as blank
    pub fn recorded<T: FromStr>(&self, column: &str) -> Recorded<T> {
        Recorded::parse(self.get(column).unwrap_or_default())
    }

    /// Every cell empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }
}

fn column_header<R: LogRecord>() -> StringRecord {
    StringRecord::from(R::COLUMNS.to_vec())
}

/// Decode rows, skipping the ones that cannot be read at all
fn decode_rows<R, I>(headers: &StringRecord, rows: I, source: &str) -> Vec<R>
where
    R: LogRecord,
    I: IntoIterator<Item = std::result::Result<StringRecord, csv::Error>>,
{
    let mut records = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(cells) => match R::from_row(&RowView::new(headers, &cells)) {
                Some(record) => records.push(record),
                None => warn!("Skipping unreadable row {} in {}", index + 1, source),
            },
            Err(e) => warn!("Skipping malformed row {} in {}: {}", index + 1, source, e),
        }
    }
    records
}

/// CSV file backed log
///
/// The file is created with the column header on first append; later
/// appends open it in append mode and never touch earlier rows.
pub struct CsvLog<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: LogRecord> CsvLog<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }
}

impl<R: LogRecord> LogStore<R> for CsvLog<R> {
    fn append(&self, record: &R) -> Result<()> {
        let write_header = self.needs_header();
        if write_header {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                SummaryBenchError::log(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);

        if write_header {
            writer.write_record(R::COLUMNS)?;
            info!(
                "Created log {} (schema v{}, {} columns)",
                self.path.display(),
                SCHEMA_VERSION,
                R::COLUMNS.len()
            );
        }

        writer.write_record(record.to_row())?;
        writer.flush()?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if !headers.iter().map(str::trim).eq(R::COLUMNS.iter().copied()) {
            warn!(
                "Header of {} differs from schema v{}, reading columns by name",
                self.path.display(),
                SCHEMA_VERSION
            );
        }

        let source = self.path.display().to_string();
        let records = decode_rows(&headers, reader.records(), &source);
        debug!("Read {} records from {}", records.len(), source);
        Ok(records)
    }
}

/// In-memory log holding encoded rows, so readers see exactly what a file would hold
pub struct MemoryLog<R> {
    rows: Mutex<Vec<StringRecord>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: LogRecord> MemoryLog<R> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            _record: PhantomData,
        }
    }

    /// Append raw cells, bypassing encoding (e.g. to replay hand-edited rows)
    pub fn push_raw(&self, cells: &[&str]) -> Result<()> {
        self.lock()?.push(StringRecord::from(cells.to_vec()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StringRecord>>> {
        self.rows
            .lock()
            .map_err(|_| SummaryBenchError::internal("memory log lock poisoned"))
    }
}

impl<R: LogRecord> Default for MemoryLog<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LogRecord> LogStore<R> for MemoryLog<R> {
    fn append(&self, record: &R) -> Result<()> {
        self.lock()?.push(StringRecord::from(record.to_row()));
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<R>> {
        let rows = self.lock()?;
        let headers = column_header::<R>();
        Ok(decode_rows(&headers, rows.iter().cloned().map(Ok), "memory log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        label: String,
        value: f64,
    }

    impl LogRecord for Point {
        const COLUMNS: &'static [&'static str] = &["label", "value"];

        fn to_row(&self) -> Vec<String> {
            vec![self.label.clone(), format_float(self.value)]
        }

        fn from_row(row: &RowView<'_>) -> Option<Self> {
            let label = row.get("label").filter(|l| !l.is_empty())?.to_string();
            Some(Self { label, value: row.f64_or_zero("value") })
        }
    }

    fn point(label: &str, value: f64) -> Point {
        Point { label: label.to_string(), value }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(75.0), "75.0");
        assert_eq!(format_float(0.45), "0.45");
        assert_eq!(format_float(0.0005), "0.0005");
    }

    #[test]
    fn test_now_timestamp_round_trips_through_format() {
        let now = now_timestamp();
        let text = now.format(TIMESTAMP_FORMAT).to_string();
        assert_eq!(NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).unwrap(), now);
    }

    #[test]
    fn test_timestamp_spellings() {
        let expected =
            NaiveDateTime::parse_from_str("2024-05-01 09:31:00", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parse_timestamp("2024-05-01 09:31:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 09:31"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T09:31:00"), Some(expected));
        assert_eq!(parse_timestamp("2024/05/01 09:31"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);

        assert_eq!(timestamp_cell(Some(expected)), "2024-05-01 09:31:00");
        assert_eq!(timestamp_cell(None), "");
    }

    #[test]
    fn test_recorded_cells() {
        use summarybench_common::Tone;

        assert_eq!(Recorded::<Tone>::parse("casual"), Recorded::Known(Tone::Casual));
        assert_eq!(
            Recorded::<Tone>::parse(" Formal "),
            Recorded::Unrecognized("Formal".to_string())
        );
        assert_eq!(Recorded::<Tone>::parse("Formal").to_string(), "Formal");
        assert_eq!(Recorded::Known(Tone::Academic).to_string(), "Academic");
        assert!(Recorded::<Tone>::parse("").is_blank());
        assert!(!Recorded::<Tone>::parse("Formal").is_blank());
    }

    #[test]
    fn test_csv_log_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("points.csv");
        let log: CsvLog<Point> = CsvLog::new(&path);

        log.append(&point("a", 1.0)).unwrap();
        log.append(&point("b", 0.25)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "label,value\r\na,1.0\r\nb,0.25\r\n");
    }

    #[test]
    fn test_csv_log_appends_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        let log: CsvLog<Point> = CsvLog::new(&path);

        log.append(&point("a", 1.0)).unwrap();
        let before = std::fs::read(&path).unwrap();
        log.append(&point("b", 2.0)).unwrap();
        let after = std::fs::read(&path).unwrap();

        assert!(after.starts_with(&before));
        assert_eq!(log.read_all().unwrap(), vec![point("a", 1.0), point("b", 2.0)]);
    }

    #[test]
    fn test_csv_log_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log: CsvLog<Point> = CsvLog::new(dir.path().join("absent.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_csv_log_tolerates_edited_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "label,value\na,oops\n,3.0\nb\nc,4.5,extra\n").unwrap();

        let log: CsvLog<Point> = CsvLog::new(&path);
        let points = log.read_all().unwrap();

        // malformed value zero-filled, unlabeled row skipped, short row zero-filled
        assert_eq!(points, vec![point("a", 0.0), point("b", 0.0), point("c", 4.5)]);
    }

    #[test]
    fn test_csv_log_reads_reordered_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        std::fs::write(&path, "value,label\n2.5,z\n").unwrap();

        let log: CsvLog<Point> = CsvLog::new(&path);
        assert_eq!(log.read_all().unwrap(), vec![point("z", 2.5)]);
    }

    #[test]
    fn test_memory_log_matches_file_semantics() {
        let log: MemoryLog<Point> = MemoryLog::new();
        assert!(log.is_empty());

        log.append(&point("a", 1.5)).unwrap();
        log.push_raw(&["", "9.0"]).unwrap();
        log.push_raw(&["b", "NaN?"]).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.read_all().unwrap(), vec![point("a", 1.5), point("b", 0.0)]);
    }

    #[test]
    fn test_usize_accepts_float_spelling() {
        let headers = StringRecord::from(vec!["n"]);
        let cells = StringRecord::from(vec!["12.0"]);
        assert_eq!(RowView::new(&headers, &cells).usize_or_zero("n"), 12);

        let cells = StringRecord::from(vec!["-3"]);
        assert_eq!(RowView::new(&headers, &cells).usize_or_zero("n"), 0);
    }
}
