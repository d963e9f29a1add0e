//! Loaders turning a catalog file into a [`RawTable`].

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use calamine::{Data, Range, Reader};
use tracing::{debug, warn};

use crate::{
    config::CatalogConfig,
    error::Result,
    record::{RawRecord, RawTable},
};

/// Delimiters tried when sniffing a delimited file.
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Something that can produce the raw record set of a catalog.
pub trait RecordSource {
    /// Human-readable origin, used in error messages.
    fn describe(&self) -> String;

    fn load(&self) -> Result<RawTable>;
}

/// A delimited text export (CSV, semicolon or tab separated).
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: Option<u8>,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: None,
        }
    }

    /// Use a fixed delimiter instead of sniffing one.
    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawTable> {
        let content = std::fs::read_to_string(&self.path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        parse_delimited(content, self.delimiter)
    }
}

/// Parse delimited text. The delimiter is sniffed from the header line when
/// `delimiter` is `None`.
pub fn parse_delimited(content: &str, delimiter: Option<u8>) -> Result<RawTable> {
    let delimiter = delimiter.unwrap_or_else(|| {
        let header_line = content.lines().next().unwrap_or("");
        sniff_delimiter(header_line)
    });
    debug!(delimiter = %(delimiter as char).escape_default(), "parsing delimited source");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns = unique_columns(reader.headers()?.iter());
    let headers: Vec<String> =
        columns.iter().map(|(_, label)| label.clone()).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let record: RawRecord = columns
            .iter()
            .map(|(idx, label)| {
                (label.as_str(), normalize_cell(row.get(*idx).unwrap_or("")))
            })
            .collect();
        records.push(record);
    }

    debug!(
        columns = headers.len(),
        records = records.len(),
        "parsed delimited source"
    );
    Ok(RawTable::new(headers, records))
}

/// Pick the candidate delimiter occurring most often outside quotes.
/// Ties and lines without any candidate fall back to a comma.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;

    for byte in header_line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes
            && let Some(pos) =
                CANDIDATE_DELIMITERS.iter().position(|&d| d == byte)
        {
            counts[pos] += 1;
        }
    }

    let mut best = 0;
    for (pos, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = pos;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// A JSON export: an array of objects mapping labels to cell values.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawTable> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_json(&content)
    }
}

/// A workbook export (`.xlsx`, `.xls`, `.ods`). Only the first worksheet is
/// read; its first row holds the labels.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for XlsxSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawTable> {
        let bytes = std::fs::read(&self.path)?;
        let mut workbook =
            calamine::open_workbook_auto_from_rs(std::io::Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| calamine::Error::Msg("workbook has no worksheet"))??;
        Ok(parse_sheet(&range))
    }
}

/// Turn a worksheet range into a table, with the same header and cell rules
/// as delimited text.
pub fn parse_sheet(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return RawTable::default();
    };

    let labels: Vec<String> = header_row.iter().map(sheet_cell).collect();
    let columns = unique_columns(labels.iter().map(String::as_str));
    let headers: Vec<String> =
        columns.iter().map(|(_, label)| label.clone()).collect();

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(sheet_cell).collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let record: RawRecord = columns
            .iter()
            .map(|(idx, label)| {
                let cell = cells.get(*idx).map(String::as_str).unwrap_or("");
                (label.as_str(), normalize_cell(cell))
            })
            .collect();
        records.push(record);
    }

    debug!(
        columns = headers.len(),
        records = records.len(),
        "parsed worksheet"
    );
    RawTable::new(headers, records)
}

/// Whole-number floats (how spreadsheets store years) print without a
/// fractional part.
fn sheet_cell(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

/// Parse a JSON array of objects. Strings are kept verbatim, numbers and
/// booleans use their JSON text, and `null` reads as empty.
pub fn parse_json(content: &str) -> Result<RawTable> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(content)?;

    let mut headers = Vec::new();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let mut record = RawRecord::new();
        for (label, value) in row {
            let label = label.trim().to_string();
            if label.is_empty() {
                continue;
            }
            if seen.insert(label.clone()) {
                headers.push(label.clone());
            }
            if !record.insert_first(label.clone(), json_cell(&value)) {
                warn!(label = %label, "duplicate label after trimming, keeping the first");
            }
        }
        records.push(record);
    }

    Ok(RawTable::new(headers, records))
}

fn json_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => normalize_cell(s),
        other => other.to_string(),
    }
}

/// Blank cells read as empty; anything else is kept verbatim.
fn normalize_cell(cell: &str) -> String {
    if cell.trim().is_empty() {
        String::new()
    } else {
        cell.to_string()
    }
}

/// Trim header labels and keep the first column of each label.
fn unique_columns<'a>(
    labels: impl Iterator<Item = &'a str>,
) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for (idx, raw) in labels.enumerate() {
        let label = raw.trim();
        if label.is_empty() {
            debug!(column = idx, "skipping column with a blank header");
            continue;
        }
        if !seen.insert(label.to_string()) {
            warn!(label, column = idx, "duplicate header, keeping the first");
            continue;
        }
        columns.push((idx, label.to_string()));
    }

    columns
}

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Open the loader matching a file's extension: `.json` reads JSON, workbook
/// extensions read the first worksheet, anything else is treated as
/// delimited text.
pub fn open_source(
    path: &Path,
    config: &CatalogConfig,
) -> Box<dyn RecordSource> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ext == "json" {
        Box::new(JsonSource::new(path))
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        Box::new(XlsxSource::new(path))
    } else {
        Box::new(CsvSource::new(path).with_delimiter(config.delimiter_byte()))
    }
}
