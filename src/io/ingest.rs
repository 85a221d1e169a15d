//! Table ingest for light curves and minima lists.
//!
//! Tables are plain numeric text:
//! - comma, tab or whitespace delimited (runs of whitespace count as one)
//! - `#` starts a comment line
//! - an optional header row is detected when the first row is not numeric
//!
//! Bad rows are skipped and reported with their line number instead of
//! failing the whole file. Fitting logic does not live here.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::data::Series;
use crate::domain::Minimum;
use crate::error::OcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Whitespace,
    Comma,
    Tab,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Whitespace => b' ',
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Zero-based column positions of a light-curve table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub time: usize,
    pub brightness: usize,
    /// Without an error column every sample gets zero error.
    pub error: Option<usize>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            time: 0,
            brightness: 1,
            error: Some(2),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed light-curve columns plus ingest bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct LightCurveTable {
    pub time: Vec<f64>,
    pub brightness: Vec<f64>,
    pub error: Vec<f64>,
    pub header: Option<Vec<String>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl LightCurveTable {
    pub fn to_series(&self) -> Result<Series, OcError> {
        Series::new(&self.time, &self.brightness, &self.error)
    }
}

/// Minima times with optional errors (second column).
#[derive(Debug, Clone, Default)]
pub struct MinimaTable {
    pub times: Vec<f64>,
    pub errors: Option<Vec<f64>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl MinimaTable {
    pub fn minima(&self) -> Vec<Minimum> {
        match &self.errors {
            Some(errors) => self
                .times
                .iter()
                .zip(errors)
                .map(|(&time, &error)| Minimum { time, error })
                .collect(),
            None => self.times.iter().map(|&time| Minimum { time, error: 0.0 }).collect(),
        }
    }
}

pub fn read_light_curve(path: &Path, delimiter: Delimiter, columns: Columns) -> Result<LightCurveTable, OcError> {
    let text = read_text(path)?;
    parse_light_curve(&text, delimiter, columns)
}

pub fn parse_light_curve(text: &str, delimiter: Delimiter, columns: Columns) -> Result<LightCurveTable, OcError> {
    let mut wanted = vec![columns.time, columns.brightness];
    wanted.extend(columns.error);
    let parsed = parse_table(text, delimiter, &wanted)?;

    let mut table = LightCurveTable {
        header: parsed.header,
        row_errors: parsed.row_errors,
        rows_read: parsed.rows_read,
        ..LightCurveTable::default()
    };
    for row in parsed.rows {
        table.time.push(row[0]);
        table.brightness.push(row[1]);
        table.error.push(row.get(2).copied().unwrap_or(0.0));
    }
    Ok(table)
}

pub fn read_minima(path: &Path, delimiter: Delimiter) -> Result<MinimaTable, OcError> {
    let text = read_text(path)?;
    parse_minima(&text, delimiter)
}

/// Minima tables hold the time in the first column and, optionally, its
/// error in the second. The error column is used only when every row has it.
pub fn parse_minima(text: &str, delimiter: Delimiter) -> Result<MinimaTable, OcError> {
    let times = parse_table(text, delimiter, &[0])?;
    let errors = parse_table(text, delimiter, &[0, 1])
        .ok()
        .filter(|t| t.row_errors.is_empty() && !t.rows.is_empty() && t.rows.len() == times.rows.len())
        .map(|t| t.rows.iter().map(|r| r[1]).collect());

    Ok(MinimaTable {
        times: times.rows.iter().map(|r| r[0]).collect(),
        errors,
        row_errors: times.row_errors,
        rows_read: times.rows_read,
    })
}

#[derive(Debug, Default)]
struct ParsedTable {
    rows: Vec<Vec<f64>>,
    header: Option<Vec<String>>,
    row_errors: Vec<RowError>,
    rows_read: usize,
}

fn read_text(path: &Path) -> Result<String, OcError> {
    fs::read_to_string(path).map_err(|e| OcError::Io(format!("Failed to read '{}': {e}", path.display())))
}

fn parse_table(text: &str, delimiter: Delimiter, wanted: &[usize]) -> Result<ParsedTable, OcError> {
    let normalized;
    let input = match delimiter {
        Delimiter::Whitespace => {
            normalized = collapse_whitespace(text);
            normalized.as_str()
        }
        Delimiter::Comma | Delimiter::Tab => text,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .delimiter(delimiter.byte())
        .from_reader(input.as_bytes());

    let mut table = ParsedTable::default();
    let mut first = true;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                table.rows_read += 1;
                table.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                first = false;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        match parse_row(&record, wanted) {
            Ok(row) => {
                table.rows_read += 1;
                table.rows.push(row);
            }
            Err(_) if first => {
                table.header = Some(record.iter().map(str::to_string).collect());
            }
            Err(message) => {
                table.rows_read += 1;
                table.row_errors.push(RowError { line, message });
            }
        }
        first = false;
    }

    if !table.rows.is_empty() || table.row_errors.is_empty() {
        Ok(table)
    } else {
        Err(OcError::Parse(format!(
            "no numeric rows found ({} malformed, first at line {})",
            table.row_errors.len(),
            table.row_errors[0].line
        )))
    }
}

fn parse_row(record: &StringRecord, wanted: &[usize]) -> Result<Vec<f64>, String> {
    wanted
        .iter()
        .map(|&col| {
            let field = record
                .get(col)
                .ok_or_else(|| format!("missing column {} (row has {})", col + 1, record.len()))?;
            field
                .parse::<f64>()
                .map_err(|_| format!("column {}: '{field}' is not a number", col + 1))
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        if let Some(first) = fields.next() {
            out.push_str(first);
            for f in fields {
                out.push(' ');
                out.push_str(f);
            }
        }
        out.push('\n');
    }
    out
}
