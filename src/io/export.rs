//! Plain-text result tables.
//!
//! Every table is whitespace separated with a `#` header line, so it can be
//! read back by [`crate::io::ingest`] or loaded by any plotting tool.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::Series;
use crate::domain::{Minimum, OcPoint};
use crate::error::OcError;

/// Write `time O-C [error]` rows. The error column is present when every
/// point carries one.
pub fn write_oc_table(path: &Path, points: &[OcPoint]) -> Result<(), OcError> {
    let file = create(path, "O-C table")?;
    write_oc_rows(BufWriter::new(file), points)
        .map_err(|e| OcError::Io(format!("Failed to write O-C table '{}': {e}", path.display())))
}

/// Write `time error` rows.
pub fn write_minima_table(path: &Path, minima: &[Minimum]) -> Result<(), OcError> {
    let file = create(path, "minima table")?;
    write_minima_rows(BufWriter::new(file), minima)
        .map_err(|e| OcError::Io(format!("Failed to write minima table '{}': {e}", path.display())))
}

/// Write a light curve as `time brightness error` rows.
pub fn write_light_curve(path: &Path, series: &Series) -> Result<(), OcError> {
    let file = create(path, "light curve")?;
    write_light_curve_rows(BufWriter::new(file), series)
        .map_err(|e| OcError::Io(format!("Failed to write light curve '{}': {e}", path.display())))
}

pub fn write_oc_rows<W: Write>(mut out: W, points: &[OcPoint]) -> std::io::Result<()> {
    let with_errors = !points.is_empty() && points.iter().all(|p| p.error.is_some());
    if with_errors {
        writeln!(out, "# time O-C error")?;
    } else {
        writeln!(out, "# time O-C")?;
    }
    for p in points {
        match p.error.filter(|_| with_errors) {
            Some(e) => writeln!(out, "{:.10} {:.10} {:.10}", p.time, p.oc, e)?,
            None => writeln!(out, "{:.10} {:.10}", p.time, p.oc)?,
        }
    }
    out.flush()
}

pub fn write_minima_rows<W: Write>(mut out: W, minima: &[Minimum]) -> std::io::Result<()> {
    writeln!(out, "# time error")?;
    for m in minima {
        writeln!(out, "{:.10} {:.10}", m.time, m.error)?;
    }
    out.flush()
}

pub fn write_light_curve_rows<W: Write>(mut out: W, series: &Series) -> std::io::Result<()> {
    writeln!(out, "# time brightness error")?;
    for ((t, y), e) in series.time().iter().zip(series.brightness()).zip(series.error()) {
        writeln!(out, "{t:.10} {y:.10} {e:.10}")?;
    }
    out.flush()
}

fn create(path: &Path, what: &str) -> Result<File, OcError> {
    File::create(path).map_err(|e| OcError::Io(format!("Failed to create {what} '{}': {e}", path.display())))
}
