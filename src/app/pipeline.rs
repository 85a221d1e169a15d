//! Shared run logic behind the `minima` and `diagram` commands.
//!
//! Keeping the workflow here keeps `app` down to argument mapping and
//! presentation:
//! table ingest -> series cleaning -> minimum detection -> O-C

use std::path::Path;

use tracing::{info, warn};

use crate::data::Series;
use crate::domain::{MinimaConfig, MinimaResult, Minimum, OcPoint};
use crate::error::OcError;
use crate::fit::{RefineObserver, fit_minima_observed};
use crate::io::{Columns, Delimiter, LightCurveTable, RowError, read_light_curve, read_minima, read_run_json};
use crate::models::LocalModel;
use crate::report::{calculate_oc, calculate_oc_for};

/// All computed outputs of a single `oc minima` run.
#[derive(Debug, Clone)]
pub struct MinimaRun {
    pub table: LightCurveTable,
    pub series: Series,
    pub result: MinimaResult,
    pub oc: Vec<OcPoint>,
}

/// Reports each accepted minimum as it is found.
#[derive(Debug, Default)]
pub struct LogProgress {
    pub accepted: usize,
}

impl RefineObserver for LogProgress {
    fn on_epoch(&mut self, epoch: f64) {
        info!(epoch, "reference epoch");
    }

    fn on_minimum(&mut self, cycle: usize, minimum: &Minimum, model: &LocalModel) {
        self.accepted += 1;
        info!(
            n = self.accepted,
            cycle,
            time = minimum.time,
            error = minimum.error,
            model = model.label(),
            "minimum"
        );
    }
}

/// Read a light curve and run the full detection pipeline on it.
pub fn run_minima(
    input: &Path,
    delimiter: Delimiter,
    columns: Columns,
    period: f64,
    config: &MinimaConfig,
    t0: Option<f64>,
) -> Result<MinimaRun, OcError> {
    config.validate()?;
    let table = read_light_curve(input, delimiter, columns)?;
    report_row_errors(&table.row_errors);
    let series = table.to_series()?;
    if series.dropped() > 0 {
        warn!(dropped = series.dropped(), "rows with non-finite values were dropped");
    }

    let (result, oc) = run_minima_on_series(&series, period, config, t0)?;
    Ok(MinimaRun {
        table,
        series,
        result,
        oc,
    })
}

/// Detect minima in an in-memory series and build their O-C diagram.
pub fn run_minima_on_series(
    series: &Series,
    period: f64,
    config: &MinimaConfig,
    t0: Option<f64>,
) -> Result<(MinimaResult, Vec<OcPoint>), OcError> {
    let mut progress = LogProgress::default();
    let result = fit_minima_observed(series, period, config, &mut progress)?;
    let oc = calculate_oc_for(&result.minima, period, t0)?;
    Ok((result, oc))
}

/// Minima loaded for an O-C diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramInput {
    pub times: Vec<f64>,
    pub errors: Option<Vec<f64>>,
    /// Period stored alongside the minima (JSON run files only).
    pub period: Option<f64>,
}

/// Load minima from a JSON run file (`.json`) or a minima table.
pub fn load_diagram_input(path: &Path, delimiter: Delimiter) -> Result<DiagramInput, OcError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let run = read_run_json(path)?;
        return Ok(DiagramInput {
            times: run.result.times(),
            errors: Some(run.result.errors()),
            period: Some(run.period),
        });
    }

    let table = read_minima(path, delimiter)?;
    report_row_errors(&table.row_errors);
    Ok(DiagramInput {
        times: table.times,
        errors: table.errors,
        period: None,
    })
}

/// O-C of loaded minima; `period` overrides the stored one.
pub fn run_diagram(input: &DiagramInput, period: Option<f64>, t0: Option<f64>) -> Result<Vec<OcPoint>, OcError> {
    let period = period
        .or(input.period)
        .ok_or_else(|| OcError::invalid("period", "required unless the input is a JSON run file"))?;
    calculate_oc(&input.times, period, t0, input.errors.as_deref())
}

fn report_row_errors(errors: &[RowError]) {
    for e in errors {
        warn!(line = e.line, "skipped row: {}", e.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagram_needs_a_period() {
        let input = DiagramInput {
            times: vec![1.0, 2.0],
            errors: None,
            period: None,
        };
        assert!(matches!(
            run_diagram(&input, None, None),
            Err(OcError::InvalidParameter { name: "period", .. })
        ));
        assert_eq!(run_diagram(&input, Some(1.0), None).unwrap().len(), 2);
    }

    #[test]
    fn stored_period_is_used_unless_overridden() {
        let input = DiagramInput {
            times: vec![0.0, 2.1],
            errors: Some(vec![0.01, 0.01]),
            period: Some(2.0),
        };
        let stored = run_diagram(&input, None, None).unwrap();
        assert!((stored[1].oc - 0.1).abs() < 1e-12);
        let overridden = run_diagram(&input, Some(1.0), None).unwrap();
        assert!((overridden[1].oc - 0.1).abs() < 1e-9);
    }
}
