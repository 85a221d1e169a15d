//! Observed-minus-calculated residuals against a linear ephemeris.
//!
//! Minima are assigned to cycles in ascending time order. The cycle index
//! only ever moves forward, so a minimum that follows a skipped cycle lands
//! on the right cycle instead of being pulled back onto its neighbour.

use crate::domain::{Minimum, OcPoint};
use crate::error::OcError;

/// Largest accepted `|O-C|` as a fraction of the period.
pub const OC_LIMIT: f64 = 0.9;

/// Largest `|t - t0| / period` for which cycle numbers stay exact in `f64`.
const MAX_CYCLES: f64 = (1u64 << 52) as f64;

/// O-C of `times` against the ephemeris `t0 + i * period`.
///
/// `t0` defaults to the earliest time. The output is sorted by time; input
/// order does not matter.
pub fn calculate_oc(
    times: &[f64],
    period: f64,
    t0: Option<f64>,
    errors: Option<&[f64]>,
) -> Result<Vec<OcPoint>, OcError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(OcError::invalid("period", format!("{period} (must be finite and > 0)")));
    }
    if let Some(n) = errors.map(<[f64]>::len).filter(|&n| n != times.len()) {
        return Err(OcError::LengthMismatch {
            time: times.len(),
            brightness: times.len(),
            error: n,
        });
    }
    if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
        return Err(OcError::invalid("minima", format!("non-finite minimum time {bad}")));
    }
    if t0.is_some_and(|t| !t.is_finite()) {
        return Err(OcError::invalid("t0", "must be finite"));
    }
    if times.is_empty() {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
    let t0 = t0.unwrap_or(times[order[0]]);
    let limit = OC_LIMIT * period;

    let mut out = Vec::with_capacity(times.len());
    let mut previous: Option<i64> = None;
    for idx in order {
        let dt = times[idx] - t0;
        let span = (dt / period).abs();
        if !span.is_finite() || span > MAX_CYCLES {
            return Err(OcError::invalid(
                "minima",
                format!("{} lies too many periods from t0 = {t0}", times[idx]),
            ));
        }
        let mut cycle = first_cycle_within(dt, period, limit);
        if let Some(prev) = previous {
            let next = cycle.max(prev + 1);
            cycle = if dt - next as f64 * period >= -limit {
                next
            } else {
                cycle.max(prev)
            };
        }
        previous = Some(cycle);
        out.push(OcPoint {
            time: times[idx],
            oc: dt - cycle as f64 * period,
            error: errors.map(|e| e[idx]),
        });
    }
    Ok(out)
}

/// O-C of detected minima, carrying their errors.
pub fn calculate_oc_for(minima: &[Minimum], period: f64, t0: Option<f64>) -> Result<Vec<OcPoint>, OcError> {
    let times: Vec<f64> = minima.iter().map(|m| m.time).collect();
    let errors: Vec<f64> = minima.iter().map(|m| m.error).collect();
    calculate_oc(&times, period, t0, Some(&errors))
}

/// Smallest `i` with `dt - i * period <= limit`.
fn first_cycle_within(dt: f64, period: f64, limit: f64) -> i64 {
    let mut cycle = ((dt - limit) / period).ceil() as i64;
    while dt - cycle as f64 * period > limit {
        cycle += 1;
    }
    while dt - (cycle - 1) as f64 * period <= limit {
        cycle -= 1;
    }
    cycle
}
