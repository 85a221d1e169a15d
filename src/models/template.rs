//! Empirical reference curve built from the whole light curve.
//!
//! Construction:
//! 1. rebase time on `zero_time` and bring every cycle's minimum down to a
//!    common level (`mean - peak_to_peak / 2`)
//! 2. fold on the period, centred half a period before the reference phase
//! 3. take the median brightness of each of [`TEMPLATE_BINS`] phase bins
//! 4. smooth the binned curve with a kernel regression of bandwidth
//!    `TEMPLATE_BANDWIDTH * period`
//!
//! The result covers one period centred on the reference phase, so its
//! minimum sits near `x = phase`.

use tracing::debug;

use crate::data::Series;
use crate::error::OcError;
use crate::math::{KernelRegression, mean, median_mut, peak_to_peak};

pub const TEMPLATE_BINS: usize = 100;
/// Smoothing bandwidth in units of the period.
pub const TEMPLATE_BANDWIDTH: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    kernel: KernelRegression,
    phase: f64,
    period: f64,
}

impl ReferenceCurve {
    /// Position of the reference minimum relative to `zero_time`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Brightness at offsets `x` from a cycle origin.
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        self.kernel.evaluate(x)
    }
}

/// Build the reference curve of `series` folded on `period`, with its
/// minimum expected at `phase` after `series.zero_time()`.
pub fn build_reference_curve(series: &Series, period: f64, phase: f64) -> Result<ReferenceCurve, OcError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(OcError::invalid("period", format!("{period} (must be finite and > 0)")));
    }
    if !phase.is_finite() {
        return Err(OcError::invalid("phase", "must be finite"));
    }

    let zero_time = series.zero_time();
    let x: Vec<f64> = series.time().iter().map(|t| t - zero_time).collect();
    let aligned = align_cycles(&x, series.brightness(), period);

    let width = period / TEMPLATE_BINS as f64;
    let mut bins: Vec<Vec<f64>> = vec![Vec::new(); TEMPLATE_BINS];
    for (&xi, &yi) in x.iter().zip(&aligned) {
        let folded = (xi - phase + period / 2.0).rem_euclid(period);
        let b = ((folded / width) as usize).min(TEMPLATE_BINS - 1);
        bins[b].push(yi);
    }

    let mut centers = Vec::with_capacity(TEMPLATE_BINS);
    let mut levels = Vec::with_capacity(TEMPLATE_BINS);
    for (b, values) in bins.iter_mut().enumerate() {
        if let Some(level) = median_mut(values) {
            centers.push((b as f64 + 0.5) * width + phase - period / 2.0);
            levels.push(level);
        }
    }
    if centers.len() < 2 {
        return Err(OcError::InsufficientData {
            actual: centers.len(),
            minimum: 2,
        });
    }
    debug!(filled = centers.len(), bins = TEMPLATE_BINS, "reference curve binned");

    let kernel = KernelRegression::new(centers, levels, TEMPLATE_BANDWIDTH * period)
        .ok_or_else(|| OcError::invalid("period", "reference curve bandwidth must be > 0"))?;
    Ok(ReferenceCurve { kernel, phase, period })
}

/// Shift each cycle `[k P, (k + 1) P)` so its faintest sample sits at the
/// common minimum level.
fn align_cycles(x: &[f64], y: &[f64], period: f64) -> Vec<f64> {
    let mut out = y.to_vec();
    let (Some(avg), Some(ptp)) = (mean(y), peak_to_peak(y)) else {
        return out;
    };
    let level = avg - ptp / 2.0;

    let mut start = 0;
    while start < x.len() {
        let cycle = (x[start] / period).floor();
        let upper = (cycle + 1.0) * period;
        let end = start + x[start..].partition_point(|&xi| xi < upper);
        let end = end.max(start + 1);
        let low = out[start..end].iter().copied().fold(f64::INFINITY, f64::min);
        for v in &mut out[start..end] {
            *v += level - low;
        }
        start = end;
    }
    out
}
