//! Reference epoch: the refined time of the first minimum.

use tracing::debug;

use crate::data::Series;
use crate::domain::FitKind;
use crate::error::OcError;
use crate::fit::{CycleContext, FitPass, FitStrategy};

/// Half-width of the epoch window in units of the period.
pub const EPOCH_HALF_WIDTH: f64 = 0.1;
/// Polynomial order of the epoch fit.
pub const EPOCH_ORDER: usize = 5;
/// Search span used when the faintest sample of the first period is the
/// very first sample (the dip is cut off at the start).
const EXTENDED_SPAN: f64 = 1.3;

/// Estimate the time of the first minimum.
///
/// The faintest sample within the first period is the starting guess; a
/// polynomial of order [`EPOCH_ORDER`] (or, for nonparametric runs, a kernel
/// regression) is then fitted in a window of `±EPOCH_HALF_WIDTH * period`
/// around it and its minimum located.
pub fn estimate_epoch(series: &Series, period: f64, kind: FitKind) -> Result<f64, OcError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(OcError::invalid("period", format!("{period} (must be finite and > 0)")));
    }

    let first = series.first_time();
    let mut head = series.before(first + period);
    let mut index = head.argmin();
    if index == Some(0) {
        head = series.before(first + EXTENDED_SPAN * period);
        index = head.argmin();
    }
    let guess = match index {
        Some(i) => head.time[i],
        None => first,
    };

    let half = EPOCH_HALF_WIDTH * period;
    let (lower, upper) = (guess - half, guess + half);
    let window = series.window(lower, upper);
    let strategy = match kind {
        FitKind::Nonparametric => FitStrategy::NonParametric { smoothness: 1.0 },
        FitKind::Poly | FitKind::Template => FitStrategy::Polynomial { order: EPOCH_ORDER },
    };
    let ctx = CycleContext {
        cycle: 1,
        origin: series.zero_time(),
        predicted: guess,
    };
    let model = strategy.fit(&window, &ctx, FitPass::First, None)?;
    let epoch = strategy.locate(&model, lower, upper, &ctx)?;
    debug!(guess, epoch, samples = window.len(), "reference epoch");
    Ok(epoch)
}
