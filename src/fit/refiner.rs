//! Cycle-by-cycle minimum refinement.
//!
//! Starting from the reference epoch the refiner steps through the light
//! curve one period at a time. For each cycle it:
//! 1. fits a window of `±phase_interval * period` around the predicted time
//!    (gate A: the window must hold enough samples)
//! 2. re-centres the window on the first estimate and fits again
//!    (gate B: enough samples on both sides of the estimate)
//! 3. checks coverage around the refined time (gate C) and the shape of the
//!    re-centred window, then bootstraps its uncertainty on that same window
//!
//! A cycle that fails a gate is skipped without a record. The predicted time
//! of the next cycle is always the previous prediction plus one period, so
//! the detected minima never feed back into the cycle count.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::{Samples, Series};
use crate::domain::{DivergencePolicy, FitKind, MinimaConfig, MinimaResult, Minimum};
use crate::error::OcError;
use crate::fit::{Bootstrap, CycleContext, Executor, FitPass, FitStrategy, estimate_epoch};
use crate::models::{LocalModel, build_reference_curve};

/// Hooks for progress reporting; every method defaults to a no-op.
pub trait RefineObserver {
    fn on_epoch(&mut self, _epoch: f64) {}
    fn on_minimum(&mut self, _cycle: usize, _minimum: &Minimum, _model: &LocalModel) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RefineObserver for NoopObserver {}

/// Detect and time every minimum of `series`.
pub fn fit_minima(series: &Series, period: f64, config: &MinimaConfig) -> Result<MinimaResult, OcError> {
    fit_minima_observed(series, period, config, &mut NoopObserver)
}

/// Same as [`fit_minima`], reporting progress to `observer`.
pub fn fit_minima_observed(
    series: &Series,
    period: f64,
    config: &MinimaConfig,
    observer: &mut dyn RefineObserver,
) -> Result<MinimaResult, OcError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(OcError::invalid("period", format!("{period} (must be finite and > 0)")));
    }
    config.validate()?;
    let cadence = series
        .cadence()
        .filter(|c| *c > 0.0)
        .ok_or_else(|| OcError::invalid("time", "median sampling interval is zero"))?;

    let executor = Executor::new(config.threads)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let zero_time = series.zero_time();

    let reference_epoch = estimate_epoch(series, period, config.fit)?;
    observer.on_epoch(reference_epoch);

    let strategy = match config.fit {
        FitKind::Poly => FitStrategy::Polynomial { order: config.order },
        FitKind::Nonparametric => FitStrategy::NonParametric {
            smoothness: config.smoothness,
        },
        FitKind::Template => {
            let reference = build_reference_curve(series, period, reference_epoch - zero_time)?;
            debug!(period = reference.period(), phase = reference.phase(), "reference curve built");
            FitStrategy::Template {
                reference: Arc::new(reference),
            }
        }
    };

    let half_width = config.phase_interval * period;
    let refiner = Refiner {
        series,
        period,
        zero_time,
        half_width,
        threshold: half_width / cadence * config.duty_cycle,
        strategy,
        bootstrap: Bootstrap::new(config.samplings, seed, &executor),
    };
    debug!(
        fit = config.fit.display_name(),
        threads = executor.threads(),
        samplings = refiner.bootstrap.samplings(),
        threshold = refiner.threshold,
        "refiner configured"
    );

    let mut result = MinimaResult {
        minima: Vec::new(),
        zero_time,
        reference_epoch,
        epoch: None,
        cycles: 0,
        diverged: Vec::new(),
    };

    let mut predicted = reference_epoch;
    let mut cycle = 1usize;
    loop {
        result.cycles += 1;
        let ctx = CycleContext {
            cycle,
            origin: refiner.cycle_origin(cycle),
            predicted,
        };
        match refiner.examine(&ctx) {
            Ok(Step::Accepted(minimum, model)) => {
                if result.epoch.is_none() {
                    result.epoch = Some(minimum.time - ctx.origin);
                }
                debug!(cycle, time = minimum.time, error = minimum.error, "minimum accepted");
                observer.on_minimum(cycle, &minimum, &model);
                result.minima.push(minimum);
            }
            Ok(Step::Skipped) => {}
            Ok(Step::Finished) => break,
            Err(OcError::FitDivergence(d)) if config.on_divergence == DivergencePolicy::Skip => {
                warn!(cycle = d.cycle, time = d.time, reason = %d.reason, "skipping diverged cycle");
                result.diverged.push(d);
            }
            Err(e) => return Err(e),
        }

        predicted += period;
        cycle += 1;
        if predicted > series.last_time() {
            break;
        }
    }

    info!(
        minima = result.minima.len(),
        cycles = result.cycles,
        diverged = result.diverged.len(),
        "minimum detection finished"
    );
    Ok(result)
}

enum Step {
    Accepted(Minimum, LocalModel),
    Skipped,
    Finished,
}

struct Refiner<'a> {
    series: &'a Series,
    period: f64,
    zero_time: f64,
    half_width: f64,
    /// Samples a half window must hold.
    threshold: f64,
    strategy: FitStrategy,
    bootstrap: Bootstrap<'a>,
}

impl Refiner<'_> {
    fn examine(&self, ctx: &CycleContext) -> Result<Step, OcError> {
        let pm = self.half_width;

        let window = self.series.window(ctx.predicted - pm, ctx.predicted + pm);
        if (window.len() as f64) < self.threshold {
            return Ok(Step::Skipped);
        }
        let first = self.strategy.fit(&window, ctx, FitPass::First, None)?;
        let estimate = self
            .strategy
            .locate(&first, ctx.predicted - pm, ctx.predicted + pm, ctx)?;

        let window = self.series.window(estimate - pm, estimate + pm);
        if !self.covers_both_sides(&window, estimate) {
            return Ok(Step::Skipped);
        }
        let refined = self.strategy.fit(&window, ctx, FitPass::Refine, Some(&first))?;
        let time = self.strategy.locate(&refined, estimate - pm, estimate + pm, ctx)?;

        if ctx.predicted > self.series.last_time() {
            return Ok(Step::Finished);
        }

        if !self.accepts(&window, time) {
            return Ok(Step::Skipped);
        }

        let bounds = (time - pm, time + pm);
        let error = self.bootstrap.estimate(&self.strategy, &window, ctx, bounds, &refined)?;
        Ok(Step::Accepted(Minimum { time, error }, refined))
    }

    /// Gate C on the samples around `time`, then the shape of `fitted`, the
    /// window the refine pass saw.
    fn accepts(&self, fitted: &Samples<'_>, time: f64) -> bool {
        let around = self.series.window(time - self.half_width, time + self.half_width);
        self.covers_both_sides(&around, time)
            && around.len() as f64 >= self.threshold
            && has_interior_dip(fitted.brightness)
    }

    fn covers_both_sides(&self, window: &Samples<'_>, center: f64) -> bool {
        let before = window.count_between(center - self.half_width, center);
        let after = window.count_between(center, center + self.half_width);
        before as f64 >= self.threshold && after as f64 >= self.threshold
    }

    fn cycle_origin(&self, cycle: usize) -> f64 {
        self.zero_time + (cycle - 1) as f64 * self.period
    }
}

/// The faintest interior sample must be no brighter than either endpoint.
fn has_interior_dip(brightness: &[f64]) -> bool {
    let n = brightness.len();
    if n < 3 {
        return false;
    }
    let lowest = brightness[1..n - 1].iter().copied().fold(f64::INFINITY, f64::min);
    lowest <= brightness[0] && lowest <= brightness[n - 1]
}
