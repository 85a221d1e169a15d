//! The three local fit strategies and minimum location.
//!
//! A strategy turns the samples of one window into a [`LocalModel`] and then
//! locates that model's minimum inside the window bounds. Polynomial and
//! kernel models are searched numerically; a template alignment knows its
//! minimum analytically.

use std::sync::Arc;

use tracing::trace;

use crate::data::Samples;
use crate::domain::FitKind;
use crate::error::OcError;
use crate::math::{
    KernelRegression, Polynomial, PowellOptions, mean, median_spacing, minimize_bounded, minimize_powell,
};
use crate::models::{LocalModel, ReferenceCurve, TemplateAlignment};

/// Absolute tolerance of the bounded minimum search.
const LOCATE_XATOL: f64 = 1e-5;

/// Which refinement pass a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitPass {
    /// Window centred on the predicted minimum.
    First,
    /// Window re-centred on the first estimate; also used by the bootstrap.
    Refine,
}

/// Where in the light curve a fit happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleContext {
    /// Refiner cycle counter (starts at 1).
    pub cycle: usize,
    /// `zero_time + (cycle - 1) * period`
    pub origin: f64,
    /// Predicted minimum time of the cycle.
    pub predicted: f64,
}

impl CycleContext {
    fn diverged(&self, reason: impl Into<String>) -> OcError {
        OcError::diverged(self.cycle, self.predicted, reason)
    }
}

#[derive(Debug, Clone)]
pub enum FitStrategy {
    Polynomial { order: usize },
    /// Kernel bandwidth is the window's median spacing on the first pass and
    /// `smoothness` times that on the refine pass.
    NonParametric { smoothness: f64 },
    Template { reference: Arc<ReferenceCurve> },
}

impl FitStrategy {
    pub fn kind(&self) -> FitKind {
        match self {
            Self::Polynomial { .. } => FitKind::Poly,
            Self::NonParametric { .. } => FitKind::Nonparametric,
            Self::Template { .. } => FitKind::Template,
        }
    }

    /// Fit the samples of one window.
    ///
    /// `guess` seeds the template alignment; the other strategies ignore it.
    pub fn fit(
        &self,
        samples: &Samples<'_>,
        ctx: &CycleContext,
        pass: FitPass,
        guess: Option<&LocalModel>,
    ) -> Result<LocalModel, OcError> {
        match self {
            Self::Polynomial { order } => Polynomial::fit(samples.time, samples.brightness, *order)
                .map(LocalModel::Polynomial)
                .ok_or_else(|| ctx.diverged(format!("polynomial fit of order {order} failed"))),
            Self::NonParametric { smoothness } => {
                let spacing = median_spacing(samples.time)
                    .ok_or_else(|| ctx.diverged("kernel fit needs at least two samples"))?;
                let bandwidth = match pass {
                    FitPass::First => spacing,
                    FitPass::Refine => spacing * smoothness,
                };
                KernelRegression::new(samples.time.to_vec(), samples.brightness.to_vec(), bandwidth)
                    .map(LocalModel::Kernel)
                    .ok_or_else(|| ctx.diverged(format!("degenerate kernel bandwidth {bandwidth}")))
            }
            Self::Template { reference } => fit_template(reference, samples, ctx, guess),
        }
    }

    /// Time of the model's minimum within `(lower, upper)`.
    pub fn locate(&self, model: &LocalModel, lower: f64, upper: f64, ctx: &CycleContext) -> Result<f64, OcError> {
        if let LocalModel::Template(alignment) = model {
            let t = alignment.minimum_time();
            return if t.is_finite() {
                Ok(t)
            } else {
                Err(ctx.diverged("template minimum is not finite"))
            };
        }

        // Search in offsets from the midpoint so the tolerance does not scale
        // with the absolute time.
        let mid = 0.5 * (lower + upper);
        let mut probe = [0.0];
        let best = minimize_bounded(
            |u| {
                probe[0] = mid + u;
                model.evaluate(&probe)[0]
            },
            lower - mid,
            upper - mid,
            LOCATE_XATOL,
        )
        .map_err(|e| ctx.diverged(format!("{} minimum search: {e}", model.label())))?;
        Ok(mid + best.x)
    }
}

fn fit_template(
    reference: &Arc<ReferenceCurve>,
    samples: &Samples<'_>,
    ctx: &CycleContext,
    guess: Option<&LocalModel>,
) -> Result<LocalModel, OcError> {
    if samples.is_empty() {
        return Err(ctx.diverged("template fit on an empty window"));
    }
    let x: Vec<f64> = samples.time.iter().map(|t| t - ctx.origin).collect();
    let weights: Vec<f64> = samples
        .error
        .iter()
        .map(|&s| if s > 0.0 { 1.0 / (s * s) } else { 1.0 })
        .collect();

    let start = match guess {
        Some(LocalModel::Template(a)) => [a.time_offset, a.brightness_offset],
        _ => {
            let level = mean(samples.brightness).unwrap_or(0.0) - mean(&reference.evaluate(&x)).unwrap_or(0.0);
            [0.0, level]
        }
    };

    let mut shifted = vec![0.0; x.len()];
    let chi2 = |p: &[f64]| {
        for (s, xi) in shifted.iter_mut().zip(&x) {
            *s = xi + p[0];
        }
        let model = reference.evaluate(&shifted);
        samples
            .brightness
            .iter()
            .zip(&model)
            .zip(&weights)
            .map(|((y, m), w)| {
                let r = y - m - p[1];
                w * r * r
            })
            .sum::<f64>()
    };
    let best = minimize_powell(chi2, &start, &PowellOptions::default())
        .map_err(|e| ctx.diverged(format!("template alignment: {e}")))?;
    if !best.converged {
        trace!(cycle = ctx.cycle, iterations = best.iterations, "template alignment hit the iteration cap");
    }
    if !(best.fx.is_finite() && best.x.iter().all(|v| v.is_finite())) {
        return Err(ctx.diverged("template alignment is not finite"));
    }

    Ok(LocalModel::Template(TemplateAlignment {
        reference: Arc::clone(reference),
        cycle_origin: ctx.origin,
        time_offset: best.x[0],
        brightness_offset: best.x[1],
    }))
}
