//! Bootstrap uncertainty of a minimum time.
//!
//! Each trial perturbs every brightness in the window by `sigma_i * z` with
//! `z ~ N(0, 1)`, refits with the refine-pass settings and locates the new
//! minimum. The reported error is the one-sided spread
//! `median - percentile(LOWER_SIGMA_PERCENTILE)` of the trial times.
//!
//! Trials are seeded individually from a counter-based hash of the run seed,
//! so the result is identical for any number of worker threads.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::data::Samples;
use crate::error::OcError;
use crate::fit::{CycleContext, Executor, FitPass, FitStrategy};
use crate::math::{median, percentile};
use crate::models::LocalModel;

/// Lower one-sigma percentile of a normal distribution.
pub const LOWER_SIGMA_PERCENTILE: f64 = 15.9;

/// SplitMix64 mix of `base_seed` and a counter.
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

#[derive(Debug, Clone)]
pub struct Bootstrap<'e> {
    samplings: usize,
    seed: u64,
    executor: &'e Executor,
}

impl<'e> Bootstrap<'e> {
    pub fn new(samplings: usize, seed: u64, executor: &'e Executor) -> Self {
        Self {
            samplings,
            seed,
            executor,
        }
    }

    pub fn samplings(&self) -> usize {
        self.samplings
    }

    /// Run every trial for one window and return the raw minimum times.
    pub fn trace(
        &self,
        strategy: &FitStrategy,
        window: &Samples<'_>,
        ctx: &CycleContext,
        bounds: (f64, f64),
        start: &LocalModel,
    ) -> Result<Vec<f64>, OcError> {
        let cycle_seed = counter_rng_seed(self.seed, ctx.cycle as u64);
        self.executor.map_tasks(self.samplings, |k| {
            let mut rng = StdRng::seed_from_u64(counter_rng_seed(cycle_seed, k as u64));
            let perturbed: Vec<f64> = window
                .brightness
                .iter()
                .zip(window.error)
                .map(|(&y, &sigma)| {
                    let z: f64 = rng.sample(StandardNormal);
                    y + sigma * z
                })
                .collect();
            let trial = window.with_brightness(&perturbed);
            let model = strategy.fit(&trial, ctx, FitPass::Refine, Some(start))?;
            strategy.locate(&model, bounds.0, bounds.1, ctx)
        })
    }

    /// One-sided error of the minimum found in `window`.
    pub fn estimate(
        &self,
        strategy: &FitStrategy,
        window: &Samples<'_>,
        ctx: &CycleContext,
        bounds: (f64, f64),
        start: &LocalModel,
    ) -> Result<f64, OcError> {
        let trace = self.trace(strategy, window, ctx, bounds, start)?;
        Ok(lower_sigma(&trace))
    }
}

/// `median - percentile(15.9)` of the trace; zero for an empty trace.
pub fn lower_sigma(trace: &[f64]) -> f64 {
    match (median(trace), percentile(trace, LOWER_SIGMA_PERCENTILE)) {
        (Some(m), Some(p)) => m - p,
        _ => 0.0,
    }
}
