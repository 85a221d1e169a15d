//! Fitted local models and their evaluation.

use std::sync::Arc;

use crate::math::{KernelRegression, Polynomial};
use crate::models::ReferenceCurve;

/// Placement of the reference curve inside one cycle.
///
/// The reference is evaluated at `t - cycle_origin + time_offset` and shifted
/// by `brightness_offset`, so a fitted `time_offset` moves the template's
/// minimum to `cycle_origin + phase - time_offset`.
#[derive(Debug, Clone)]
pub struct TemplateAlignment {
    pub reference: Arc<ReferenceCurve>,
    /// `zero_time + (cycle - 1) * period`
    pub cycle_origin: f64,
    pub time_offset: f64,
    pub brightness_offset: f64,
}

impl TemplateAlignment {
    pub fn minimum_time(&self) -> f64 {
        self.cycle_origin + self.reference.phase() - self.time_offset
    }

    pub fn evaluate(&self, times: &[f64]) -> Vec<f64> {
        let shifted: Vec<f64> = times
            .iter()
            .map(|&t| t - self.cycle_origin + self.time_offset)
            .collect();
        let mut out = self.reference.evaluate(&shifted);
        for v in &mut out {
            *v += self.brightness_offset;
        }
        out
    }
}

/// A local brightness model over absolute time.
#[derive(Debug, Clone)]
pub enum LocalModel {
    Polynomial(Polynomial),
    Kernel(KernelRegression),
    Template(TemplateAlignment),
}

impl LocalModel {
    pub fn evaluate(&self, times: &[f64]) -> Vec<f64> {
        match self {
            Self::Polynomial(p) => p.evaluate(times),
            Self::Kernel(k) => k.evaluate(times),
            Self::Template(a) => a.evaluate(times),
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Polynomial(_) => "polynomial",
            Self::Kernel(_) => "kernel",
            Self::Template(_) => "template",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn polynomial_model_evaluates_in_absolute_time() {
        let x: Vec<f64> = (0..21).map(|i| 100.0 + i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().map(|t| (t - 100.5) * (t - 100.5)).collect();
        let model = LocalModel::Polynomial(Polynomial::fit(&x, &y, 2).unwrap());
        let v = model.evaluate(&[100.5, 101.0]);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v[1], 0.25, epsilon = 1e-9);
        assert_eq!(model.label(), "polynomial");
    }

    #[test]
    fn kernel_model_tracks_a_line() {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|t| 2.0 * t + 1.0).collect();
        let model = LocalModel::Kernel(KernelRegression::new(x, y, 0.3).unwrap());
        let v = model.evaluate(&[2.0]);
        assert_abs_diff_eq!(v[0], 5.0, epsilon = 1e-9);
    }
}
