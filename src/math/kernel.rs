//! Local-linear kernel regression with a Gaussian kernel.
//!
//! For a query point `q` every sample gets the weight
//! `w_i = exp(-((x_i - q) / h)^2 / 2)` and a weighted straight line is fitted
//! through the samples; the prediction is the line's value at `q`.
//! Weights are computed relative to the largest exponent, so queries far
//! from the data extrapolate from the nearest samples instead of underflowing
//! to `0/0`.

/// Relative determinant below which the local line is considered degenerate
/// and the prediction falls back to the weighted mean.
const DET_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct KernelRegression {
    x: Vec<f64>,
    y: Vec<f64>,
    bandwidth: f64,
}

impl KernelRegression {
    /// Returns `None` for empty/mismatched input or a non-positive bandwidth.
    pub fn new(x: Vec<f64>, y: Vec<f64>, bandwidth: f64) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return None;
        }
        Some(Self { x, y, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn evaluate(&self, at: &[f64]) -> Vec<f64> {
        at.iter().map(|&q| self.predict_at(q)).collect()
    }

    fn predict_at(&self, query: f64) -> f64 {
        let h = self.bandwidth;
        let max_exponent = self
            .x
            .iter()
            .map(|&xi| {
                let u = (xi - query) / h;
                -0.5 * u * u
            })
            .fold(f64::NEG_INFINITY, f64::max);

        let mut s_w = 0.0;
        let mut s_dx = 0.0;
        let mut s_dx2 = 0.0;
        let mut s_wy = 0.0;
        let mut s_wdxy = 0.0;
        for (&xi, &yi) in self.x.iter().zip(self.y.iter()) {
            let dx = xi - query;
            let u = dx / h;
            let w = (-0.5 * u * u - max_exponent).exp();
            let wdx = w * dx;
            s_w += w;
            s_dx += wdx;
            s_dx2 += wdx * dx;
            s_wy += w * yi;
            s_wdxy += wdx * yi;
        }

        let det = s_w * s_dx2 - s_dx * s_dx;
        if det > DET_EPS * s_w * s_dx2 && det.is_finite() {
            (s_dx2 * s_wy - s_dx * s_wdxy) / det
        } else {
            s_wy / s_w
        }
    }
}
