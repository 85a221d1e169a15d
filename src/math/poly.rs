//! Polynomial least-squares fits.
//!
//! Fits are done in a centred, scaled coordinate `u = (x - center) / scale`
//! so that high orders stay well conditioned when `x` holds large absolute
//! times. A rank-deficient design (fewer distinct points than coefficients)
//! still yields the minimum-norm solution; it is reported at `trace` level
//! and never aborts the fit.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in ascending powers of `u`.
    coeffs: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    /// Least-squares fit of a polynomial of degree `order`.
    ///
    /// Returns `None` for empty or mismatched input, or when the solve fails.
    pub fn fit(x: &[f64], y: &[f64], order: usize) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        let n = x.len();
        let center = x.iter().sum::<f64>() / n as f64;
        let spread = x.iter().map(|v| (v - center).abs()).fold(0.0, f64::max);
        let scale = if spread > 0.0 && spread.is_finite() { spread } else { 1.0 };

        let p = order + 1;
        let mut design = DMatrix::<f64>::zeros(n, p);
        for (i, &xi) in x.iter().enumerate() {
            let u = (xi - center) / scale;
            let mut pow = 1.0;
            for j in 0..p {
                design[(i, j)] = pow;
                pow *= u;
            }
        }
        let rhs = DVector::from_column_slice(y);

        let solution = solve_least_squares(&design, &rhs)?;
        if solution.rank < p {
            tracing::trace!(order, points = n, rank = solution.rank, "rank-deficient polynomial fit");
        }

        Some(Self {
            coeffs: solution.beta.iter().copied().collect(),
            center,
            scale,
        })
    }

    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .map(|&xi| {
                let u = (xi - self.center) / self.scale;
                self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * u + c)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_exact_cubic() {
        let x: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
        let f = |t: f64| 1.0 - 2.0 * (t - 101.0) + 0.5 * (t - 101.0).powi(3);
        let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();

        let poly = Polynomial::fit(&x, &y, 3).unwrap();
        let probe = [100.25, 101.0, 101.7];
        for (got, &t) in poly.evaluate(&probe).iter().zip(probe.iter()) {
            assert_abs_diff_eq!(*got, f(t), epsilon = 1e-9);
        }
    }

    #[test]
    fn single_point_fit_is_constant_through_point() {
        let poly = Polynomial::fit(&[3.0], &[7.0], 5).unwrap();
        assert_abs_diff_eq!(poly.evaluate(&[3.0])[0], 7.0, epsilon = 1e-9);
    }

    #[test]
    fn mismatched_input_is_rejected() {
        assert!(Polynomial::fit(&[1.0, 2.0], &[1.0], 1).is_none());
        assert!(Polynomial::fit(&[], &[], 1).is_none());
    }
}
