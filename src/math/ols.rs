//! Least squares solver.
//!
//! We repeatedly solve small, tall regression problems
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! (polynomial design matrices with `order + 1` columns, one row per window
//! point). The solve goes through SVD because the design matrix is tall and
//! can be close to rank deficient when a window holds few points.

use nalgebra::{DMatrix, DVector};

/// Solution of a least squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    /// Numerical rank of the design matrix.
    pub rank: usize,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquares> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                let rank = svd.rank(tol);
                return Some(LeastSquares { beta, rank });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let sol = solve_least_squares(&x, &y).unwrap();
        assert!((sol.beta[0] - 2.0).abs() < 1e-10);
        assert!((sol.beta[1] - 3.0).abs() < 1e-10);
        assert_eq!(sol.rank, 2);
    }

    #[test]
    fn underdetermined_system_reports_rank() {
        // One observation, two unknowns: minimum-norm solution, rank 1.
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[2.0]);

        let sol = solve_least_squares(&x, &y).unwrap();
        assert_eq!(sol.rank, 1);
        assert!((sol.beta[0] + sol.beta[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn empty_system_is_rejected() {
        let x = DMatrix::<f64>::zeros(0, 2);
        let y = DVector::<f64>::zeros(0);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
