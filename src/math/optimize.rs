//! Derivative-free minimisation.
//!
//! - [`minimize_bounded`]: Brent's method restricted to `[lower, upper]`
//!   (golden-section steps with parabolic interpolation). The endpoints are
//!   never evaluated; a monotonic objective converges to within `xatol` of
//!   the lower bound side it decreases towards.
//! - [`minimize_powell`]: Powell's conjugate-direction method, each line
//!   search being an unbounded Brent minimisation over a bracket found by
//!   golden-ratio expansion.
//!
//! Objectives that turn non-finite at the reported optimum produce
//! [`OptimizeError::NonFinite`]; the caller decides what that means.

const GOLDEN_MEAN: f64 = 0.381_966_011_250_105_1;
const GOLD: f64 = 1.618_034;
const BRENT_MINTOL: f64 = 1.0e-11;
const BRACKET_GROW_LIMIT: f64 = 110.0;
const BRACKET_MAX_ITER: usize = 1000;
const BRENT_MAX_ITER: usize = 500;
const VERY_SMALL: f64 = 1e-21;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizeError {
    #[error("invalid bounds [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("objective is not finite at the optimum")]
    NonFinite,

    #[error("no bracketing interval found for line search")]
    NoBracket,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarOptimum {
    pub x: f64,
    pub fx: f64,
    pub evaluations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorOptimum {
    pub x: Vec<f64>,
    pub fx: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Options for [`minimize_powell`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowellOptions {
    pub xtol: f64,
    pub ftol: f64,
    /// Defaults to `1000 * n` when `None`.
    pub max_iter: Option<usize>,
}

impl Default for PowellOptions {
    fn default() -> Self {
        Self {
            xtol: 1e-4,
            ftol: 1e-4,
            max_iter: None,
        }
    }
}

/// Bounded scalar minimisation.
pub fn minimize_bounded<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    xatol: f64,
) -> Result<ScalarOptimum, OptimizeError>
where
    F: FnMut(f64) -> f64,
{
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(OptimizeError::InvalidBounds { lower, upper });
    }
    let max_fun = 500usize;
    let sqrt_eps = f64::EPSILON.sqrt();

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + GOLDEN_MEAN * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat = 0.0_f64;
    let mut e = 0.0_f64;
    let mut fx = f(xf);
    let mut num = 1usize;
    let mut ffulc = fx;
    let mut fnfc = fx;
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;
        if e.abs() > tol1 {
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * step_sign(xm - xf);
                }
            } else {
                golden = true;
            }
        }
        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = GOLDEN_MEAN * e;
        }

        let x = xf + step_sign(rat) * rat.abs().max(tol1);
        let fu = f(x);
        num += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
        tol2 = 2.0 * tol1;
        if num >= max_fun {
            break;
        }
    }

    if !(fx.is_finite() && xf.is_finite()) {
        return Err(OptimizeError::NonFinite);
    }
    Ok(ScalarOptimum {
        x: xf,
        fx,
        evaluations: num,
    })
}

/// Powell's method for an unconstrained objective of `x0.len()` variables.
pub fn minimize_powell<F>(
    mut f: F,
    x0: &[f64],
    opts: &PowellOptions,
) -> Result<VectorOptimum, OptimizeError>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    let max_iter = opts.max_iter.unwrap_or(1000 * n.max(1));
    let mut x = x0.to_vec();
    let mut fval = f(&x);
    let mut directions: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut d = vec![0.0; n];
            d[i] = 1.0;
            d
        })
        .collect();

    let mut iterations = 0usize;
    let mut converged = false;
    loop {
        let fx = fval;
        let x_start = x.clone();
        let mut big_index = 0usize;
        let mut delta = 0.0;

        for (i, dir) in directions.iter_mut().enumerate() {
            let before = fval;
            let (f_new, x_new, scaled) = line_search(&mut f, &x, dir, opts.xtol * 100.0)?;
            fval = f_new;
            x = x_new;
            *dir = scaled;
            if before - fval > delta {
                delta = before - fval;
                big_index = i;
            }
        }
        iterations += 1;

        let bound = opts.ftol * (fx.abs() + fval.abs()) + 1e-20;
        if 2.0 * (fx - fval) <= bound {
            converged = true;
            break;
        }
        if iterations >= max_iter || (fx.is_nan() && fval.is_nan()) {
            break;
        }

        // Extrapolated point along the net displacement of this sweep.
        let net: Vec<f64> = x.iter().zip(x_start.iter()).map(|(a, b)| a - b).collect();
        let x_extra: Vec<f64> = x.iter().zip(net.iter()).map(|(a, d)| a + d).collect();
        let f_extra = f(&x_extra);
        if fx > f_extra {
            let mut t = 2.0 * (fx + f_extra - 2.0 * fval);
            let tmp = fx - fval - delta;
            t *= tmp * tmp;
            let tmp = fx - f_extra;
            t -= delta * tmp * tmp;
            if t < 0.0 {
                let (f_new, x_new, scaled) = line_search(&mut f, &x, &net, opts.xtol * 100.0)?;
                fval = f_new;
                x = x_new;
                if scaled.iter().any(|v| *v != 0.0) {
                    let last = n - 1;
                    directions[big_index] = directions[last].clone();
                    directions[last] = scaled;
                }
            }
        }
    }

    if !(fval.is_finite() && x.iter().all(|v| v.is_finite())) {
        return Err(OptimizeError::NonFinite);
    }
    Ok(VectorOptimum {
        x,
        fx: fval,
        iterations,
        converged,
    })
}

fn step_sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Minimise `f(x + alpha * dir)` over `alpha`; returns `(f, x_new, alpha * dir)`.
fn line_search<F>(
    f: &mut F,
    x: &[f64],
    dir: &[f64],
    tol: f64,
) -> Result<(f64, Vec<f64>, Vec<f64>), OptimizeError>
where
    F: FnMut(&[f64]) -> f64,
{
    let mut point = vec![0.0; x.len()];
    let mut along = |alpha: f64| {
        for ((p, xi), di) in point.iter_mut().zip(x.iter()).zip(dir.iter()) {
            *p = xi + alpha * di;
        }
        f(&point)
    };
    let (alpha, fmin) = brent(&mut along, tol)?;
    let scaled: Vec<f64> = dir.iter().map(|d| alpha * d).collect();
    let x_new: Vec<f64> = x.iter().zip(scaled.iter()).map(|(a, s)| a + s).collect();
    Ok((fmin, x_new, scaled))
}

struct Bracket {
    xa: f64,
    xb: f64,
    xc: f64,
    fb: f64,
}

fn bracket<F>(f: &mut F, mut xa: f64, mut xb: f64) -> Result<Bracket, OptimizeError>
where
    F: FnMut(f64) -> f64,
{
    let mut fa = f(xa);
    let mut fb = f(xb);
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLD * (xb - xa);
    let mut fc = f(xc);
    let mut iter = 0usize;

    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < VERY_SMALL {
            2.0 * VERY_SMALL
        } else {
            2.0 * val
        };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + BRACKET_GROW_LIMIT * (xc - xb);
        if iter > BRACKET_MAX_ITER {
            return Err(OptimizeError::NoBracket);
        }
        iter += 1;

        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                return Ok(Bracket { xa: xb, xb: w, xc, fb: fw });
            } else if fw > fb {
                return Ok(Bracket { xa, xb, xc: w, fb });
            }
            w = xc + GOLD * (xc - xb);
            fw = f(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLD * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
            }
        } else {
            w = xc + GOLD * (xc - xb);
            fw = f(w);
        }
        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }
    Ok(Bracket { xa, xb, xc, fb })
}

/// Unbounded Brent minimisation starting from the bracket around `[0, 1]`.
fn brent<F>(f: &mut F, tol: f64) -> Result<(f64, f64), OptimizeError>
where
    F: FnMut(f64) -> f64,
{
    let br = bracket(f, 0.0, 1.0)?;
    let (mut a, mut b) = if br.xa < br.xc {
        (br.xa, br.xc)
    } else {
        (br.xc, br.xa)
    };

    let mut x = br.xb;
    let mut w = x;
    let mut v = x;
    let mut fx = br.fb;
    let mut fw = fx;
    let mut fv = fx;
    let mut deltax = 0.0_f64;
    let mut rat = 0.0_f64;

    for _ in 0..BRENT_MAX_ITER {
        let tol1 = tol * x.abs() + BRENT_MINTOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = GOLDEN_MEAN * deltax;
        } else {
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_temp = deltax;
            deltax = rat;
            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_temp).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = GOLDEN_MEAN * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 { x + tol1 } else { x - tol1 }
        } else {
            x + rat
        };
        let fu = f(u);

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }

    Ok((x, fx))
}
