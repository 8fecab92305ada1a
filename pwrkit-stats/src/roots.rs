//! Bracketed scalar root finding.
//!
//! The solver and the quantile functions in [`crate::distribution`] only ever
//! need one capability: given a continuous `f` and an interval `[a, b]` with
//! `f(a)` and `f(b)` of opposite signs, return a root inside it. That
//! capability is the [`RootFinder`] trait, implemented here by [`Brent`]
//! (inverse quadratic interpolation with bisection safeguard) and
//! [`Bisection`].
//!
//! Objectives are fallible: a power model can fail for a given argument, and
//! that error is propagated unchanged.

use pwrkit_core::{PwrError, Result};

/// Options for bracketed root finding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarOptions {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Absolute tolerance on the root.
    pub xtol: f64,
    /// Relative tolerance on the root.
    pub rtol: f64,
}

impl Default for ScalarOptions {
    fn default() -> Self {
        Self {
            max_iter: 100,
            xtol: 1e-8,
            rtol: 1e-8,
        }
    }
}

impl ScalarOptions {
    /// Tight tolerances used when inverting distribution functions.
    pub fn precise() -> Self {
        Self {
            max_iter: 200,
            xtol: 1e-14,
            rtol: 1e-13,
        }
    }
}

/// Result from a root finding method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    /// The root found.
    pub root: f64,
    /// Objective value at the root.
    pub function_value: f64,
    /// Number of iterations used.
    pub iterations: usize,
    /// Final bracket width.
    pub bracket_width: f64,
}

/// A bracketed root finding method.
pub trait RootFinder {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Find a root of `f` in `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// Returns [`PwrError::Convergence`] if `f(lower)` and `f(upper)` have
    /// the same sign or the iteration cap is hit, and propagates any error
    /// returned by `f`.
    fn find_root(
        &self,
        f: &mut dyn FnMut(f64) -> Result<f64>,
        lower: f64,
        upper: f64,
        options: &ScalarOptions,
    ) -> Result<RootResult>;
}

fn evaluate(f: &mut dyn FnMut(f64) -> Result<f64>, x: f64) -> Result<f64> {
    let y = f(x)?;
    if y.is_nan() {
        return Err(PwrError::Convergence(format!(
            "objective is not a number at x = {x}"
        )));
    }
    Ok(y)
}

fn check_bracket(lower: f64, upper: f64, f_lower: f64, f_upper: f64) -> Result<()> {
    if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
        return Err(PwrError::Convergence(format!(
            "invalid bracket [{lower}, {upper}]"
        )));
    }
    if f_lower.signum() == f_upper.signum() {
        return Err(PwrError::Convergence(format!(
            "f(a) and f(b) must have opposite signs on [{lower}, {upper}] (f(a) = {f_lower}, f(b) = {f_upper})"
        )));
    }
    Ok(())
}

// ── Brent ──────────────────────────────────────────────────────────────────

/// Brent's method: secant / inverse quadratic steps, falling back to
/// bisection whenever the interpolated step would not shrink the bracket fast
/// enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brent;

impl RootFinder for Brent {
    fn name(&self) -> &'static str {
        "brent"
    }

    fn find_root(
        &self,
        f: &mut dyn FnMut(f64) -> Result<f64>,
        lower: f64,
        upper: f64,
        options: &ScalarOptions,
    ) -> Result<RootResult> {
        let mut xpre = lower;
        let mut xcur = upper;
        let mut fpre = evaluate(f, xpre)?;
        let mut fcur = evaluate(f, xcur)?;

        if fpre == 0.0 {
            return Ok(RootResult {
                root: xpre,
                function_value: 0.0,
                iterations: 0,
                bracket_width: upper - lower,
            });
        }
        if fcur == 0.0 {
            return Ok(RootResult {
                root: xcur,
                function_value: 0.0,
                iterations: 0,
                bracket_width: upper - lower,
            });
        }
        check_bracket(lower, upper, fpre, fcur)?;

        let mut xblk = 0.0;
        let mut fblk = 0.0;
        let mut spre = 0.0;
        let mut scur = 0.0;

        for iteration in 1..=options.max_iter {
            if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
                xblk = xpre;
                fblk = fpre;
                spre = xcur - xpre;
                scur = spre;
            }
            if fblk.abs() < fcur.abs() {
                xpre = xcur;
                xcur = xblk;
                xblk = xpre;
                fpre = fcur;
                fcur = fblk;
                fblk = fpre;
            }

            let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
            let sbis = (xblk - xcur) / 2.0;
            if fcur == 0.0 || sbis.abs() < delta {
                return Ok(RootResult {
                    root: xcur,
                    function_value: fcur,
                    iterations: iteration,
                    bracket_width: (xblk - xcur).abs(),
                });
            }

            if spre.abs() > delta && fcur.abs() < fpre.abs() {
                let stry = if xpre == xblk {
                    // secant
                    -fcur * (xcur - xpre) / (fcur - fpre)
                } else {
                    // inverse quadratic
                    let dpre = (fpre - fcur) / (xpre - xcur);
                    let dblk = (fblk - fcur) / (xblk - xcur);
                    -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
                };
                if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                    spre = scur;
                    scur = stry;
                } else {
                    spre = sbis;
                    scur = sbis;
                }
            } else {
                spre = sbis;
                scur = sbis;
            }

            xpre = xcur;
            fpre = fcur;
            if scur.abs() > delta {
                xcur += scur;
            } else {
                xcur += if sbis > 0.0 { delta } else { -delta };
            }
            fcur = evaluate(f, xcur)?;
        }

        Err(PwrError::Convergence(format!(
            "brent: no convergence after {} iterations",
            options.max_iter
        )))
    }
}

// ── Bisection ──────────────────────────────────────────────────────────────

/// Plain interval halving. Slow but unconditionally robust on a valid bracket.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bisection;

impl RootFinder for Bisection {
    fn name(&self) -> &'static str {
        "bisection"
    }

    fn find_root(
        &self,
        f: &mut dyn FnMut(f64) -> Result<f64>,
        lower: f64,
        upper: f64,
        options: &ScalarOptions,
    ) -> Result<RootResult> {
        let mut a = lower;
        let mut b = upper;
        let mut fa = evaluate(f, a)?;
        let fb = evaluate(f, b)?;

        if fa == 0.0 {
            return Ok(RootResult {
                root: a,
                function_value: 0.0,
                iterations: 0,
                bracket_width: b - a,
            });
        }
        if fb == 0.0 {
            return Ok(RootResult {
                root: b,
                function_value: 0.0,
                iterations: 0,
                bracket_width: b - a,
            });
        }
        check_bracket(a, b, fa, fb)?;

        for iteration in 1..=options.max_iter {
            let mid = a + (b - a) / 2.0;
            let fm = evaluate(f, mid)?;
            let half = (b - a) / 2.0;
            if fm == 0.0 || half < options.xtol + options.rtol * mid.abs() {
                return Ok(RootResult {
                    root: mid,
                    function_value: fm,
                    iterations: iteration,
                    bracket_width: b - a,
                });
            }
            if fm.signum() == fa.signum() {
                a = mid;
                fa = fm;
            } else {
                b = mid;
            }
        }

        Err(PwrError::Convergence(format!(
            "bisection: no convergence after {} iterations",
            options.max_iter
        )))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> Result<f64> {
        Ok(x * x * x - 2.0 * x - 5.0)
    }

    const CUBIC_ROOT: f64 = 2.094_551_481_542_327;

    #[test]
    fn brent_finds_cubic_root() {
        let r = Brent
            .find_root(&mut cubic, 2.0, 3.0, &ScalarOptions::precise())
            .unwrap();
        assert!((r.root - CUBIC_ROOT).abs() < 1e-12, "root={}", r.root);
        assert!(r.iterations < 20, "iterations={}", r.iterations);
    }

    #[test]
    fn bisection_finds_cubic_root() {
        let r = Bisection
            .find_root(&mut cubic, 2.0, 3.0, &ScalarOptions::precise())
            .unwrap();
        assert!((r.root - CUBIC_ROOT).abs() < 1e-12, "root={}", r.root);
    }

    #[test]
    fn brent_beats_bisection_on_iterations() {
        let opts = ScalarOptions::precise();
        let brent = Brent.find_root(&mut cubic, 2.0, 3.0, &opts).unwrap();
        let bisect = Bisection.find_root(&mut cubic, 2.0, 3.0, &opts).unwrap();
        assert!(brent.iterations < bisect.iterations);
    }

    #[test]
    fn root_at_bracket_end() {
        let mut f = |x: f64| Ok(x - 1.0);
        let r = Brent
            .find_root(&mut f, 1.0, 4.0, &ScalarOptions::default())
            .unwrap();
        assert_eq!(r.root, 1.0);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn same_sign_is_convergence_error() {
        let mut f = |x: f64| Ok(x * x + 1.0);
        let err = Brent
            .find_root(&mut f, -1.0, 1.0, &ScalarOptions::default())
            .unwrap_err();
        assert!(err.is_convergence());
        let err = Bisection
            .find_root(&mut f, -1.0, 1.0, &ScalarOptions::default())
            .unwrap_err();
        assert!(err.is_convergence());
    }

    #[test]
    fn iteration_cap_is_convergence_error() {
        let opts = ScalarOptions {
            max_iter: 3,
            xtol: 1e-15,
            rtol: 0.0,
        };
        let err = Bisection.find_root(&mut cubic, 2.0, 3.0, &opts).unwrap_err();
        assert!(err.is_convergence());
    }

    #[test]
    fn objective_errors_propagate() {
        let mut f = |x: f64| {
            if x > 0.5 {
                Err(PwrError::Domain("too large".into()))
            } else {
                Ok(x - 0.25)
            }
        };
        let err = Brent
            .find_root(&mut f, 0.0, 1.0, &ScalarOptions::default())
            .unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn nan_objective_is_rejected() {
        let mut f = |_x: f64| Ok(f64::NAN);
        let err = Brent
            .find_root(&mut f, 0.0, 1.0, &ScalarOptions::default())
            .unwrap_err();
        assert!(err.is_convergence());
    }

    #[test]
    fn steep_monotone_objective() {
        // Shape of a power curve: flat near zero, steep, then flat near one.
        let mut f = |x: f64| Ok(1.0 / (1.0 + (-(x - 50.0) / 3.0).exp()) - 0.8);
        let r = Brent
            .find_root(&mut f, 2.0, 1e7, &ScalarOptions::default())
            .unwrap();
        let expected = 50.0 + 3.0 * (0.8_f64 / 0.2).ln();
        assert!((r.root - expected).abs() < 1e-6, "root={}", r.root);
    }
}
