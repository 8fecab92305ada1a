//! Probability distributions used by the power models.
//!
//! Provides the [`Distribution`] trait (CDF and survival function) and the
//! [`Quantile`] trait for the central laws that supply critical values:
//! [`Normal`], [`StudentsT`], [`FDistribution`] and [`ChiSquared`]. Under the
//! alternative hypothesis the test statistics follow [`NoncentralT`],
//! [`NoncentralF`] and [`NoncentralChiSquared`].
//!
//! Central CDFs come from `statrs`. Quantiles of the t, F and chi-squared
//! laws are found by inverting the survival function with [`Brent`], which is
//! far more accurate in the tails than a fixed-step search. The noncentral
//! laws are evaluated as Poisson mixtures (F, chi-squared) or with Lenth's
//! series (t).

use core::f64::consts::{LN_2, SQRT_2};

use pwrkit_core::{PwrError, Result};
use statrs::distribution::{self as sd, ContinuousCDF};
use statrs::function::beta::beta_reg;
use statrs::function::erf::{erfc, erfc_inv};
use statrs::function::gamma::{gamma_ur, ln_gamma};

use crate::roots::{Brent, RootFinder, ScalarOptions};

/// sqrt(2 / pi)
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;
/// ln(sqrt(pi))
const LN_SQRT_PI: f64 = 0.572_364_942_924_700_1;

/// Absolute truncation error allowed on a Poisson mixture tail.
const MIXTURE_EPS: f64 = 1e-15;
/// Hard cap on mixture terms per direction.
const MIXTURE_MAX_TERMS: usize = 50_000_000;
/// Recompute recurrences from scratch every this many terms.
const MIXTURE_REANCHOR: usize = 128;
/// Above this many degrees of freedom the t laws use a normal approximation.
const LARGE_DF: f64 = 4e5;

// ── Traits ─────────────────────────────────────────────────────────────────

/// A continuous univariate distribution.
pub trait Distribution {
    /// Cumulative distribution function `P(X <= x)`.
    fn cdf(&self, x: f64) -> f64;

    /// Survival function `P(X > x)`.
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }
}

/// Inverse distribution functions.
pub trait Quantile: Distribution {
    /// Lower quantile: the `x` with `cdf(x) = p`.
    fn ppf(&self, p: f64) -> Result<f64>;

    /// Upper quantile: the `x` with `sf(x) = alpha`.
    fn isf(&self, alpha: f64) -> Result<f64>;
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if !(p > 0.0 && p < 1.0) {
        return Err(PwrError::Domain(format!(
            "{name}: probability must be in (0, 1), got {p}"
        )));
    }
    Ok(())
}

fn check_df(name: &str, df: f64) -> Result<()> {
    if !(df > 0.0) || df.is_infinite() {
        return Err(PwrError::Domain(format!(
            "{name}: degrees of freedom must be positive and finite, got {df}"
        )));
    }
    Ok(())
}

/// Solve `sf(x) = alpha` for `x >= lower`, given `sf(lower) >= alpha`.
///
/// The upper end of the bracket is doubled until it crosses `alpha`. If no
/// finite crossing exists the quantile is `+inf`.
fn invert_sf(sf: impl Fn(f64) -> f64, alpha: f64, lower: f64) -> Result<f64> {
    let mut upper = lower.abs().max(1.0);
    while sf(upper) > alpha {
        upper *= 2.0;
        if upper > f64::MAX / 4.0 {
            return Ok(f64::INFINITY);
        }
    }
    let mut objective = |x: f64| -> Result<f64> {
        let tail = sf(x);
        if tail.is_nan() {
            return Err(PwrError::Domain(format!(
                "survival function is undefined at x = {x}"
            )));
        }
        Ok(tail - alpha)
    };
    Brent
        .find_root(&mut objective, lower, upper, &ScalarOptions::precise())
        .map(|r| r.root)
}

// ── Normal distribution ────────────────────────────────────────────────────

/// Normal (Gaussian) distribution with parameters μ and σ.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create a new Normal distribution. `sigma` must be positive.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !(sigma > 0.0) || !mu.is_finite() {
            return Err(PwrError::Domain(
                "Normal: sigma must be positive and mu finite".into(),
            ));
        }
        Ok(Self { mu, sigma })
    }

    /// Standard normal distribution N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }
}

impl Distribution for Normal {
    fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        0.5 * erfc(-z / SQRT_2)
    }

    fn sf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        0.5 * erfc(z / SQRT_2)
    }
}

impl Quantile for Normal {
    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability("Normal::ppf", p)?;
        Ok(self.mu - self.sigma * SQRT_2 * erfc_inv(2.0 * p))
    }

    fn isf(&self, alpha: f64) -> Result<f64> {
        check_probability("Normal::isf", alpha)?;
        Ok(self.mu + self.sigma * SQRT_2 * erfc_inv(2.0 * alpha))
    }
}

// ── Student's t distribution ───────────────────────────────────────────────

/// Central Student's t distribution with `df` degrees of freedom.
#[derive(Debug, Clone)]
pub struct StudentsT {
    df: f64,
    inner: sd::StudentsT,
}

impl StudentsT {
    /// Create a t distribution. `df` must be positive.
    pub fn new(df: f64) -> Result<Self> {
        check_df("StudentsT", df)?;
        let inner = sd::StudentsT::new(0.0, 1.0, df)
            .map_err(|e| PwrError::Domain(format!("StudentsT: {e}")))?;
        Ok(Self { df, inner })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> f64 {
        self.df
    }
}

impl StudentsT {
    /// Abramowitz & Stegun 26.7.8, for df where the beta integral breaks down.
    fn normal_approx(&self, x: f64) -> f64 {
        let s = 1.0 / (4.0 * self.df);
        x * (1.0 - s) / (1.0 + x * x * 2.0 * s).sqrt()
    }
}

impl Distribution for StudentsT {
    fn cdf(&self, x: f64) -> f64 {
        if self.df > LARGE_DF && x.is_finite() {
            return Normal::standard().cdf(self.normal_approx(x));
        }
        self.inner.cdf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        // Symmetry keeps the upper tail accurate.
        self.cdf(-x)
    }
}

impl Quantile for StudentsT {
    fn ppf(&self, p: f64) -> Result<f64> {
        self.isf(p).map(|x| -x)
    }

    fn isf(&self, alpha: f64) -> Result<f64> {
        check_probability("StudentsT::isf", alpha)?;
        if alpha == 0.5 {
            Ok(0.0)
        } else if alpha > 0.5 {
            self.isf(1.0 - alpha).map(|x| -x)
        } else {
            invert_sf(|x| self.sf(x), alpha, 0.0)
        }
    }
}

// ── F-distribution ────────────────────────────────────────────────────────

/// Central F-distribution with `d1` and `d2` degrees of freedom.
#[derive(Debug, Clone)]
pub struct FDistribution {
    d1: f64,
    d2: f64,
    inner: sd::FisherSnedecor,
}

impl FDistribution {
    /// Create an F-distribution with `d1` and `d2` degrees of freedom.
    pub fn new(d1: f64, d2: f64) -> Result<Self> {
        check_df("FDistribution", d1)?;
        check_df("FDistribution", d2)?;
        let inner = sd::FisherSnedecor::new(d1, d2)
            .map_err(|e| PwrError::Domain(format!("FDistribution: {e}")))?;
        Ok(Self { d1, d2, inner })
    }

    /// Numerator and denominator degrees of freedom.
    pub fn df(&self) -> (f64, f64) {
        (self.d1, self.d2)
    }
}

impl Distribution for FDistribution {
    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        self.inner.cdf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        self.inner.sf(x)
    }
}

impl Quantile for FDistribution {
    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability("FDistribution::ppf", p)?;
        self.isf(1.0 - p)
    }

    fn isf(&self, alpha: f64) -> Result<f64> {
        check_probability("FDistribution::isf", alpha)?;
        invert_sf(|x| self.sf(x), alpha, 0.0)
    }
}

// ── Chi-squared distribution ──────────────────────────────────────────────

/// Central chi-squared distribution with `k` degrees of freedom.
#[derive(Debug, Clone)]
pub struct ChiSquared {
    k: f64,
    inner: sd::ChiSquared,
}

impl ChiSquared {
    /// Create a chi-squared distribution with `k` degrees of freedom.
    pub fn new(k: f64) -> Result<Self> {
        check_df("ChiSquared", k)?;
        let inner =
            sd::ChiSquared::new(k).map_err(|e| PwrError::Domain(format!("ChiSquared: {e}")))?;
        Ok(Self { k, inner })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> f64 {
        self.k
    }
}

impl Distribution for ChiSquared {
    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        self.inner.cdf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        self.inner.sf(x)
    }
}

impl Quantile for ChiSquared {
    fn ppf(&self, p: f64) -> Result<f64> {
        check_probability("ChiSquared::ppf", p)?;
        self.isf(1.0 - p)
    }

    fn isf(&self, alpha: f64) -> Result<f64> {
        check_probability("ChiSquared::isf", alpha)?;
        invert_sf(|x| self.sf(x), alpha, 0.0)
    }
}

// ── Noncentral t ───────────────────────────────────────────────────────────

/// Noncentral t distribution with `df` degrees of freedom and noncentrality
/// `ncp`.
#[derive(Debug, Clone)]
pub struct NoncentralT {
    df: f64,
    ncp: f64,
    central: StudentsT,
}

impl NoncentralT {
    /// Create a noncentral t distribution. `df` must be positive and `ncp`
    /// finite.
    pub fn new(df: f64, ncp: f64) -> Result<Self> {
        if !ncp.is_finite() {
            return Err(PwrError::Domain(format!(
                "NoncentralT: noncentrality must be finite, got {ncp}"
            )));
        }
        let central = StudentsT::new(df)?;
        Ok(Self { df, ncp, central })
    }

    /// Noncentrality parameter.
    pub fn ncp(&self) -> f64 {
        self.ncp
    }

    /// Lenth's AS 243 series for the noncentral t CDF.
    fn tail(&self, t: f64, lower_tail: bool) -> f64 {
        const ITRMAX: usize = 1000;
        const ERRMAX: f64 = 1e-12;

        let df = self.df;
        if self.ncp == 0.0 {
            return if lower_tail {
                self.central.cdf(t)
            } else {
                self.central.sf(t)
            };
        }
        if t.is_infinite() {
            return if (t < 0.0) == lower_tail { 0.0 } else { 1.0 };
        }

        let (negdel, tt, del) = if t >= 0.0 {
            (false, t, self.ncp)
        } else {
            if self.ncp > 40.0 {
                return if lower_tail { 0.0 } else { 1.0 };
            }
            (true, -t, -self.ncp)
        };

        // Abramowitz & Stegun 26.7.10 for huge df or noncentrality, where the
        // series would underflow.
        if df > LARGE_DF || del * del > 2.0 * LN_2 * 1021.0 {
            tracing::warn!(df, ncp = self.ncp, "noncentral t: normal approximation");
            let s = 1.0 / (4.0 * df);
            let z = (tt * (1.0 - s) - del) / (1.0 + tt * tt * 2.0 * s).sqrt();
            let normal = Normal::standard();
            return if lower_tail != negdel {
                normal.cdf(z)
            } else {
                normal.sf(z)
            };
        }

        let t2 = t * t;
        let rxb = df / (t2 + df);
        let x = t2 / (t2 + df);

        let mut tnc = 0.0;
        if x > 0.0 {
            let lambda = del * del;
            let mut p = 0.5 * (-0.5 * lambda).exp();
            if p == 0.0 {
                tracing::warn!(df, ncp = self.ncp, "noncentral t: series underflow");
                return if lower_tail { 0.0 } else { 1.0 };
            }
            let mut q = SQRT_2_OVER_PI * p * del;
            let mut s = 0.5 - p;
            if s < 1e-7 {
                s = -0.5 * (-0.5 * lambda).exp_m1();
            }
            let mut a = 0.5;
            let b = 0.5 * df;
            let rxb = rxb.powf(b);
            let albeta = LN_SQRT_PI + ln_gamma(b) - ln_gamma(0.5 + b);
            let mut xodd = beta_reg(a, b, x);
            let mut godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
            let bx = b * x;
            let mut xeven = if bx < f64::EPSILON { bx } else { 1.0 - rxb };
            let mut geven = bx * rxb;
            tnc = p * xodd + q * xeven;

            let mut converged = false;
            for it in 1..=ITRMAX {
                let it = it as f64;
                a += 1.0;
                xodd -= godd;
                xeven -= geven;
                godd *= x * (a + b - 1.0) / a;
                geven *= x * (a + b - 0.5) / (a + 0.5);
                p *= lambda / (2.0 * it);
                q *= lambda / (2.0 * it + 1.0);
                tnc += p * xodd + q * xeven;
                s -= p;
                if s < -1e-10 {
                    tracing::warn!(df, ncp = self.ncp, "noncentral t: precision loss");
                    converged = true;
                    break;
                }
                if s <= 0.0 && it > 1.0 {
                    converged = true;
                    break;
                }
                let errbd = 2.0 * s * (xodd - godd);
                if errbd.abs() < ERRMAX {
                    converged = true;
                    break;
                }
            }
            if !converged {
                tracing::warn!(df, ncp = self.ncp, "noncentral t: series hit iteration cap");
            }
        }

        tnc += Normal::standard().cdf(-del);
        let tnc = tnc.min(1.0);
        if lower_tail != negdel {
            tnc
        } else {
            1.0 - tnc
        }
    }
}

impl Distribution for NoncentralT {
    fn cdf(&self, x: f64) -> f64 {
        self.tail(x, true).clamp(0.0, 1.0)
    }

    fn sf(&self, x: f64) -> f64 {
        self.tail(x, false).clamp(0.0, 1.0)
    }
}

// ── Poisson mixtures ───────────────────────────────────────────────────────

/// Sum `Σ_j Pois(j; c) · q(j)` outward from the Poisson mode.
///
/// `anchor(j)` returns the exact pair `(q(j), g(j))` where `g` is the
/// recurrence increment: `q(j + 1) = q(j) + g(j)` and `g(j + 1) = g(j) ·
/// up(j)`, `g(j - 1) = g(j) · down(j)`. Anchors are recomputed periodically
/// so errors cannot accumulate over long runs.
fn poisson_mixture(
    c: f64,
    anchor: impl Fn(f64) -> (f64, f64),
    up: impl Fn(f64) -> f64,
    down: impl Fn(f64) -> f64,
) -> f64 {
    let mode = c.floor();
    let w_mode = (-c + mode * c.ln() - ln_gamma(mode + 1.0)).exp();
    let (q_mode, g_mode) = anchor(mode);
    let mut sum = w_mode * q_mode.clamp(0.0, 1.0);

    // Above the mode.
    let (mut w, mut q, mut g) = (w_mode, q_mode, g_mode);
    let mut j = mode;
    for step in 1..=MIXTURE_MAX_TERMS {
        q += g;
        g *= up(j);
        j += 1.0;
        w *= c / j;
        if step % MIXTURE_REANCHOR == 0 {
            (q, g) = anchor(j);
        }
        sum += w * q.clamp(0.0, 1.0);
        if j + 1.0 > c {
            let r = c / (j + 1.0);
            if w == 0.0 || w * r / (1.0 - r) < MIXTURE_EPS {
                break;
            }
        }
    }

    // Below the mode.
    let (mut w, mut q, mut g) = (w_mode, q_mode, g_mode);
    let mut j = mode;
    let mut step = 0;
    while j > 0.0 && step < MIXTURE_MAX_TERMS {
        step += 1;
        g *= down(j);
        w *= j / c;
        j -= 1.0;
        q -= g;
        if step % MIXTURE_REANCHOR == 0 {
            (q, g) = anchor(j);
        }
        sum += w * q.clamp(0.0, 1.0);
        if j < c {
            let r = j / c;
            if w == 0.0 || w * r / (1.0 - r) < MIXTURE_EPS {
                break;
            }
        }
    }

    sum.clamp(0.0, 1.0)
}

/// Upper tail `P(X > x)` of the noncentral beta distribution
/// `Beta(a, b; lambda)`, the Poisson(λ/2) mixture of `Beta(a + j, b)`.
fn noncentral_beta_sf(x: f64, a: f64, b: f64, lambda: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x >= 1.0 {
        return 0.0;
    }
    let ln_x = x.ln();
    let ln_1mx = (-x).ln_1p();
    // q(s) = P(Beta(s, b) > x) = I_{1-x}(b, s);  g(s) = x^s (1-x)^b / (s B(s, b))
    let anchor = |j: f64| {
        let s = a + j;
        let q = beta_reg(b, s, 1.0 - x);
        let ln_g = s * ln_x + b * ln_1mx - s.ln() - (ln_gamma(s) + ln_gamma(b) - ln_gamma(s + b));
        (q, ln_g.exp())
    };
    if lambda <= 0.0 {
        return anchor(0.0).0;
    }
    // g(s) -> g(s + 1): x (s + b) / (s + 1);  g(s) -> g(s - 1): (s - 1 + 1) / (x (s - 1 + b))
    let up = |j: f64| x * (a + j + b) / (a + j + 1.0);
    let down = |j: f64| (a + j) / (x * (a + j - 1.0 + b));
    // The backward step subtracts g(s - 1), so `down` is applied before use.
    poisson_mixture(lambda / 2.0, anchor, up, down)
}

/// Upper tail `P(X > x)` of the noncentral chi-squared distribution with
/// `k` degrees of freedom, the Poisson(λ/2) mixture of `Gamma(k/2 + j)`
/// evaluated at `x/2`.
fn noncentral_chi_squared_sf(x: f64, k: f64, lambda: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    let y = x / 2.0;
    let ln_y = y.ln();
    let a = k / 2.0;
    // q(s) = Q(s, y);  g(s) = y^s e^{-y} / Γ(s + 1)
    let anchor = |j: f64| {
        let s = a + j;
        let q = gamma_ur(s, y);
        let ln_g = s * ln_y - y - ln_gamma(s + 1.0);
        (q, ln_g.exp())
    };
    if lambda <= 0.0 {
        return anchor(0.0).0;
    }
    let up = |j: f64| y / (a + j + 1.0);
    let down = |j: f64| (a + j) / y;
    poisson_mixture(lambda / 2.0, anchor, up, down)
}

// ── Noncentral F ───────────────────────────────────────────────────────────

/// Noncentral F-distribution with `d1`, `d2` degrees of freedom and
/// noncentrality `lambda`.
#[derive(Debug, Clone)]
pub struct NoncentralF {
    d1: f64,
    d2: f64,
    lambda: f64,
    central: FDistribution,
}

impl NoncentralF {
    /// Create a noncentral F distribution. `lambda` must be non-negative.
    pub fn new(d1: f64, d2: f64, lambda: f64) -> Result<Self> {
        if !(lambda >= 0.0) || lambda.is_infinite() {
            return Err(PwrError::Domain(format!(
                "NoncentralF: noncentrality must be non-negative and finite, got {lambda}"
            )));
        }
        let central = FDistribution::new(d1, d2)?;
        Ok(Self {
            d1,
            d2,
            lambda,
            central,
        })
    }

    /// Noncentrality parameter.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Distribution for NoncentralF {
    fn cdf(&self, x: f64) -> f64 {
        1.0 - self.sf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        if x.is_infinite() {
            return 0.0;
        }
        if self.lambda == 0.0 {
            return self.central.sf(x);
        }
        let u = self.d1 * x / (self.d1 * x + self.d2);
        noncentral_beta_sf(u, self.d1 / 2.0, self.d2 / 2.0, self.lambda)
    }
}

// ── Noncentral chi-squared ─────────────────────────────────────────────────

/// Noncentral chi-squared distribution with `k` degrees of freedom and
/// noncentrality `lambda`.
#[derive(Debug, Clone)]
pub struct NoncentralChiSquared {
    k: f64,
    lambda: f64,
    central: ChiSquared,
}

impl NoncentralChiSquared {
    /// Create a noncentral chi-squared distribution. `lambda` must be
    /// non-negative.
    pub fn new(k: f64, lambda: f64) -> Result<Self> {
        if !(lambda >= 0.0) || lambda.is_infinite() {
            return Err(PwrError::Domain(format!(
                "NoncentralChiSquared: noncentrality must be non-negative and finite, got {lambda}"
            )));
        }
        let central = ChiSquared::new(k)?;
        Ok(Self { k, lambda, central })
    }

    /// Noncentrality parameter.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Distribution for NoncentralChiSquared {
    fn cdf(&self, x: f64) -> f64 {
        1.0 - self.sf(x)
    }

    fn sf(&self, x: f64) -> f64 {
        if self.lambda == 0.0 {
            return self.central.sf(x);
        }
        noncentral_chi_squared_sf(x, self.k, self.lambda)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn normal_standard_cdf() {
        let n = Normal::standard();
        assert!((n.cdf(0.0) - 0.5).abs() < TOL);
        assert!((n.cdf(1.0) - 0.841_344_746).abs() < 1e-8);
        assert!((n.cdf(-1.0) - 0.158_655_254).abs() < 1e-8);
        assert!((n.sf(2.0) - 0.022_750_132).abs() < 1e-8);
    }

    #[test]
    fn normal_quantiles() {
        let n = Normal::standard();
        assert!((n.isf(0.025).unwrap() - 1.959_963_985).abs() < 1e-8);
        assert!((n.ppf(0.025).unwrap() + 1.959_963_985).abs() < 1e-8);
        assert!((n.isf(0.05).unwrap() - 1.644_853_627).abs() < 1e-8);
        assert!(n.ppf(0.0).is_err());
        assert!(n.isf(1.0).is_err());
    }

    #[test]
    fn normal_invalid_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
    }

    #[test]
    fn t_quantiles() {
        // qt(0.975, 10) = 2.228139, qt(0.95, 98) = 1.660551
        let t = StudentsT::new(10.0).unwrap();
        assert!((t.isf(0.025).unwrap() - 2.228_138_852).abs() < 1e-7);
        assert!((t.ppf(0.025).unwrap() + 2.228_138_852).abs() < 1e-7);
        let t = StudentsT::new(98.0).unwrap();
        assert!((t.isf(0.05).unwrap() - 1.660_551_217).abs() < 1e-7);
        assert_eq!(t.isf(0.5).unwrap(), 0.0);
    }

    #[test]
    fn t_invalid_df() {
        assert!(StudentsT::new(0.0).is_err());
        assert!(StudentsT::new(-3.0).is_err());
        assert!(StudentsT::new(f64::NAN).is_err());
    }

    #[test]
    fn t_huge_df_matches_normal() {
        let z = Normal::standard().isf(0.025).unwrap();
        for df in [1e6, 1e12, 1e300] {
            let t = StudentsT::new(df).unwrap();
            let q = t.isf(0.025).unwrap();
            assert!(q.is_finite(), "df={df}");
            assert!((q - z).abs() < 1e-5, "df={df} q={q}");
            assert!((t.cdf(1.0) - 0.841_344_746).abs() < 1e-6);
        }
    }

    #[test]
    fn f_quantile_known() {
        // qf(0.95, 5, 10) = 3.325835
        let f = FDistribution::new(5.0, 10.0).unwrap();
        let q = f.isf(0.05).unwrap();
        assert!((q - 3.325_834_530).abs() < 1e-6, "q={q}");
        assert!((f.sf(q) - 0.05).abs() < 1e-12);
        assert!((f.ppf(0.95).unwrap() - q).abs() < 1e-9);
        assert_eq!(f.sf(0.0), 1.0);
    }

    #[test]
    fn chi_squared_quantile_known() {
        // qchisq(0.95, 1) = 3.841459, qchisq(0.95, 3) = 7.814728
        let c = ChiSquared::new(1.0).unwrap();
        assert!((c.isf(0.05).unwrap() - 3.841_458_821).abs() < 1e-7);
        let c = ChiSquared::new(3.0).unwrap();
        assert!((c.isf(0.05).unwrap() - 7.814_727_903).abs() < 1e-7);
        assert!((c.ppf(0.95).unwrap() - 7.814_727_903).abs() < 1e-7);
    }

    #[test]
    fn chi_squared_invalid() {
        assert!(ChiSquared::new(0.0).is_err());
        assert!(ChiSquared::new(-1.0).is_err());
    }

    #[test]
    fn noncentral_t_zero_ncp_is_central() {
        let nct = NoncentralT::new(12.0, 0.0).unwrap();
        let t = StudentsT::new(12.0).unwrap();
        for &x in &[-3.0, -1.0, 0.0, 0.5, 2.5] {
            assert!((nct.cdf(x) - t.cdf(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn noncentral_t_reflection() {
        // P(T <= t; df, ncp) = P(T > -t; df, -ncp)
        for &(df, ncp, x) in &[(10.0, 1.0, 2.0), (5.0, 0.5, -1.0), (40.0, -2.5, -1.3)] {
            let pos = NoncentralT::new(df, ncp).unwrap();
            let neg = NoncentralT::new(df, -ncp).unwrap();
            assert!((pos.cdf(x) - neg.sf(-x)).abs() < 1e-10, "df={df} ncp={ncp} x={x}");
        }
    }

    #[test]
    fn noncentral_t_monotone_in_ncp() {
        let mut prev = 0.0;
        for i in 0..30 {
            let nct = NoncentralT::new(18.0, i as f64 * 0.2).unwrap();
            let p = nct.sf(1.734);
            assert!(p >= prev - 1e-12, "ncp={} p={} prev={}", i as f64 * 0.2, p, prev);
            prev = p;
        }
    }

    #[test]
    fn noncentral_t_tails_complement() {
        let nct = NoncentralT::new(30.0, 2.2).unwrap();
        for &x in &[-2.0, 0.0, 1.7, 3.0] {
            assert!((nct.cdf(x) + nct.sf(x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn noncentral_t_infinite_arguments() {
        let nct = NoncentralT::new(4.0, 1.5).unwrap();
        assert_eq!(nct.cdf(f64::INFINITY), 1.0);
        assert_eq!(nct.cdf(f64::NEG_INFINITY), 0.0);
        assert_eq!(nct.sf(f64::INFINITY), 0.0);
    }

    #[test]
    fn noncentral_t_large_df_matches_normal() {
        let nct = NoncentralT::new(1e6, 1.5).unwrap();
        let n = Normal::new(1.5, 1.0).unwrap();
        assert!((nct.cdf(2.0) - n.cdf(2.0)).abs() < 1e-4);
    }

    #[test]
    fn noncentral_chi_squared_zero_lambda_is_central() {
        let nc = NoncentralChiSquared::new(4.0, 0.0).unwrap();
        let c = ChiSquared::new(4.0).unwrap();
        assert!((nc.sf(5.0) - c.sf(5.0)).abs() < 1e-12);
    }

    #[test]
    fn noncentral_chi_squared_known_value() {
        // 1 - pchisq(qchisq(0.95, 3), 3, ncp = 100 * 0.289^2) = 0.6750777
        let crit = ChiSquared::new(3.0).unwrap().isf(0.05).unwrap();
        let nc = NoncentralChiSquared::new(3.0, 100.0 * 0.289 * 0.289).unwrap();
        assert!((nc.sf(crit) - 0.675_077_7).abs() < 1e-6, "sf={}", nc.sf(crit));
    }

    #[test]
    fn noncentral_chi_squared_mixture_matches_direct_sum() {
        // Small lambda: compare against the naive forward Poisson sum.
        let (k, lambda, x) = (3.0, 2.5, 4.0);
        let c: f64 = lambda / 2.0;
        let mut direct = 0.0;
        for j in 0..200 {
            let j = j as f64;
            let w = (-c + j * c.ln() - ln_gamma(j + 1.0)).exp();
            direct += w * gamma_ur(k / 2.0 + j, x / 2.0);
        }
        let nc = NoncentralChiSquared::new(k, lambda).unwrap();
        assert!((nc.sf(x) - direct).abs() < 1e-10);
    }

    #[test]
    fn noncentral_f_mixture_matches_direct_sum() {
        let (d1, d2, lambda, x) = (3.0, 20.0, 40.0, 2.5);
        let u = d1 * x / (d1 * x + d2);
        let c: f64 = lambda / 2.0;
        let mut direct = 0.0;
        for j in 0..400 {
            let j = j as f64;
            let w = (-c + j * c.ln() - ln_gamma(j + 1.0)).exp();
            direct += w * beta_reg(d2 / 2.0, d1 / 2.0 + j, 1.0 - u);
        }
        let nf = NoncentralF::new(d1, d2, lambda).unwrap();
        assert!((nf.sf(x) - direct).abs() < 1e-9, "sf={} direct={}", nf.sf(x), direct);
    }

    #[test]
    fn noncentral_f_known_value() {
        // pwr.anova.test(f = 0.28, k = 4, n = 20): power = 0.5149793
        let crit = FDistribution::new(3.0, 76.0).unwrap().isf(0.05).unwrap();
        let nf = NoncentralF::new(3.0, 76.0, 4.0 * 20.0 * 0.28 * 0.28).unwrap();
        assert!((nf.sf(crit) - 0.514_979_3).abs() < 1e-5, "sf={}", nf.sf(crit));
    }

    #[test]
    fn noncentral_f_large_lambda_is_stable() {
        let nf = NoncentralF::new(3.0, 200.0, 2000.0).unwrap();
        let p = nf.sf(2.65);
        assert!(p > 0.999_999 && p <= 1.0, "sf={}", p);
        let nf = NoncentralF::new(3.0, 96.0, 5000.0).unwrap();
        assert!(nf.sf(2.7) > 0.999_999);
    }

    #[test]
    fn noncentral_f_monotone_in_lambda() {
        let mut prev = 0.0;
        for i in 0..20 {
            let nf = NoncentralF::new(4.0, 50.0, i as f64 * 2.0).unwrap();
            let p = nf.sf(2.56);
            assert!(p >= prev - 1e-12, "lambda={} p={} prev={}", i * 2, p, prev);
            prev = p;
        }
    }

    #[test]
    fn noncentral_invalid_parameters() {
        assert!(NoncentralT::new(0.0, 1.0).is_err());
        assert!(NoncentralT::new(5.0, f64::INFINITY).is_err());
        assert!(NoncentralF::new(2.0, 10.0, -1.0).is_err());
        assert!(NoncentralChiSquared::new(2.0, f64::NAN).is_err());
    }
}
