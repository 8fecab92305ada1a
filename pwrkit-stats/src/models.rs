//! Forward power models.
//!
//! Each function returns the probability of rejecting the null hypothesis
//! given every parameter of its test. [`power`] dispatches on the family of
//! a fully bound [`PowerQuery`] and is the inner evaluation of the solver's
//! objective.

use pwrkit_core::{PwrError, Result};

use crate::distribution::{
    ChiSquared, Distribution, FDistribution, NoncentralChiSquared, NoncentralF, NoncentralT,
    Normal, Quantile, StudentsT,
};
use crate::query::{Alternative, PowerQuery, Quantity, TTestKind, TestFamily};

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0) || value.is_infinite() {
        return Err(PwrError::Domain(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

// ── Normal approximations ──────────────────────────────────────────────────

/// Power of a z-test whose statistic is `N(delta, 1)` under the alternative.
pub fn normal_power(delta: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    let z = Normal::standard();
    let power = match alternative {
        Alternative::TwoSided => {
            z.sf(z.isf(sig_level / 2.0)? - delta) + z.cdf(z.ppf(sig_level / 2.0)? - delta)
        }
        Alternative::Greater => z.sf(z.isf(sig_level)? - delta),
        Alternative::Less => z.cdf(z.ppf(sig_level)? - delta),
    };
    Ok(power)
}

/// One proportion, `n` observations, Cohen's `h`.
pub fn power_p(h: f64, n: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    check_positive("n", n)?;
    normal_power(h * n.sqrt(), sig_level, alternative)
}

/// Two proportions, `n` observations in each group.
pub fn power_2p(h: f64, n: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    check_positive("n", n)?;
    normal_power(h * (n / 2.0).sqrt(), sig_level, alternative)
}

/// Two proportions with group sizes `n1` and `n2`.
pub fn power_2p2n(
    h: f64,
    n1: f64,
    n2: f64,
    sig_level: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_positive("n1", n1)?;
    check_positive("n2", n2)?;
    normal_power(h * (n1 * n2 / (n1 + n2)).sqrt(), sig_level, alternative)
}

/// Mean of a normal distribution with known variance, standardized
/// difference `d`.
pub fn power_norm(d: f64, n: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    check_positive("n", n)?;
    normal_power(d * n.sqrt(), sig_level, alternative)
}

// ── t-tests ────────────────────────────────────────────────────────────────

/// Power of a t-test with `df` degrees of freedom and noncentrality `ncp`.
pub fn t_power(df: f64, ncp: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    let central = StudentsT::new(df)?;
    let shifted = NoncentralT::new(df, ncp)?;
    let power = match alternative {
        Alternative::TwoSided => {
            let q = central.isf(sig_level / 2.0)?;
            shifted.sf(q) + shifted.cdf(-q)
        }
        Alternative::Greater => shifted.sf(central.isf(sig_level)?),
        Alternative::Less => shifted.cdf(central.ppf(sig_level)?),
    };
    Ok(power.clamp(0.0, 1.0))
}

/// Equal-n t-test: `n` observations per group (or pairs).
pub fn power_t(
    d: f64,
    n: f64,
    sig_level: f64,
    kind: TTestKind,
    alternative: Alternative,
) -> Result<f64> {
    let samples = kind.samples();
    let df = (n - 1.0) * samples;
    check_positive("degrees of freedom", df)?;
    t_power(df, (n / samples).sqrt() * d, sig_level, alternative)
}

/// Two-sample t-test with group sizes `n1` and `n2`.
pub fn power_t2n(
    d: f64,
    n1: f64,
    n2: f64,
    sig_level: f64,
    alternative: Alternative,
) -> Result<f64> {
    check_positive("n1", n1)?;
    check_positive("n2", n2)?;
    let df = n1 + n2 - 2.0;
    check_positive("degrees of freedom", df)?;
    t_power(df, d / (1.0 / n1 + 1.0 / n2).sqrt(), sig_level, alternative)
}

// ── F and chi-squared tests ────────────────────────────────────────────────

fn f_power(df1: f64, df2: f64, lambda: f64, sig_level: f64) -> Result<f64> {
    let critical = FDistribution::new(df1, df2)?.isf(sig_level)?;
    Ok(NoncentralF::new(df1, df2, lambda)?.sf(critical))
}

/// Balanced one-way ANOVA: `k` groups of `n`, Cohen's `f`.
pub fn power_anova(k: f64, n: f64, f: f64, sig_level: f64) -> Result<f64> {
    let df1 = k - 1.0;
    let df2 = (n - 1.0) * k;
    check_positive("numerator degrees of freedom", df1)?;
    check_positive("denominator degrees of freedom", df2)?;
    f_power(df1, df2, k * n * f * f, sig_level)
}

/// General linear model F-test with `u` and `v` degrees of freedom.
pub fn power_f2(u: f64, v: f64, f2: f64, sig_level: f64) -> Result<f64> {
    check_positive("u", u)?;
    check_positive("v", v)?;
    f_power(u, v, f2 * (u + v + 1.0), sig_level)
}

/// Chi-squared test with `df` degrees of freedom, `n` observations, Cohen's
/// `w`.
pub fn power_chisq(w: f64, n: f64, df: f64, sig_level: f64) -> Result<f64> {
    check_positive("n", n)?;
    let critical = ChiSquared::new(df)?.isf(sig_level)?;
    Ok(NoncentralChiSquared::new(df, n * w * w)?.sf(critical))
}

// ── Correlation ────────────────────────────────────────────────────────────

/// Correlation test, via the bias-corrected Fisher z approximation.
pub fn power_r(r: f64, n: f64, sig_level: f64, alternative: Alternative) -> Result<f64> {
    if !(r.abs() < 1.0) {
        return Err(PwrError::Domain(format!("r must be in (-1, 1), got {r}")));
    }
    check_positive("n - 3", n - 3.0)?;

    let (r, alpha) = match alternative {
        Alternative::TwoSided => (r.abs(), sig_level / 2.0),
        Alternative::Greater => (r, sig_level),
        Alternative::Less => (-r, sig_level),
    };
    let ttt = StudentsT::new(n - 2.0)?.isf(alpha)?;
    let rc = (ttt * ttt / (ttt * ttt + n - 2.0)).sqrt();
    let zr = r.atanh() + r / (2.0 * (n - 1.0));
    let zrc = rc.atanh();
    let scale = (n - 3.0).sqrt();

    let z = Normal::standard();
    let mut power = z.cdf((zr - zrc) * scale);
    if alternative.is_two_sided() {
        power += z.cdf((-zr - zrc) * scale);
    }
    Ok(power)
}

// ── Dispatch ───────────────────────────────────────────────────────────────

/// Power of a query whose every other solvable quantity is bound.
pub fn power(query: &PowerQuery) -> Result<f64> {
    let es = query.require(Quantity::EffectSize)?;
    let sig = query.require(Quantity::SigLevel)?;
    let alt = query.alternative;
    match query.family {
        TestFamily::OneProportion => power_p(es, query.require(Quantity::N)?, sig, alt),
        TestFamily::TwoProportions => power_2p(es, query.require(Quantity::N)?, sig, alt),
        TestFamily::TwoProportionsUnequal => power_2p2n(
            es,
            query.require(Quantity::N1)?,
            query.require(Quantity::N2)?,
            sig,
            alt,
        ),
        TestFamily::T(kind) => power_t(es, query.require(Quantity::N)?, sig, kind, alt),
        TestFamily::TUnequal => power_t2n(
            es,
            query.require(Quantity::N1)?,
            query.require(Quantity::N2)?,
            sig,
            alt,
        ),
        TestFamily::Anova => power_anova(
            query.require(Quantity::K)?,
            query.require(Quantity::N)?,
            es,
            sig,
        ),
        TestFamily::Correlation => power_r(es, query.require(Quantity::N)?, sig, alt),
        TestFamily::ChiSquared { df } => power_chisq(es, query.require(Quantity::N)?, df, sig),
        TestFamily::F2 => power_f2(
            query.require(Quantity::U)?,
            query.require(Quantity::V)?,
            es,
            sig,
        ),
        TestFamily::NormalMean => power_norm(es, query.require(Quantity::N)?, sig, alt),
    }
}
