//! One entry point per test family.
//!
//! Every function takes the quantities of its test as `Option<f64>`; exactly
//! one of them must be `None`, and that one is solved for. Sample sizes may
//! be fractional: results carry the exact solution (see
//! [`PowerResult::ceil_sizes`] for whole numbers).
//!
//! ```no_run
//! use pwrkit_stats::api::pwr_t_test;
//! use pwrkit_stats::query::{Alternative, TTestKind};
//!
//! let r = pwr_t_test(None, Some(0.5), Some(0.05), Some(0.8),
//!                    TTestKind::TwoSample, Alternative::TwoSided)?;
//! assert_eq!(r.ceil_sizes().n, Some(64.0));
//! # Ok::<(), pwrkit_core::PwrError>(())
//! ```

use pwrkit_core::Result;

use crate::query::{Alternative, PowerQuery, PowerResult, Quantity, TTestKind, TestFamily};

/// Power calculation for one proportion (arcsine transformation).
pub fn pwr_p_test(
    h: Option<f64>,
    n: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::OneProportion)
        .alternative(alternative)
        .with(Quantity::EffectSize, h)
        .with(Quantity::N, n)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for two proportions with `n` in each group.
pub fn pwr_2p_test(
    h: Option<f64>,
    n: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::TwoProportions)
        .alternative(alternative)
        .with(Quantity::EffectSize, h)
        .with(Quantity::N, n)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for two proportions with group sizes `n1` and `n2`.
pub fn pwr_2p2n_test(
    h: Option<f64>,
    n1: Option<f64>,
    n2: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::TwoProportionsUnequal)
        .alternative(alternative)
        .with(Quantity::EffectSize, h)
        .with(Quantity::N1, n1)
        .with(Quantity::N2, n2)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for one-sample, two-sample and paired t-tests.
pub fn pwr_t_test(
    n: Option<f64>,
    d: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    kind: TTestKind,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::T(kind))
        .alternative(alternative)
        .with(Quantity::N, n)
        .with(Quantity::EffectSize, d)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for a two-sample t-test with unequal group sizes.
pub fn pwr_t2n_test(
    n1: Option<f64>,
    n2: Option<f64>,
    d: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::TUnequal)
        .alternative(alternative)
        .with(Quantity::N1, n1)
        .with(Quantity::N2, n2)
        .with(Quantity::EffectSize, d)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for balanced one-way ANOVA: `k` groups of `n`.
pub fn pwr_anova_test(
    k: Option<f64>,
    n: Option<f64>,
    f: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::Anova)
        .with(Quantity::K, k)
        .with(Quantity::N, n)
        .with(Quantity::EffectSize, f)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for the correlation coefficient.
pub fn pwr_r_test(
    n: Option<f64>,
    r: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::Correlation)
        .alternative(alternative)
        .with(Quantity::N, n)
        .with(Quantity::EffectSize, r)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for chi-squared tests with `df` degrees of freedom.
pub fn pwr_chisq_test(
    w: Option<f64>,
    n: Option<f64>,
    df: f64,
    sig_level: Option<f64>,
    power: Option<f64>,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::ChiSquared { df })
        .with(Quantity::EffectSize, w)
        .with(Quantity::N, n)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for the general linear model.
pub fn pwr_f2_test(
    u: Option<f64>,
    v: Option<f64>,
    f2: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::F2)
        .with(Quantity::U, u)
        .with(Quantity::V, v)
        .with(Quantity::EffectSize, f2)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}

/// Power calculation for the mean of a normal distribution with known
/// variance.
pub fn pwr_norm_test(
    d: Option<f64>,
    n: Option<f64>,
    sig_level: Option<f64>,
    power: Option<f64>,
    alternative: Alternative,
) -> Result<PowerResult> {
    PowerQuery::new(TestFamily::NormalMean)
        .alternative(alternative)
        .with(Quantity::EffectSize, d)
        .with(Quantity::N, n)
        .with(Quantity::SigLevel, sig_level)
        .with(Quantity::Power, power)
        .solve()
}
