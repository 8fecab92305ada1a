//! Query and result types for power calculations.
//!
//! A [`PowerQuery`] names a [`TestFamily`] and binds every quantity of that
//! family except one. Solving it (see [`crate::solver`]) yields a
//! [`PowerResult`] with every quantity resolved.

use core::fmt;
use core::str::FromStr;

use pwrkit_core::{Annotated, PwrError, Result, Summarizable};

use crate::solver::{self, SolverConfig};

// ── Alternative hypothesis ─────────────────────────────────────────────────

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alternative {
    /// Critical region split between both tails.
    #[default]
    TwoSided,
    /// Upper tail only; the effect is expected to be positive.
    Greater,
    /// Lower tail only; the effect is expected to be negative.
    Less,
}

impl Alternative {
    /// Returns `true` for [`Alternative::TwoSided`].
    pub fn is_two_sided(&self) -> bool {
        matches!(self, Alternative::TwoSided)
    }
}

impl FromStr for Alternative {
    type Err = PwrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two-sided" | "two.sided" | "two_sided" => Ok(Self::TwoSided),
            "greater" => Ok(Self::Greater),
            "less" => Ok(Self::Less),
            _ => Err(PwrError::Validation(format!(
                "unknown alternative '{s}': expected two-sided, greater or less"
            ))),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoSided => write!(f, "two.sided"),
            Self::Greater => write!(f, "greater"),
            Self::Less => write!(f, "less"),
        }
    }
}

// ── t-test design ──────────────────────────────────────────────────────────

/// Design of an equal-n t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TTestKind {
    OneSample,
    #[default]
    TwoSample,
    Paired,
}

impl TTestKind {
    /// Number of samples entering the degrees of freedom and noncentrality.
    pub fn samples(&self) -> f64 {
        match self {
            Self::TwoSample => 2.0,
            Self::OneSample | Self::Paired => 1.0,
        }
    }
}

impl FromStr for TTestKind {
    type Err = PwrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-sample" | "one.sample" | "one_sample" => Ok(Self::OneSample),
            "two-sample" | "two.sample" | "two_sample" => Ok(Self::TwoSample),
            "paired" => Ok(Self::Paired),
            _ => Err(PwrError::Validation(format!(
                "unknown t test type '{s}': expected one-sample, two-sample or paired"
            ))),
        }
    }
}

impl fmt::Display for TTestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneSample => write!(f, "one-sample"),
            Self::TwoSample => write!(f, "two-sample"),
            Self::Paired => write!(f, "paired"),
        }
    }
}

// ── Quantities ─────────────────────────────────────────────────────────────

/// A quantity of a power calculation that can be bound or solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    EffectSize,
    N,
    N1,
    N2,
    /// Number of groups (ANOVA).
    K,
    /// Numerator degrees of freedom (general linear model).
    U,
    /// Denominator degrees of freedom (general linear model).
    V,
    SigLevel,
    Power,
}

impl Quantity {
    /// Key used in [`PowerResult::entries`].
    pub fn key(&self) -> &'static str {
        match self {
            Self::EffectSize => "effect_size",
            Self::N => "n",
            Self::N1 => "n1",
            Self::N2 => "n2",
            Self::K => "k",
            Self::U => "u",
            Self::V => "v",
            Self::SigLevel => "sig_level",
            Self::Power => "power",
        }
    }

    /// Whether the quantity counts observations, groups or degrees of
    /// freedom.
    pub fn is_size(&self) -> bool {
        matches!(
            self,
            Self::N | Self::N1 | Self::N2 | Self::K | Self::U | Self::V
        )
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Test families ──────────────────────────────────────────────────────────

/// The supported hypothesis tests.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TestFamily {
    /// One proportion against a constant (arcsine transformation).
    OneProportion,
    /// Two proportions, equal group sizes.
    TwoProportions,
    /// Two proportions, unequal group sizes.
    TwoProportionsUnequal,
    /// Equal-n t-test of the given design.
    T(TTestKind),
    /// Two-sample t-test with unequal group sizes.
    TUnequal,
    /// Balanced one-way ANOVA.
    Anova,
    /// Pearson correlation.
    Correlation,
    /// Chi-squared test with `df` degrees of freedom.
    ChiSquared { df: f64 },
    /// General linear model (multiple regression) F-test.
    F2,
    /// Mean of a normal distribution with known variance.
    NormalMean,
}

impl TestFamily {
    /// Quantities of this family; exactly one must be unknown in a query.
    pub fn solvable(&self) -> &'static [Quantity] {
        use Quantity::*;
        match self {
            Self::OneProportion
            | Self::TwoProportions
            | Self::T(_)
            | Self::Correlation
            | Self::ChiSquared { .. }
            | Self::NormalMean => &[EffectSize, N, SigLevel, Power],
            Self::TwoProportionsUnequal | Self::TUnequal => {
                &[EffectSize, N1, N2, SigLevel, Power]
            }
            Self::Anova => &[K, N, EffectSize, SigLevel, Power],
            Self::F2 => &[U, V, EffectSize, SigLevel, Power],
        }
    }

    /// Conventional symbol of the effect size (`h`, `d`, `f`, ...).
    pub fn effect_label(&self) -> &'static str {
        match self {
            Self::OneProportion | Self::TwoProportions | Self::TwoProportionsUnequal => "h",
            Self::T(_) | Self::TUnequal | Self::NormalMean => "d",
            Self::Anova => "f",
            Self::Correlation => "r",
            Self::ChiSquared { .. } => "w",
            Self::F2 => "f2",
        }
    }

    /// Display label of a quantity within this family.
    pub fn label(&self, q: Quantity) -> &'static str {
        match (self, q) {
            (_, Quantity::EffectSize) => self.effect_label(),
            (Self::ChiSquared { .. }, Quantity::N) => "N",
            _ => q.key(),
        }
    }

    /// Whether the family's test has a direction.
    pub fn has_alternative(&self) -> bool {
        !matches!(self, Self::Anova | Self::ChiSquared { .. } | Self::F2)
    }

    /// Smallest admissible value of a size-like quantity.
    pub fn minimum(&self, q: Quantity) -> f64 {
        match (self, q) {
            (Self::Correlation, Quantity::N) => 4.0,
            (Self::OneProportion | Self::NormalMean | Self::ChiSquared { .. }, Quantity::N) => 1.0,
            (_, Quantity::U | Quantity::V) => 1.0,
            _ => 2.0,
        }
    }

    /// Name of the calculation, as printed in a result header.
    pub fn method(&self) -> &'static str {
        match self {
            Self::OneProportion => {
                "Proportion power calculation for binomial distribution (arcsine transformation)"
            }
            Self::TwoProportions | Self::TwoProportionsUnequal => {
                "Difference of proportion power calculation for binomial distribution (arcsine transformation)"
            }
            Self::T(TTestKind::OneSample) => "One Sample t test power calculation",
            Self::T(TTestKind::TwoSample) => "Two Sample t test power calculation",
            Self::T(TTestKind::Paired) => "Paired Sample t test power calculation",
            Self::TUnequal => "T test power calculation",
            Self::Anova => "Balanced one-way analysis of variance power calculation",
            Self::Correlation => {
                "Approximate correlation power calculation (arctanh transformation)"
            }
            Self::ChiSquared { .. } => "Chi squared power calculation",
            Self::F2 => "Multiple regression power calculator",
            Self::NormalMean => {
                "Mean power calculation for normal distribution with known variance"
            }
        }
    }

    /// Interpretation note attached to results.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            Self::TwoProportions => Some("Same sample sizes"),
            Self::TwoProportionsUnequal => Some("Different sample sizes"),
            Self::T(TTestKind::TwoSample) => Some("n is number in each group"),
            Self::T(TTestKind::Paired) => Some("n is number of pairs"),
            Self::Anova => Some("n is the number in each group"),
            Self::ChiSquared { .. } => Some("N is the number of observations"),
            _ => None,
        }
    }
}

impl Annotated for TestFamily {
    fn name(&self) -> &str {
        match self {
            Self::OneProportion => "p",
            Self::TwoProportions => "2p",
            Self::TwoProportionsUnequal => "2p2n",
            Self::T(_) => "t",
            Self::TUnequal => "t2n",
            Self::Anova => "anova",
            Self::Correlation => "r",
            Self::ChiSquared { .. } => "chisq",
            Self::F2 => "f2",
            Self::NormalMean => "norm",
        }
    }

    fn description(&self) -> Option<&str> {
        Some(self.method())
    }
}

// ── Query ──────────────────────────────────────────────────────────────────

/// A power calculation with exactly one unknown quantity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerQuery {
    pub family: TestFamily,
    pub alternative: Alternative,
    pub effect_size: Option<f64>,
    pub n: Option<f64>,
    pub n1: Option<f64>,
    pub n2: Option<f64>,
    pub k: Option<f64>,
    pub u: Option<f64>,
    pub v: Option<f64>,
    pub sig_level: Option<f64>,
    pub power: Option<f64>,
}

impl PowerQuery {
    /// An empty query for `family` with a two-sided alternative.
    pub fn new(family: TestFamily) -> Self {
        Self {
            family,
            alternative: Alternative::default(),
            effect_size: None,
            n: None,
            n1: None,
            n2: None,
            k: None,
            u: None,
            v: None,
            sig_level: None,
            power: None,
        }
    }

    /// Set the alternative hypothesis.
    pub fn alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Bind (or clear, with `None`) a quantity.
    pub fn with(mut self, q: Quantity, value: Option<f64>) -> Self {
        self.set(q, value);
        self
    }

    /// Current value of a quantity.
    pub fn get(&self, q: Quantity) -> Option<f64> {
        match q {
            Quantity::EffectSize => self.effect_size,
            Quantity::N => self.n,
            Quantity::N1 => self.n1,
            Quantity::N2 => self.n2,
            Quantity::K => self.k,
            Quantity::U => self.u,
            Quantity::V => self.v,
            Quantity::SigLevel => self.sig_level,
            Quantity::Power => self.power,
        }
    }

    /// Bind (or clear) a quantity in place.
    pub fn set(&mut self, q: Quantity, value: Option<f64>) {
        let slot = match q {
            Quantity::EffectSize => &mut self.effect_size,
            Quantity::N => &mut self.n,
            Quantity::N1 => &mut self.n1,
            Quantity::N2 => &mut self.n2,
            Quantity::K => &mut self.k,
            Quantity::U => &mut self.u,
            Quantity::V => &mut self.v,
            Quantity::SigLevel => &mut self.sig_level,
            Quantity::Power => &mut self.power,
        };
        *slot = value;
    }

    /// Value of a quantity that must be bound.
    pub fn require(&self, q: Quantity) -> Result<f64> {
        self.get(q).ok_or_else(|| {
            PwrError::Validation(format!("{} must be given", self.family.label(q)))
        })
    }

    fn listing(&self, conjunction: &str) -> String {
        let labels: Vec<&str> = self
            .family
            .solvable()
            .iter()
            .map(|&q| self.family.label(q))
            .collect();
        match labels.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("{} {conjunction} {last}", rest.join(", "))
            }
            _ => labels.join(", "),
        }
    }

    /// The single unknown quantity.
    pub fn missing(&self) -> Result<Quantity> {
        let unknown: Vec<Quantity> = self
            .family
            .solvable()
            .iter()
            .copied()
            .filter(|&q| self.get(q).is_none())
            .collect();
        match unknown.as_slice() {
            [q] => Ok(*q),
            [] => Err(PwrError::Validation(format!(
                "exactly one of {} must be None",
                self.listing("or")
            ))),
            _ => Err(PwrError::Validation(format!(
                "only one of {} may be None",
                self.listing("or")
            ))),
        }
    }

    /// Check the input contract: one unknown, every bound value in range.
    ///
    /// Returns the unknown quantity.
    pub fn validate(&self) -> Result<Quantity> {
        let missing = self.missing()?;
        let family = self.family;

        for &q in family.solvable() {
            let Some(value) = self.get(q) else { continue };
            let label = family.label(q);
            if value.is_nan() {
                return Err(PwrError::Validation(format!("{label} must be a number")));
            }
            match q {
                Quantity::SigLevel | Quantity::Power => {
                    if !(value > 0.0 && value < 1.0) {
                        return Err(PwrError::Validation(format!(
                            "{label} must be between 0 and 1"
                        )));
                    }
                }
                Quantity::EffectSize => validate_effect_size(family, value)?,
                Quantity::K => {
                    if value < 2.0 {
                        return Err(PwrError::Validation(
                            "number of groups must be at least 2".into(),
                        ));
                    }
                }
                Quantity::U | Quantity::V => {
                    if value < 1.0 {
                        let side = if q == Quantity::U { "numerator" } else { "denominator" };
                        return Err(PwrError::Validation(format!(
                            "degrees of freedom {label} for {side} must be at least 1"
                        )));
                    }
                }
                Quantity::N | Quantity::N1 | Quantity::N2 => {
                    let min = family.minimum(q);
                    if value < min || value.is_infinite() {
                        return Err(PwrError::Validation(format!(
                            "number of observations ({label}) must be at least {min}"
                        )));
                    }
                }
            }
        }

        if let TestFamily::ChiSquared { df } = family {
            if !(df >= 1.0) || df.is_infinite() {
                return Err(PwrError::Validation(
                    "degrees of freedom must be at least 1".into(),
                ));
            }
        }

        Ok(missing)
    }

    /// Solve for the unknown quantity with the default solver settings.
    pub fn solve(&self) -> Result<PowerResult> {
        solver::resolve(self, &SolverConfig::default())
    }

    /// Solve for the unknown quantity with explicit solver settings.
    pub fn solve_with(&self, config: &SolverConfig) -> Result<PowerResult> {
        solver::resolve(self, config)
    }
}

fn validate_effect_size(family: TestFamily, value: f64) -> Result<()> {
    let label = family.effect_label();
    match family {
        TestFamily::Anova | TestFamily::ChiSquared { .. } | TestFamily::F2 => {
            if value < 0.0 || value.is_infinite() {
                return Err(PwrError::Validation(format!("{label} must be positive")));
            }
        }
        TestFamily::Correlation => {
            if !(value.abs() < 1.0) {
                return Err(PwrError::Validation(
                    "r must be between -1 and 1".into(),
                ));
            }
        }
        _ => {
            if value.is_infinite() {
                return Err(PwrError::Validation(format!("{label} must be finite")));
            }
        }
    }
    Ok(())
}

// ── Result ─────────────────────────────────────────────────────────────────

/// A fully resolved power calculation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerResult {
    pub family: TestFamily,
    /// The quantity that was solved for.
    pub solved: Quantity,
    pub effect_size: f64,
    pub n: Option<f64>,
    pub n1: Option<f64>,
    pub n2: Option<f64>,
    pub k: Option<f64>,
    pub u: Option<f64>,
    pub v: Option<f64>,
    /// Degrees of freedom of a chi-squared test.
    pub df: Option<f64>,
    pub sig_level: f64,
    pub power: f64,
    /// `None` for tests without a direction (ANOVA, chi-squared, f2).
    pub alternative: Option<Alternative>,
    pub method: String,
    pub note: Option<String>,
}

impl PowerResult {
    /// Package a query whose every solvable quantity is bound.
    pub(crate) fn from_query(query: &PowerQuery, solved: Quantity) -> Result<Self> {
        let family = query.family;
        let sizes = |q: Quantity| {
            if family.solvable().contains(&q) {
                query.require(q).map(Some)
            } else {
                Ok(None)
            }
        };
        Ok(Self {
            family,
            solved,
            effect_size: query.require(Quantity::EffectSize)?,
            n: sizes(Quantity::N)?,
            n1: sizes(Quantity::N1)?,
            n2: sizes(Quantity::N2)?,
            k: sizes(Quantity::K)?,
            u: sizes(Quantity::U)?,
            v: sizes(Quantity::V)?,
            df: match family {
                TestFamily::ChiSquared { df } => Some(df),
                _ => None,
            },
            sig_level: query.require(Quantity::SigLevel)?,
            power: query.require(Quantity::Power)?,
            alternative: family.has_alternative().then_some(query.alternative),
            method: family.method().into(),
            note: family.note().map(Into::into),
        })
    }

    /// Value of a quantity, if the family has it.
    pub fn get(&self, q: Quantity) -> Option<f64> {
        match q {
            Quantity::EffectSize => Some(self.effect_size),
            Quantity::N => self.n,
            Quantity::N1 => self.n1,
            Quantity::N2 => self.n2,
            Quantity::K => self.k,
            Quantity::U => self.u,
            Quantity::V => self.v,
            Quantity::SigLevel => Some(self.sig_level),
            Quantity::Power => Some(self.power),
        }
    }

    /// The solved value.
    pub fn value(&self) -> f64 {
        self.get(self.solved).unwrap_or(f64::NAN)
    }

    /// `(key, value)` pairs of every resolved quantity.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![("effect_size", self.effect_size)];
        let sized = [
            ("n", self.n),
            ("n1", self.n1),
            ("n2", self.n2),
            ("k", self.k),
            ("u", self.u),
            ("v", self.v),
            ("df", self.df),
        ];
        out.extend(sized.into_iter().filter_map(|(key, v)| v.map(|v| (key, v))));
        out.push(("sig_level", self.sig_level));
        out.push(("power", self.power));
        out
    }

    /// A copy with the solved sample size (or group count, or degrees of
    /// freedom) rounded up to the next integer.
    pub fn ceil_sizes(&self) -> Self {
        let mut out = self.clone();
        let slot = match self.solved {
            Quantity::N => &mut out.n,
            Quantity::N1 => &mut out.n1,
            Quantity::N2 => &mut out.n2,
            Quantity::K => &mut out.k,
            Quantity::U => &mut out.u,
            Quantity::V => &mut out.v,
            _ => return out,
        };
        *slot = slot.map(f64::ceil);
        out
    }
}

/// Format with 7 significant digits, trailing zeros trimmed.
fn format_value(x: f64) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{x}");
    }
    let magnitude = x.abs().log10().floor() as i32;
    let decimals = (6 - magnitude).clamp(0, 15) as usize;
    let s = format!("{x:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

impl Summarizable for PowerResult {
    fn summary(&self) -> String {
        let family = self.family;
        let mut rows: Vec<(&str, String)> = Vec::new();
        for &q in family.solvable() {
            if q == Quantity::SigLevel || q == Quantity::Power {
                continue;
            }
            if let Some(v) = self.get(q) {
                rows.push((family.label(q), format_value(v)));
            }
        }
        if let Some(df) = self.df {
            rows.push(("df", format_value(df)));
        }
        rows.push(("sig.level", format_value(self.sig_level)));
        rows.push(("power", format_value(self.power)));
        if let Some(alt) = self.alternative {
            rows.push(("alternative", alt.to_string()));
        }

        let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut out = format!("\n     {}\n\n", self.method);
        for (label, value) in &rows {
            out.push_str(&format!("    {label:>width$} = {value}\n"));
        }
        if let Some(note) = &self.note {
            out.push_str(&format!("\nNOTE: {note}\n"));
        }
        out
    }
}

impl fmt::Display for PowerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t_query() -> PowerQuery {
        PowerQuery::new(TestFamily::T(TTestKind::TwoSample))
            .with(Quantity::EffectSize, Some(0.5))
            .with(Quantity::SigLevel, Some(0.05))
            .with(Quantity::Power, Some(0.8))
    }

    #[test]
    fn alternative_parsing() {
        assert_eq!("two-sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!("two.sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!("Greater".parse::<Alternative>().unwrap(), Alternative::Greater);
        assert_eq!("LESS".parse::<Alternative>().unwrap(), Alternative::Less);
        assert!("both".parse::<Alternative>().unwrap_err().is_validation());
        assert_eq!(Alternative::default(), Alternative::TwoSided);
    }

    #[test]
    fn t_kind_parsing() {
        assert_eq!("one-sample".parse::<TTestKind>().unwrap(), TTestKind::OneSample);
        assert_eq!("paired".parse::<TTestKind>().unwrap(), TTestKind::Paired);
        assert!("three-sample".parse::<TTestKind>().is_err());
        assert_eq!(TTestKind::TwoSample.samples(), 2.0);
        assert_eq!(TTestKind::Paired.samples(), 1.0);
    }

    #[test]
    fn missing_identifies_unknown() {
        assert_eq!(t_query().missing().unwrap(), Quantity::N);
    }

    #[test]
    fn missing_rejects_zero_unknowns() {
        let q = t_query().with(Quantity::N, Some(30.0));
        let err = q.missing().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("exactly one of d, n, sig_level or power"));
    }

    #[test]
    fn missing_rejects_two_unknowns() {
        let q = t_query().with(Quantity::Power, None);
        let err = q.missing().unwrap_err();
        assert!(err.to_string().contains("only one of"));
    }

    #[test]
    fn unequal_families_list_both_sizes() {
        let q = PowerQuery::new(TestFamily::TUnequal);
        let err = q.missing().unwrap_err();
        assert!(err.to_string().contains("d, n1, n2, sig_level or power"), "{err}");
    }

    #[test]
    fn validate_ranges() {
        let q = t_query().with(Quantity::SigLevel, Some(1.5));
        let err = q.validate().unwrap_err();
        assert!(err.to_string().contains("sig_level must be between 0 and 1"));
        let q = t_query().with(Quantity::Power, Some(0.0));
        assert!(q.validate().unwrap_err().is_validation());
        let q = t_query().with(Quantity::Power, None).with(Quantity::N, Some(1.5));
        assert!(q.validate().unwrap_err().to_string().contains("at least 2"));
    }

    #[test]
    fn validate_family_specific() {
        let anova = PowerQuery::new(TestFamily::Anova)
            .with(Quantity::K, Some(1.0))
            .with(Quantity::N, Some(10.0))
            .with(Quantity::EffectSize, Some(0.25))
            .with(Quantity::SigLevel, Some(0.05));
        assert!(anova.validate().unwrap_err().to_string().contains("groups"));

        let r = PowerQuery::new(TestFamily::Correlation)
            .with(Quantity::EffectSize, Some(1.2))
            .with(Quantity::N, Some(50.0))
            .with(Quantity::SigLevel, Some(0.05));
        assert!(r.validate().is_err());

        let chisq = PowerQuery::new(TestFamily::ChiSquared { df: 0.0 })
            .with(Quantity::EffectSize, Some(0.3))
            .with(Quantity::N, Some(50.0))
            .with(Quantity::SigLevel, Some(0.05));
        assert!(chisq.validate().is_err());

        let f2 = PowerQuery::new(TestFamily::F2)
            .with(Quantity::U, Some(0.5))
            .with(Quantity::V, Some(50.0))
            .with(Quantity::SigLevel, Some(0.05))
            .with(Quantity::Power, Some(0.8));
        assert!(f2.validate().unwrap_err().to_string().contains("numerator"));
    }

    #[test]
    fn family_metadata() {
        let fam = TestFamily::ChiSquared { df: 3.0 };
        assert_eq!(fam.name(), "chisq");
        assert_eq!(fam.label(Quantity::N), "N");
        assert_eq!(fam.label(Quantity::EffectSize), "w");
        assert!(!fam.has_alternative());
        assert_eq!(TestFamily::Correlation.minimum(Quantity::N), 4.0);
        assert_eq!(TestFamily::Anova.minimum(Quantity::K), 2.0);
        assert!(TestFamily::F2.description().unwrap().contains("regression"));
    }

    fn sample_result() -> PowerResult {
        let q = t_query().with(Quantity::N, Some(63.76576));
        PowerResult::from_query(&q, Quantity::N).unwrap()
    }

    #[test]
    fn entries_and_ceil() {
        let r = sample_result();
        let keys: Vec<&str> = r.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["effect_size", "n", "sig_level", "power"]);
        assert_eq!(r.value(), 63.76576);
        assert_eq!(r.ceil_sizes().n, Some(64.0));
        assert_eq!(r.ceil_sizes().effect_size, 0.5);
    }

    #[test]
    fn ceil_leaves_non_size_unknowns() {
        let q = t_query().with(Quantity::N, Some(20.5));
        let r = PowerResult::from_query(&q, Quantity::EffectSize).unwrap();
        assert_eq!(r.ceil_sizes(), r);
    }

    #[test]
    fn summary_layout() {
        let s = sample_result().summary();
        assert!(s.contains("Two Sample t test power calculation"));
        assert!(s.contains("              n = 63.76576"));
        assert!(s.contains("      sig.level = 0.05"));
        assert!(s.contains("    alternative = two.sided"));
        assert!(s.contains("NOTE: n is number in each group"));
        assert_eq!(s, sample_result().to_string());
    }

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(0.05), "0.05");
        assert_eq!(format_value(0.9123145123), "0.9123145");
        assert_eq!(format_value(2096.0789), "2096.079");
        assert_eq!(format_value(64.0), "64");
        assert_eq!(format_value(0.0), "0");
    }
}
