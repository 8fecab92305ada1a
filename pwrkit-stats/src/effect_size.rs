//! Effect size measures used as inputs to power calculations.
//!
//! - [`es_h`] — Cohen's h for two proportions (arcsine transformation)
//! - [`es_w1`] — Cohen's w for goodness-of-fit
//! - [`es_w2`] — Cohen's w for association in a contingency table
//! - [`cohen_es`] — conventional small / medium / large values

use core::fmt;
use core::str::FromStr;

use pwrkit_core::{PwrError, Result, Summarizable};

/// Tolerance on the total mass of a probability vector or matrix.
const MASS_TOL: f64 = 1e-7;

/// Cohen's h: `2·asin(√p1) − 2·asin(√p2)`.
///
/// Both proportions must lie strictly between 0 and 1.
pub fn es_h(p1: f64, p2: f64) -> Result<f64> {
    for (name, p) in [("p1", p1), ("p2", p2)] {
        if !(p > 0.0 && p < 1.0) {
            return Err(PwrError::Domain(format!(
                "es_h: {name} must be in (0, 1), got {p}"
            )));
        }
    }
    Ok(2.0 * p1.sqrt().asin() - 2.0 * p2.sqrt().asin())
}

fn validate_mass(name: &str, probs: &[f64]) -> Result<()> {
    if let Some(&bad) = probs.iter().find(|&&p| !(p > 0.0)) {
        return Err(PwrError::Validation(format!(
            "{name}: all probabilities must be positive, got {bad}"
        )));
    }
    let total: f64 = probs.iter().sum();
    if (total - 1.0).abs() > MASS_TOL {
        return Err(PwrError::Validation(format!(
            "{name}: probabilities must sum to 1, got {total}"
        )));
    }
    Ok(())
}

/// Cohen's w for a goodness-of-fit test.
///
/// `p0` holds the cell probabilities under the null hypothesis and `p1`
/// those under the alternative: `w = √Σ (p1ᵢ − p0ᵢ)² / p0ᵢ`.
pub fn es_w1(p0: &[f64], p1: &[f64]) -> Result<f64> {
    if p0.len() != p1.len() {
        return Err(PwrError::Validation(format!(
            "es_w1: p0 and p1 must have the same length ({} vs {})",
            p0.len(),
            p1.len()
        )));
    }
    if p0.len() < 2 {
        return Err(PwrError::Validation(
            "es_w1: need at least 2 cells".into(),
        ));
    }
    validate_mass("es_w1", p0)?;
    validate_mass("es_w1", p1)?;

    let chi: f64 = p0
        .iter()
        .zip(p1)
        .map(|(&e, &o)| (o - e).powi(2) / e)
        .sum();
    Ok(chi.sqrt())
}

/// Cohen's w for association in an `r × c` table of joint probabilities.
///
/// Each cell is compared with the product of its row and column marginals:
/// `w = √Σ (Pᵢⱼ − PᵢPⱼ)² / (PᵢPⱼ)`.
pub fn es_w2(prob: &[&[f64]]) -> Result<f64> {
    let rows = prob.len();
    let cols = prob.first().map_or(0, |r| r.len());
    if rows < 2 || cols < 2 {
        return Err(PwrError::Validation(format!(
            "es_w2: need at least a 2x2 table, got {rows}x{cols}"
        )));
    }
    if let Some(i) = prob.iter().position(|r| r.len() != cols) {
        return Err(PwrError::Validation(format!(
            "es_w2: row {i} has {} columns, expected {cols}",
            prob[i].len()
        )));
    }
    let cells: Vec<f64> = prob.iter().flat_map(|r| r.iter().copied()).collect();
    validate_mass("es_w2", &cells)?;

    let row_margins: Vec<f64> = prob.iter().map(|r| r.iter().sum()).collect();
    let col_margins: Vec<f64> = (0..cols)
        .map(|j| prob.iter().map(|r| r[j]).sum())
        .collect();

    let mut chi = 0.0;
    for (i, row) in prob.iter().enumerate() {
        for (j, &p) in row.iter().enumerate() {
            let expected = row_margins[i] * col_margins[j];
            chi += (p - expected).powi(2) / expected;
        }
    }
    Ok(chi.sqrt())
}

// ── Conventional effect sizes ──────────────────────────────────────────────

/// Test family for which a conventional effect size is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CohenTest {
    /// Proportion tests (h).
    Proportion,
    /// t-tests (d).
    T,
    /// Correlation (r).
    Correlation,
    /// One-way ANOVA (f).
    Anova,
    /// Chi-squared tests (w).
    ChiSquared,
    /// General linear model (f²).
    F2,
}

impl CohenTest {
    /// Conventional value for the given magnitude.
    pub fn conventional(self, size: EffectMagnitude) -> f64 {
        let (small, medium, large) = match self {
            Self::Proportion | Self::T => (0.2, 0.5, 0.8),
            Self::Correlation => (0.1, 0.3, 0.5),
            Self::Anova => (0.1, 0.25, 0.4),
            Self::ChiSquared => (0.1, 0.3, 0.5),
            Self::F2 => (0.02, 0.15, 0.35),
        };
        match size {
            EffectMagnitude::Small => small,
            EffectMagnitude::Medium => medium,
            EffectMagnitude::Large => large,
        }
    }
}

impl FromStr for CohenTest {
    type Err = PwrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "2p" => Ok(Self::Proportion),
            "t" => Ok(Self::T),
            "r" => Ok(Self::Correlation),
            "anov" | "anova" => Ok(Self::Anova),
            "chisq" | "chisquare" => Ok(Self::ChiSquared),
            "f2" => Ok(Self::F2),
            _ => Err(PwrError::Validation(format!(
                "unknown test '{s}': expected one of p, t, r, anov, chisq, f2"
            ))),
        }
    }
}

impl fmt::Display for CohenTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proportion => write!(f, "p"),
            Self::T => write!(f, "t"),
            Self::Correlation => write!(f, "r"),
            Self::Anova => write!(f, "anov"),
            Self::ChiSquared => write!(f, "chisq"),
            Self::F2 => write!(f, "f2"),
        }
    }
}

/// Cohen's qualitative effect magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectMagnitude {
    Small,
    Medium,
    Large,
}

impl FromStr for EffectMagnitude {
    type Err = PwrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(PwrError::Validation(format!(
                "unknown size '{s}': expected small, medium or large"
            ))),
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// A conventional effect size lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSizeResult {
    pub test: CohenTest,
    pub size: EffectMagnitude,
    pub effect_size: f64,
    pub method: String,
}

impl Summarizable for EffectSizeResult {
    fn summary(&self) -> String {
        format!(
            "\n     {}\n\n           test = {}\n           size = {}\n    effect.size = {}\n",
            self.method, self.test, self.size, self.effect_size
        )
    }
}

impl fmt::Display for EffectSizeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Conventional effect size for a test family and size,
/// both given by name (e.g. `cohen_es("t", "medium")`).
pub fn cohen_es(test: &str, size: &str) -> Result<EffectSizeResult> {
    let test: CohenTest = test.parse()?;
    let size: EffectMagnitude = size.parse()?;
    Ok(EffectSizeResult {
        test,
        size,
        effect_size: test.conventional(size),
        method: "Conventional effect size from Cohen (1982)".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-7;

    #[test]
    fn es_h_reference() {
        // ES.h(0.5, 0.4) = 0.2013579
        let h = es_h(0.5, 0.4).unwrap();
        assert!((h - 0.201_357_9).abs() < TOL, "h={}", h);
        assert!((es_h(0.4, 0.5).unwrap() + h).abs() < 1e-12);
    }

    #[test]
    fn es_h_equal_proportions() {
        assert_eq!(es_h(0.5, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn es_h_out_of_range() {
        assert!(es_h(0.0, 0.5).unwrap_err().is_domain());
        assert!(es_h(0.5, 1.0).unwrap_err().is_domain());
        assert!(es_h(-0.1, 0.5).is_err());
        assert!(es_h(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn es_w1_reference() {
        let p0 = [0.25; 4];
        let p1 = [0.375, 0.625 / 3.0, 0.625 / 3.0, 0.625 / 3.0];
        let w = es_w1(&p0, &p1).unwrap();
        assert!((w - 0.288_675_1).abs() < TOL, "w={}", w);
    }

    #[test]
    fn es_w1_identical_is_zero() {
        assert_eq!(es_w1(&[0.25; 4], &[0.25; 4]).unwrap(), 0.0);
    }

    #[test]
    fn es_w1_validation() {
        assert!(es_w1(&[0.5, 0.5], &[0.2, 0.3, 0.5]).unwrap_err().is_validation());
        assert!(es_w1(&[0.5, 0.6], &[0.5, 0.5]).unwrap_err().is_validation());
        assert!(es_w1(&[1.0, 0.0], &[0.5, 0.5]).unwrap_err().is_validation());
        assert!(es_w1(&[1.0], &[1.0]).unwrap_err().is_validation());
    }

    #[test]
    fn es_w2_reference() {
        let r1 = [0.225, 0.125, 0.125, 0.125];
        let r2 = [0.16, 0.16, 0.04, 0.04];
        let w = es_w2(&[&r1, &r2]).unwrap();
        assert!((w - 0.255_864_6).abs() < TOL, "w={}", w);
    }

    #[test]
    fn es_w2_independent_is_zero() {
        // Outer product of (0.4, 0.6) and (0.5, 0.3, 0.2).
        let r1 = [0.2, 0.12, 0.08];
        let r2 = [0.3, 0.18, 0.12];
        let w = es_w2(&[&r1, &r2]).unwrap();
        assert!(w < 1e-7, "w={}", w);
    }

    #[test]
    fn es_w2_validation() {
        let ragged: [&[f64]; 2] = [&[0.25, 0.25], &[0.5]];
        assert!(es_w2(&ragged).unwrap_err().is_validation());
        let single: [&[f64]; 1] = [&[0.5, 0.5]];
        assert!(es_w2(&single).unwrap_err().is_validation());
        let unnormalized: [&[f64]; 2] = [&[0.3, 0.3], &[0.3, 0.3]];
        assert!(es_w2(&unnormalized).unwrap_err().is_validation());
    }

    #[test]
    fn cohen_es_table() {
        assert_eq!(cohen_es("t", "medium").unwrap().effect_size, 0.5);
        assert_eq!(cohen_es("r", "large").unwrap().effect_size, 0.5);
        assert_eq!(cohen_es("anov", "medium").unwrap().effect_size, 0.25);
        assert_eq!(cohen_es("anova", "large").unwrap().effect_size, 0.4);
        assert_eq!(cohen_es("chisq", "small").unwrap().effect_size, 0.1);
        assert_eq!(cohen_es("f2", "medium").unwrap().effect_size, 0.15);
        assert_eq!(cohen_es("p", "large").unwrap().effect_size, 0.8);
        assert_eq!(cohen_es("Chisquare", "LARGE").unwrap().effect_size, 0.5);
    }

    #[test]
    fn cohen_es_unknown_names() {
        assert!(cohen_es("z", "small").unwrap_err().is_validation());
        assert!(cohen_es("t", "huge").unwrap_err().is_validation());
    }

    #[test]
    fn cohen_es_summary_mentions_values() {
        let r = cohen_es("f2", "small").unwrap();
        let s = r.summary();
        assert!(s.contains("Conventional effect size from Cohen (1982)"));
        assert!(s.contains("test = f2"));
        assert!(s.contains("effect.size = 0.02"));
    }
}
