//! Solving a power query for its unknown quantity.
//!
//! [`resolve`] evaluates the power model directly when power is the unknown.
//! Otherwise it builds `x ↦ power(query with x) − target`, picks a
//! [`SearchSpace`] for the unknown, widens the bracket until the objective
//! changes sign and hands the bracket to a [`RootFinder`]: Brent first,
//! bisection if Brent fails to converge.

use pwrkit_core::{PwrError, Result};
use tracing::{debug, trace};

use crate::models;
use crate::query::{Alternative, PowerQuery, PowerResult, Quantity, TestFamily};
use crate::roots::{Bisection, Brent, RootFinder, RootResult, ScalarOptions};

/// Lower offset keeping brackets off open domain boundaries.
const EPS: f64 = 1e-10;

/// Policy of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Options of the primary root finder.
    pub options: ScalarOptions,
    /// Iteration cap of the bisection fallback.
    pub fallback_max_iter: usize,
    /// Maximum number of bracket widening steps.
    pub max_widenings: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            options: ScalarOptions::default(),
            fallback_max_iter: 200,
            max_widenings: 8,
        }
    }
}

/// A closed interval expected to contain a root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
}

impl Bracket {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The bracket reflected through zero.
    pub fn mirrored(&self) -> Self {
        Self {
            lower: -self.upper,
            upper: -self.lower,
        }
    }
}

/// How a bracket may grow when it does not yet enclose a sign change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Widening {
    /// The bracket is the whole admissible domain.
    Fixed,
    /// Multiply the end farther from zero by `factor` while its magnitude
    /// stays within `limit`.
    Scale { factor: f64, limit: f64 },
}

/// Initial bracket plus widening policy for one unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSpace {
    pub bracket: Bracket,
    pub widening: Widening,
}

impl SearchSpace {
    pub fn fixed(lower: f64, upper: f64) -> Self {
        Self {
            bracket: Bracket::new(lower, upper),
            widening: Widening::Fixed,
        }
    }

    pub fn scaled(lower: f64, upper: f64, factor: f64, limit: f64) -> Self {
        Self {
            bracket: Bracket::new(lower, upper),
            widening: Widening::Scale { factor, limit },
        }
    }

    /// Reflect the search through zero (for `less` alternatives).
    pub fn mirrored(self) -> Self {
        Self {
            bracket: self.bracket.mirrored(),
            ..self
        }
    }

    /// Next wider bracket, or `None` once the limit is reached.
    fn widen(&self, b: Bracket) -> Option<Bracket> {
        let Widening::Scale { factor, limit } = self.widening else {
            return None;
        };
        if b.upper.abs() >= b.lower.abs() {
            if b.upper.abs() >= limit {
                return None;
            }
            Some(Bracket::new(b.lower, (b.upper * factor).min(limit)))
        } else {
            if b.lower.abs() >= limit {
                return None;
            }
            Some(Bracket::new((b.lower * factor).max(-limit), b.upper))
        }
    }

    /// Search space for `missing` in `query`.
    pub fn for_query(query: &PowerQuery, missing: Quantity) -> Self {
        let family = query.family;
        let less = family.has_alternative() && query.alternative == Alternative::Less;
        match missing {
            Quantity::EffectSize => {
                let space = if family == TestFamily::Correlation {
                    Self::fixed(EPS, 1.0 - EPS)
                } else {
                    Self::scaled(EPS, 10.0, 2.0, 1e7)
                };
                if less {
                    space.mirrored()
                } else {
                    space
                }
            }
            Quantity::SigLevel | Quantity::Power => Self::fixed(EPS, 1.0 - EPS),
            q => {
                let upper = if matches!(q, Quantity::K | Quantity::U) { 100.0 } else { 1e7 };
                Self::scaled(family.minimum(q) + EPS, upper, 10.0, 1e9)
            }
        }
    }
}

fn no_solution() -> PwrError {
    PwrError::Convergence(
        "no solution exists for the given combination of power and other parameters".into(),
    )
}

/// Find a root of `objective` in `search` with `primary`, retrying with
/// `fallback` if the primary method does not converge.
pub fn solve_with(
    primary: &dyn RootFinder,
    fallback: Option<&dyn RootFinder>,
    objective: &mut dyn FnMut(f64) -> Result<f64>,
    search: &SearchSpace,
    config: &SolverConfig,
) -> Result<RootResult> {
    let mut bracket = search.bracket;
    let mut f_lower = objective(bracket.lower)?;
    let mut f_upper = objective(bracket.upper)?;
    debug!(lower = bracket.lower, upper = bracket.upper, f_lower, f_upper, "initial bracket");

    let mut widenings = 0;
    while f_lower != 0.0 && f_upper != 0.0 && f_lower.signum() == f_upper.signum() {
        if widenings >= config.max_widenings {
            return Err(no_solution());
        }
        let Some(next) = search.widen(bracket) else {
            return Err(no_solution());
        };
        widenings += 1;
        if next.lower != bracket.lower {
            f_lower = objective(next.lower)?;
        }
        if next.upper != bracket.upper {
            f_upper = objective(next.upper)?;
        }
        bracket = next;
        debug!(widenings, lower = bracket.lower, upper = bracket.upper, "widened bracket");
    }

    match primary.find_root(objective, bracket.lower, bracket.upper, &config.options) {
        Ok(r) => {
            trace!(method = primary.name(), iterations = r.iterations, root = r.root, "converged");
            Ok(r)
        }
        Err(PwrError::Convergence(msg)) => {
            let Some(fallback) = fallback else {
                return Err(PwrError::Convergence(msg));
            };
            debug!(from = primary.name(), to = fallback.name(), reason = %msg, "falling back");
            let options = ScalarOptions {
                max_iter: config.fallback_max_iter,
                ..config.options
            };
            let r = fallback.find_root(objective, bracket.lower, bracket.upper, &options)?;
            trace!(method = fallback.name(), iterations = r.iterations, root = r.root, "converged");
            Ok(r)
        }
        Err(e) => Err(e),
    }
}

/// Find a root of `objective` in `search` with Brent's method and a
/// bisection fallback.
pub fn solve_for(
    objective: &mut dyn FnMut(f64) -> Result<f64>,
    search: &SearchSpace,
    config: &SolverConfig,
) -> Result<f64> {
    solve_with(&Brent, Some(&Bisection), objective, search, config).map(|r| r.root)
}

/// Normalize a validated query before solving.
///
/// Two-sided tests only see `|effect|`. A one-sided test whose effect points
/// away from the alternative cannot reach a target power by adding
/// observations, so solving for a size is rejected.
fn prepare(query: &PowerQuery, missing: Quantity) -> Result<PowerQuery> {
    let mut query = query.clone();
    let Some(es) = query.effect_size else {
        return Ok(query);
    };
    if !query.family.has_alternative() {
        return Ok(query);
    }
    match query.alternative {
        Alternative::TwoSided => query.effect_size = Some(es.abs()),
        Alternative::Greater | Alternative::Less if missing.is_size() => {
            let wrong = match query.alternative {
                Alternative::Greater => es < 0.0,
                _ => es > 0.0,
            };
            if wrong {
                return Err(PwrError::Domain(format!(
                    "{} = {es} contradicts alternative '{}'",
                    query.family.effect_label(),
                    query.alternative
                )));
            }
        }
        _ => {}
    }
    Ok(query)
}

/// Validate `query`, solve it for its unknown quantity and package the
/// result.
pub fn resolve(query: &PowerQuery, config: &SolverConfig) -> Result<PowerResult> {
    let missing = query.validate()?;
    let mut query = prepare(query, missing)?;

    if missing == Quantity::Power {
        let power = models::power(&query)?;
        query.power = Some(power);
        return PowerResult::from_query(&query, missing);
    }

    let target = query.require(Quantity::Power)?;
    let search = SearchSpace::for_query(&query, missing);
    debug!(
        family = ?query.family,
        unknown = %missing,
        lower = search.bracket.lower,
        upper = search.bracket.upper,
        "solving"
    );

    let mut trial = query.clone();
    let mut objective = |x: f64| -> Result<f64> {
        trial.set(missing, Some(x));
        Ok(models::power(&trial)? - target)
    };
    let root = solve_for(&mut objective, &search, config)?;
    debug!(unknown = %missing, value = root, "solved");

    query.set(missing, Some(root));
    PowerResult::from_query(&query, missing)
}
