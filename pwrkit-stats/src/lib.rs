//! Statistical power analysis for classical hypothesis tests.
//!
//! For each supported test, bind all but one of effect size, sample size,
//! significance level and power; the remaining quantity is computed.
//!
//! - **Distributions** — central and noncentral t, F and chi-squared laws
//! - **Root finding** — Brent's method and bisection behind one trait
//! - **Effect sizes** — Cohen's h and w, conventional magnitudes
//! - **Power models** — forward power of every test family
//! - **Solver** — bracket selection, widening and root-finding fallback
//! - **API** — `pwr_*_test` entry points modelled on R's `pwr` package
//!
//! ```no_run
//! use pwrkit_stats::{pwr_anova_test, Summarizable};
//!
//! let r = pwr_anova_test(Some(4.0), Some(25.0), Some(0.25), Some(0.05), None)?;
//! println!("{}", r.summary());
//! # Ok::<(), pwrkit_stats::PwrError>(())
//! ```

pub mod api;
pub mod distribution;
pub mod effect_size;
pub mod models;
pub mod query;
pub mod roots;
pub mod solver;

pub use api::{
    pwr_2p2n_test, pwr_2p_test, pwr_anova_test, pwr_chisq_test, pwr_f2_test, pwr_norm_test,
    pwr_p_test, pwr_r_test, pwr_t2n_test, pwr_t_test,
};
pub use effect_size::{cohen_es, es_h, es_w1, es_w2, CohenTest, EffectMagnitude, EffectSizeResult};
pub use pwrkit_core::{Annotated, PwrError, Result, Summarizable};
pub use query::{Alternative, PowerQuery, PowerResult, Quantity, TTestKind, TestFamily};
pub use solver::SolverConfig;
