//! Shared primitives for the pwrkit power analysis crates.
//!
//! `pwrkit-core` provides the foundation the numerical crates build on:
//!
//! - **Error types** — [`PwrError`] and [`Result`] for structured error handling
//! - **Traits** — [`Annotated`] and [`Summarizable`] for named, printable results

pub mod error;
pub mod traits;

pub use error::{PwrError, Result};
pub use traits::*;
