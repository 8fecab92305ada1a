//! Core trait definitions shared across pwrkit crates.

/// A type that carries a short name and a longer description.
pub trait Annotated {
    /// A short machine-friendly name.
    fn name(&self) -> &str;

    /// An optional human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A human-readable summary suitable for display.
    fn summary(&self) -> String;
}
