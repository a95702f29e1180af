pub mod context;
pub mod dummy;
pub mod error;

#[cfg(test)]
mod memory;

/// Result of a single reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// the object converged or is gone
    Done,
    /// a write lost a version race, the pass has to be run again
    Retry,
}
