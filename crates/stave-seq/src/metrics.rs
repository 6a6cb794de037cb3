//! Per-container operation counters.
//!
//! [`StaveMetrics`] accumulates over the life of a container. Reading it
//! is free; the counters are plain integers updated on the mutation paths.

/// Cumulative counters for one container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaveMetrics {
    /// Number of times storage moved to a new block.
    pub reallocations: u64,
    /// Elements moved from an old block into a new one.
    pub relocated_elements: u64,
    /// Elements shifted within the current block by insert or erase.
    pub shifted_elements: u64,
    /// Operations that failed after staging began and were rolled back.
    pub rollbacks: u64,
    /// Mutations that invalidated at least one cursor position.
    pub invalidations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StaveMetrics::default();
        assert_eq!(m.reallocations, 0);
        assert_eq!(m.relocated_elements, 0);
        assert_eq!(m.shifted_elements, 0);
        assert_eq!(m.rollbacks, 0);
        assert_eq!(m.invalidations, 0);
    }
}
