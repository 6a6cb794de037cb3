//! Strongly-typed identifiers for container instances and mutation epochs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`StaveId`] allocation.
static STAVE_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a container.
///
/// Allocated from a monotonic atomic counter via [`StaveId::next`].
/// Two distinct containers always have different IDs, even if one was
/// dropped and the other allocated at the same address. Cursors carry the
/// ID of the container that minted them so a cursor can never be resolved
/// against a different container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaveId(u64);

impl StaveId {
    /// Allocate a fresh, unique instance ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(STAVE_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing counter of invalidating mutations.
///
/// Advanced by every mutation that relocates storage or moves, destroys,
/// or replaces elements in place. Appends that fit in spare capacity do
/// not advance it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The epoch following this one.
    pub fn successor(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Epoch {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stave_ids_are_unique() {
        let a = StaveId::next();
        let b = StaveId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn epoch_successor_increments() {
        assert_eq!(Epoch(0).successor(), Epoch(1));
        assert_eq!(Epoch::from(41).successor().to_string(), "42");
    }
}
