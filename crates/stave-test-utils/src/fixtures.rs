//! Slot sources with scripted failures, and container state snapshots.

use std::cell::Cell;

use stave_core::{ConstructError, SlotSource};

use crate::{Ledger, Tracked};

// ── TrackedSource ───────────────────────────────────────────────

/// Produces tracked values `start, start + 1, ...` in slot order.
pub struct TrackedSource<'a> {
    ledger: &'a Ledger,
    start: i64,
    calls: Cell<usize>,
}

impl<'a> TrackedSource<'a> {
    pub fn new(ledger: &'a Ledger, start: i64) -> Self {
        Self {
            ledger,
            start,
            calls: Cell::new(0),
        }
    }

    /// How many values have been produced.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SlotSource<Tracked> for TrackedSource<'_> {
    fn produce(&mut self, offset: usize) -> Result<Tracked, ConstructError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.ledger.make(self.start + offset as i64))
    }
}

// ── FailingSource ───────────────────────────────────────────────

/// Produces tracked values for the first `succeed_count` slots, then
/// returns an error.
///
/// Used to exercise rollback: every value produced before the failure
/// must be destroyed and the container left as it was.
pub struct FailingSource<'a> {
    ledger: &'a Ledger,
    succeed_count: usize,
    calls: Cell<usize>,
}

impl<'a> FailingSource<'a> {
    pub fn new(ledger: &'a Ledger, succeed_count: usize) -> Self {
        Self {
            ledger,
            succeed_count,
            calls: Cell::new(0),
        }
    }

    /// How many times `produce` has been called, including the failing call.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn reset(&self) {
        self.calls.set(0);
    }
}

impl SlotSource<Tracked> for FailingSource<'_> {
    fn produce(&mut self, offset: usize) -> Result<Tracked, ConstructError> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.succeed_count {
            return Err(ConstructError::new(format!(
                "source exhausted after {} values",
                self.succeed_count
            )));
        }
        Ok(self.ledger.make(100 + offset as i64))
    }
}

// ── PanickingSource ─────────────────────────────────────────────

/// Like [`FailingSource`], but panics instead of returning an error.
pub struct PanickingSource<'a> {
    ledger: &'a Ledger,
    succeed_count: usize,
    calls: usize,
}

impl<'a> PanickingSource<'a> {
    pub fn new(ledger: &'a Ledger, succeed_count: usize) -> Self {
        Self {
            ledger,
            succeed_count,
            calls: 0,
        }
    }
}

impl SlotSource<Tracked> for PanickingSource<'_> {
    fn produce(&mut self, offset: usize) -> Result<Tracked, ConstructError> {
        if self.calls >= self.succeed_count {
            panic!("source panicked after {} values", self.succeed_count);
        }
        self.calls += 1;
        Ok(self.ledger.make(200 + offset as i64))
    }
}

// ── StateSnapshot ───────────────────────────────────────────────

/// Observable state of a container: length, capacity, and element values.
///
/// Two snapshots compare equal when a failed operation left the
/// container unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSnapshot {
    pub len: usize,
    pub capacity: usize,
    pub values: Vec<i64>,
}

impl StateSnapshot {
    /// Snapshot a sequence of tracked values held in a block of `capacity`.
    pub fn capture(contents: &[Tracked], capacity: usize) -> Self {
        Self {
            len: contents.len(),
            capacity,
            values: contents.iter().map(|t| t.value).collect(),
        }
    }
}
