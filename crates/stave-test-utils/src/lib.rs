//! Test utilities for Stave development.
//!
//! Provides an instrumented element type ([`Tracked`]) whose constructions,
//! clones, and destructions are recorded in a shared [`Ledger`], and slot
//! sources that fail on demand (see [`fixtures`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;

pub use fixtures::{FailingSource, PanickingSource, StateSnapshot, TrackedSource};

#[derive(Debug, Default)]
struct LedgerState {
    next_id: u64,
    constructed: u64,
    cloned: u64,
    destroyed: u64,
    double_drops: u64,
    live: IndexSet<u64>,
    clone_budget: Option<u64>,
}

/// Shared record of every [`Tracked`] value's lifecycle.
///
/// Clones of a ledger share state, so a test can hand values to a
/// container and audit them after the container is gone.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    state: Rc<RefCell<LedgerState>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a fresh tracked value.
    pub fn make(&self, value: i64) -> Tracked {
        let id = self.register(false);
        Tracked {
            id,
            value,
            ledger: self.clone(),
        }
    }

    /// Construct one tracked value per item.
    pub fn make_all(&self, values: impl IntoIterator<Item = i64>) -> Vec<Tracked> {
        values.into_iter().map(|v| self.make(v)).collect()
    }

    /// Let `n` more clones succeed, then panic on every clone after that.
    pub fn panic_on_clone_after(&self, n: u64) {
        self.state.borrow_mut().clone_budget = Some(n);
    }

    /// Remove the clone budget.
    pub fn allow_clones(&self) {
        self.state.borrow_mut().clone_budget = None;
    }

    /// Values constructed with [`make`](Self::make).
    pub fn constructions(&self) -> u64 {
        self.state.borrow().constructed
    }

    /// Values produced by `Clone`.
    pub fn clones(&self) -> u64 {
        self.state.borrow().cloned
    }

    /// Values dropped.
    pub fn destructions(&self) -> u64 {
        self.state.borrow().destroyed
    }

    /// Values alive right now.
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// IDs of the values alive right now, in creation order.
    pub fn live_ids(&self) -> Vec<u64> {
        self.state.borrow().live.iter().copied().collect()
    }

    /// Drops of a value that was not alive. Always zero for sound code.
    pub fn double_drops(&self) -> u64 {
        self.state.borrow().double_drops
    }

    /// `constructions + clones - destructions`, which must equal
    /// [`live_count`](Self::live_count).
    pub fn balance(&self) -> i64 {
        let s = self.state.borrow();
        (s.constructed + s.cloned) as i64 - s.destroyed as i64
    }

    fn register(&self, cloned: bool) -> u64 {
        let mut s = self.state.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        if cloned {
            s.cloned += 1;
        } else {
            s.constructed += 1;
        }
        s.live.insert(id);
        id
    }

    fn take_clone_permit(&self) -> bool {
        let mut s = self.state.borrow_mut();
        match s.clone_budget {
            Some(0) => false,
            Some(n) => {
                s.clone_budget = Some(n - 1);
                true
            }
            None => true,
        }
    }

    fn retire(&self, id: u64) {
        let mut s = self.state.borrow_mut();
        s.destroyed += 1;
        if !s.live.shift_remove(&id) {
            s.double_drops += 1;
        }
    }
}

/// An element whose lifecycle is recorded in a [`Ledger`].
///
/// Equality, ordering, and hashing look only at `value`.
pub struct Tracked {
    id: u64,
    pub value: i64,
    ledger: Ledger,
}

impl Tracked {
    /// Unique ID of this instance. Clones get new IDs.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if !self.ledger.take_clone_permit() {
            panic!("clone budget exhausted cloning value {}", self.value);
        }
        let id = self.ledger.register(true);
        Self {
            id,
            value: self.value,
            ledger: self.ledger.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.retire(self.id);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Tracked {}

impl PartialEq<i64> for Tracked {
    fn eq(&self, other: &i64) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({}#{})", self.value, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_balances() {
        let ledger = Ledger::new();
        let a = ledger.make(1);
        let b = a.clone();
        assert_ne!(a.id(), b.id());
        assert_eq!(ledger.live_count(), 2);
        drop(a);
        assert_eq!(ledger.live_ids(), vec![b.id()]);
        drop(b);
        assert_eq!(ledger.balance(), 0);
        assert_eq!(ledger.double_drops(), 0);
    }

    #[test]
    fn clone_budget_panics_when_spent() {
        let ledger = Ledger::new();
        let a = ledger.make(7);
        ledger.panic_on_clone_after(1);
        let _b = a.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.clone()));
        assert!(result.is_err());
        assert_eq!(ledger.clones(), 1);
        ledger.allow_clones();
        let _c = a.clone();
    }
}
