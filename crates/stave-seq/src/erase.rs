//! Positional removal and truncation.
//!
//! Removal never reallocates. Bounds are validated before anything is
//! touched, so every `Err` leaves the container as it was; the storage
//! layer keeps the sequence compact even if an element destructor panics.
//!
//! Cursor invalidation is recorded before the storage call whenever the
//! floor is known up front, so a panic that unwinds out of a destructor
//! or predicate still stales every cursor whose slot moved.

use std::ops::RangeBounds;

use stave_core::StaveError;
use stave_raw::SlotAllocator;

use crate::epoch::EpochLog;
use crate::metrics::StaveMetrics;
use crate::stave::Stave;

/// Records a floor-0 invalidation if dropped while still armed.
///
/// Covers compaction passes whose first shifted slot is unknown until
/// they finish.
struct InvalidateOnUnwind<'a> {
    epochs: &'a mut EpochLog,
    metrics: &'a mut StaveMetrics,
    armed: bool,
}

impl Drop for InvalidateOnUnwind<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.epochs.record(0);
            self.metrics.invalidations += 1;
        }
    }
}

impl<T, A: SlotAllocator> Stave<T, A> {
    /// Remove and return the element at `index`, shifting later elements
    /// down.
    pub fn erase(&mut self, index: usize) -> Result<T, StaveError> {
        let value = self.storage.take(index)?;
        self.account_shift(index, self.len() - index);
        Ok(value)
    }

    /// Destroy the elements in `range`, shifting later elements down.
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<(), StaveError> {
        let (first, last) = self.bounds(range)?;
        if first == last {
            return Ok(());
        }
        let tail = self.len() - last;
        self.account_shift(first, tail);
        self.storage.erase_range(first, last)
    }

    /// Remove every element for which `pred` returns `true`.
    ///
    /// Returns the number removed.
    pub fn erase_if<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> usize {
        self.retain_mut(|v| !pred(v))
    }

    /// Keep only the elements for which `keep` returns `true`.
    ///
    /// Returns the number removed.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> usize {
        self.retain_mut(|v| keep(v))
    }

    /// Keep only the elements for which `keep` returns `true`, letting it
    /// modify each element it visits.
    ///
    /// Returns the number removed.
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, keep: F) -> usize {
        let mut unwind = InvalidateOnUnwind {
            epochs: &mut self.epochs,
            metrics: &mut self.metrics,
            armed: true,
        };
        let outcome = self.storage.retain_mut(keep);
        unwind.armed = false;
        drop(unwind);
        if let Some(first) = outcome.first_removed {
            self.invalidate(first);
        }
        outcome.removed
    }

    /// Remove and return the last element.
    ///
    /// # Errors
    ///
    /// [`StaveError::Empty`] if there is none.
    pub fn pop(&mut self) -> Result<T, StaveError> {
        let value = self.storage.pop().ok_or(StaveError::Empty)?;
        let len = self.len();
        self.invalidate(len);
        Ok(value)
    }

    /// Destroy the elements at `new_len..`. Capacity is retained.
    ///
    /// No-op when `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        self.invalidate(new_len);
        self.storage.truncate(new_len);
    }

    /// Destroy every element. Capacity is retained.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroy every element and free the block.
    pub fn release(&mut self) {
        if self.storage.is_allocated() {
            self.invalidate(0);
        }
        self.storage.release();
    }

    fn account_shift(&mut self, floor: usize, tail: usize) {
        self.metrics.shifted_elements += tail as u64;
        self.invalidate(floor);
    }
}
