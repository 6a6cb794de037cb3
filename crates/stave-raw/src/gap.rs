//! In-place hole opening within spare capacity.
//!
//! [`RawStorage::fill_gap`] shifts the tail up, constructs the hole, and
//! commits. If construction fails the filled prefix is destroyed and the
//! tail is shifted back, so the storage ends up exactly as it started.

use std::ptr::{self, NonNull};

use stave_core::{SlotSource, StaveError};

use crate::alloc::SlotAllocator;
use crate::guard::ConstructionGuard;
use crate::storage::RawStorage;

/// Holds a tail that was shifted up to open a hole.
///
/// While armed, `len` covers only the prefix. Dropping moves the tail back
/// over the hole and restores the original length; [`commit`](Self::commit)
/// instead accepts the hole as live.
struct ShiftedTail<'a, T> {
    base: NonNull<T>,
    position: usize,
    count: usize,
    tail: usize,
    len: &'a mut usize,
}

impl<T> ShiftedTail<'_, T> {
    fn commit(self) {
        *self.len = self.position + self.count + self.tail;
        std::mem::forget(self);
    }
}

impl<T> Drop for ShiftedTail<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the tail sits at [position + count, position + count + tail)
        // and the hole below it holds no live values by the time this runs.
        unsafe {
            let hole = self.base.add(self.position);
            ptr::copy(hole.add(self.count).as_ptr(), hole.as_ptr(), self.tail);
        }
        *self.len = self.position + self.tail;
    }
}

impl<T, A: SlotAllocator> RawStorage<T, A> {
    /// Open `count` slots at `position` and fill them from `source`.
    ///
    /// Requires `count <= slack()`; never reallocates.
    ///
    /// # Errors
    ///
    /// - [`StaveError::OutOfBounds`] if `position > len`.
    /// - [`StaveError::CapacityOverflow`] if `count` exceeds the slack.
    /// - [`StaveError::ConstructionFailed`] if the source fails; the
    ///   storage is then unchanged.
    pub fn fill_gap<S: SlotSource<T> + ?Sized>(
        &mut self,
        position: usize,
        count: usize,
        source: &mut S,
    ) -> Result<(), StaveError> {
        let len = self.len;
        if position > len {
            return Err(StaveError::OutOfBounds {
                index: position,
                len,
            });
        }
        if count > self.capacity - len {
            return Err(StaveError::CapacityOverflow {
                requested: len.saturating_add(count),
                max: self.capacity,
            });
        }
        if count == 0 {
            return Ok(());
        }

        let tail = len - position;
        // SAFETY: position <= len <= capacity.
        let hole = unsafe { self.base.add(position) };
        // SAFETY: [position, len) is live and [position + count, len + count)
        // fits in capacity; `ptr::copy` handles the overlap.
        unsafe { ptr::copy(hole.as_ptr(), hole.add(count).as_ptr(), tail) };
        self.len = position;

        let shifted = ShiftedTail {
            base: self.base,
            position,
            count,
            tail,
            len: &mut self.len,
        };
        // SAFETY: the hole [position, position + count) is uninitialised
        // after the shift and nothing else reaches it.
        let mut guard = unsafe { ConstructionGuard::new(&self.alloc, hole, count) };
        guard.fill(source)?;
        let _ = guard.finish();
        shifted.commit();
        Ok(())
    }

    /// Insert one value at `position`, shifting the tail up by one.
    ///
    /// Hands `value` back if there is no slack or `position > len`.
    pub fn insert_within_capacity(&mut self, position: usize, value: T) -> Result<(), T> {
        let len = self.len;
        if position > len || len == self.capacity {
            return Err(value);
        }
        // SAFETY: position <= len < capacity. [position, len) is live and
        // moves up one slot into allocated space; the freed slot is then
        // written exactly once.
        unsafe {
            let slot = self.base.add(position);
            ptr::copy(slot.as_ptr(), slot.add(1).as_ptr(), len - position);
            self.alloc.construct(slot, value);
        }
        self.len = len + 1;
        Ok(())
    }

    /// Move every element of `other` onto the end of `self`.
    ///
    /// Requires `other.len() <= self.slack()`. `other` is left empty with
    /// its capacity intact.
    ///
    /// # Errors
    ///
    /// [`StaveError::CapacityOverflow`] if the elements do not fit; both
    /// storages are then unchanged.
    pub fn absorb<B: SlotAllocator>(&mut self, other: &mut RawStorage<T, B>) -> Result<(), StaveError> {
        let count = other.len;
        if count > self.capacity - self.len {
            return Err(StaveError::CapacityOverflow {
                requested: self.len.saturating_add(count),
                max: self.capacity,
            });
        }
        // SAFETY: other's [0, count) is live; our [len, len + count) is
        // allocated and uninitialised; distinct storages never share a block.
        unsafe {
            ptr::copy_nonoverlapping(other.base.as_ptr(), self.base.add(self.len).as_ptr(), count);
        }
        other.len = 0;
        self.len += count;
        Ok(())
    }
}
