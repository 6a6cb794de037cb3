//! Positional removal.
//!
//! Removal never reallocates and never changes capacity. Bounds are
//! checked before anything is touched; after that the only code that can
//! fail is an element destructor, and the gap-closing guards keep the
//! storage consistent even if one panics.

use std::ptr::{self, NonNull};

use stave_core::StaveError;

use crate::alloc::SlotAllocator;
use crate::guard::destroy_slots;
use crate::storage::RawStorage;

/// Closes the gap left by destroyed elements when dropped.
struct CloseGap<'a, T> {
    base: NonNull<T>,
    first: usize,
    count: usize,
    tail: usize,
    len: &'a mut usize,
}

impl<T> Drop for CloseGap<'_, T> {
    fn drop(&mut self) {
        // SAFETY: [first + count, first + count + tail) is the live tail;
        // [first, first + count) no longer holds live values.
        unsafe {
            let gap = self.base.add(self.first);
            ptr::copy(gap.add(self.count).as_ptr(), gap.as_ptr(), self.tail);
        }
        *self.len = self.first + self.tail;
    }
}

/// Compacts the survivors of a [`RawStorage::retain_mut`] pass when dropped.
struct Compaction<'a, T> {
    base: NonNull<T>,
    processed: usize,
    deleted: usize,
    original: usize,
    len: &'a mut usize,
}

impl<T> Drop for Compaction<'_, T> {
    fn drop(&mut self) {
        if self.deleted > 0 && self.processed < self.original {
            // SAFETY: [processed, original) is live and unvisited; it moves
            // down over the `deleted` dead slots directly below it.
            unsafe {
                let src = self.base.add(self.processed);
                ptr::copy(
                    src.as_ptr(),
                    src.sub(self.deleted).as_ptr(),
                    self.original - self.processed,
                );
            }
        }
        *self.len = self.original - self.deleted;
    }
}

/// Summary of a [`RawStorage::retain_mut`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Retained {
    /// Number of elements removed.
    pub removed: usize,
    /// Index (before the pass) of the first removed element.
    pub first_removed: Option<usize>,
}

impl<T, A: SlotAllocator> RawStorage<T, A> {
    /// Destroy `[first, last)` and move the tail down to `first`.
    ///
    /// # Errors
    ///
    /// [`StaveError::InvalidRange`] if `first > last` or `last > len`; the
    /// storage is then unchanged.
    pub fn erase_range(&mut self, first: usize, last: usize) -> Result<(), StaveError> {
        let len = self.len;
        if first > last || last > len {
            return Err(StaveError::InvalidRange {
                start: first,
                end: last,
                len,
            });
        }
        let count = last - first;
        if count == 0 {
            return Ok(());
        }
        self.len = first;
        let close = CloseGap {
            base: self.base,
            first,
            count,
            tail: len - last,
            len: &mut self.len,
        };
        // SAFETY: [first, last) is live and, with len lowered, unreachable
        // except through this call.
        unsafe { destroy_slots(&self.alloc, self.base.add(first), count) };
        drop(close);
        Ok(())
    }

    /// Move the element at `index` out and close the gap.
    ///
    /// # Errors
    ///
    /// [`StaveError::OutOfBounds`] if `index >= len`.
    pub fn take(&mut self, index: usize) -> Result<T, StaveError> {
        let len = self.len;
        if index >= len {
            return Err(StaveError::OutOfBounds { index, len });
        }
        // SAFETY: index < len, so the slot is live. It is read once and the
        // tail is moved over it before anything else can observe it.
        unsafe {
            let slot = self.base.add(index);
            let value = slot.as_ptr().read();
            ptr::copy(slot.add(1).as_ptr(), slot.as_ptr(), len - index - 1);
            self.len = len - 1;
            Ok(value)
        }
    }

    /// Keep only the elements for which `keep` returns `true`, preserving
    /// their order.
    ///
    /// If `keep` or a destructor panics, elements not yet visited are kept
    /// and the storage stays compact.
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) -> Retained {
        let original = self.len;
        let mut first_removed = None;
        self.len = 0;
        let mut pass = Compaction {
            base: self.base,
            processed: 0,
            deleted: 0,
            original,
            len: &mut self.len,
        };
        while pass.processed < pass.original {
            // SAFETY: processed < original, so the slot is live and not yet
            // visited. Kept elements move down into dead slots only.
            unsafe {
                let cur = pass.base.add(pass.processed);
                if keep(&mut *cur.as_ptr()) {
                    if pass.deleted > 0 {
                        ptr::copy_nonoverlapping(cur.as_ptr(), cur.sub(pass.deleted).as_ptr(), 1);
                    }
                    pass.processed += 1;
                } else {
                    first_removed.get_or_insert(pass.processed);
                    pass.processed += 1;
                    pass.deleted += 1;
                    self.alloc.destroy(cur);
                }
            }
        }
        let removed = pass.deleted;
        drop(pass);
        Retained {
            removed,
            first_removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relocate::{relocate, Relocation};
    use stave_core::{CloneSlice, Generate};
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    fn storage(values: &[i32]) -> RawStorage<i32> {
        let mut s = RawStorage::default();
        relocate(
            &mut s,
            &Relocation::with_hole(values.len() + 2, 0, values.len()),
            &mut CloneSlice(values),
        )
        .unwrap();
        s
    }

    #[test]
    fn erase_range_closes_gap() {
        let mut s = storage(&[0, 1, 2, 3, 4, 5]);
        s.erase_range(1, 4).unwrap();
        assert_eq!(s.as_slice(), &[0, 4, 5]);
        assert_eq!(s.capacity(), 8);
    }

    #[test]
    fn empty_range_is_noop() {
        let mut s = storage(&[1, 2]);
        s.erase_range(1, 1).unwrap();
        s.erase_range(2, 2).unwrap();
        assert_eq!(s.as_slice(), &[1, 2]);
    }

    #[test]
    fn bad_range_is_rejected_untouched() {
        let mut s = storage(&[1, 2, 3]);
        assert_eq!(
            s.erase_range(2, 1).unwrap_err(),
            StaveError::InvalidRange {
                start: 2,
                end: 1,
                len: 3
            }
        );
        assert!(s.erase_range(0, 4).is_err());
        assert_eq!(s.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn take_returns_value_and_shifts() {
        let mut s = storage(&[7, 8, 9]);
        assert_eq!(s.take(1).unwrap(), 8);
        assert_eq!(s.as_slice(), &[7, 9]);
        assert_eq!(
            s.take(2).unwrap_err(),
            StaveError::OutOfBounds { index: 2, len: 2 }
        );
    }

    #[test]
    fn retain_reports_first_removed() {
        let mut s = storage(&[1, 2, 3, 4, 5, 6]);
        let outcome = s.retain_mut(|v| *v % 3 != 0);
        assert_eq!(s.as_slice(), &[1, 2, 4, 5]);
        assert_eq!(
            outcome,
            Retained {
                removed: 2,
                first_removed: Some(2)
            }
        );
    }

    #[test]
    fn retain_can_mutate_survivors() {
        let mut s = storage(&[1, 2, 3]);
        let outcome = s.retain_mut(|v| {
            *v *= 10;
            true
        });
        assert_eq!(s.as_slice(), &[10, 20, 30]);
        assert_eq!(outcome.first_removed, None);
    }

    #[test]
    fn panicking_predicate_keeps_unvisited() {
        let mut s = storage(&[1, 2, 3, 4, 5]);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            s.retain_mut(|v| {
                if *v == 4 {
                    panic!("predicate");
                }
                *v != 2
            });
        }));
        assert!(result.is_err());
        assert_eq!(s.as_slice(), &[1, 3, 4, 5]);
    }

    #[test]
    fn panicking_destructor_still_closes_gap() {
        struct Fragile {
            id: i32,
            log: Rc<RefCell<Vec<i32>>>,
        }
        impl Drop for Fragile {
            fn drop(&mut self) {
                self.log.borrow_mut().push(self.id);
                if self.id == 2 {
                    panic!("fragile");
                }
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut s: RawStorage<Fragile> = RawStorage::default();
        relocate(
            &mut s,
            &Relocation::with_hole(6, 0, 6),
            &mut Generate(|i: usize| Fragile {
                id: i as i32,
                log: Rc::clone(&log),
            }),
        )
        .unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| s.erase_range(1, 4)));
        assert!(result.is_err());
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        let ids: Vec<i32> = s.as_slice().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 4, 5]);
        log.borrow_mut().clear();
        s.truncate(0);
        assert_eq!(*log.borrow(), vec![0, 4, 5]);
    }
}
