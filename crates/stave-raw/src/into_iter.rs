//! Owning iteration over a storage's elements.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::slice;

use crate::alloc::{Global, SlotAllocator};
use crate::guard::{destroy_slots, BlockGuard};
use crate::storage::RawStorage;

/// Iterator that moves elements out of a [`RawStorage`].
///
/// Dropping it destroys the elements not yet yielded and frees the block.
pub struct IntoSlots<T, A: SlotAllocator = Global> {
    block: NonNull<T>,
    capacity: usize,
    front: usize,
    back: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: the iterator owns its remaining elements, like `vec::IntoIter`.
unsafe impl<T: Send, A: SlotAllocator + Send> Send for IntoSlots<T, A> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, A: SlotAllocator + Sync> Sync for IntoSlots<T, A> {}

impl<T, A: SlotAllocator> IntoSlots<T, A> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [front, back) is live and owned by the iterator.
        unsafe { slice::from_raw_parts(self.block.add(self.front).as_ptr(), self.back - self.front) }
    }
}

impl<T, A: SlotAllocator> RawStorage<T, A> {
    /// Turn the storage into an iterator over its elements.
    pub fn into_slots(self) -> IntoSlots<T, A> {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never dropped, so the allocator is read out exactly
        // once and ownership of block and elements passes to the iterator.
        let alloc = unsafe { ptr::read(&me.alloc) };
        IntoSlots {
            block: me.base,
            capacity: me.capacity,
            front: 0,
            back: me.len,
            alloc,
            _owns: PhantomData,
        }
    }
}

impl<T, A: SlotAllocator> Iterator for IntoSlots<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let slot = self.front;
        self.front += 1;
        // SAFETY: slot was in [front, back), so it is live and now
        // unreachable through the iterator.
        Some(unsafe { self.block.add(slot).as_ptr().read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T, A: SlotAllocator> DoubleEndedIterator for IntoSlots<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as in `next`, for the last live slot.
        Some(unsafe { self.block.add(self.back).as_ptr().read() })
    }
}

impl<T, A: SlotAllocator> ExactSizeIterator for IntoSlots<T, A> {}

impl<T, A: SlotAllocator> FusedIterator for IntoSlots<T, A> {}

impl<T, A: SlotAllocator> Drop for IntoSlots<T, A> {
    fn drop(&mut self) {
        let alloc = &self.alloc;
        let _free = if self.capacity > 0 {
            // SAFETY: the block came from this allocator with this capacity
            // and is emptied by `destroy_slots` below before the guard drops.
            Some(unsafe { BlockGuard::new(alloc, self.block, self.capacity) })
        } else {
            None
        };
        let (start, remaining) = (self.front, self.back - self.front);
        self.front = self.back;
        // SAFETY: the unyielded run is live and is destroyed exactly once.
        unsafe { destroy_slots(alloc, self.block.add(start), remaining) }
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for IntoSlots<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoSlots").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Metered;
    use crate::relocate::{relocate, Relocation};
    use stave_core::Generate;
    use std::cell::Cell;
    use std::rc::Rc;

    fn strings(n: usize, meter: &Metered) -> RawStorage<String, Metered> {
        let mut s = RawStorage::new_in(meter.clone());
        relocate(
            &mut s,
            &Relocation::with_hole(n + 1, 0, n),
            &mut Generate(|i: usize| format!("s{i}")),
        )
        .unwrap();
        s
    }

    #[test]
    fn yields_in_order_from_both_ends() {
        let meter = Metered::new();
        let mut it = strings(4, &meter).into_slots();
        assert_eq!(it.len(), 4);
        assert_eq!(it.next().as_deref(), Some("s0"));
        assert_eq!(it.next_back().as_deref(), Some("s3"));
        assert_eq!(it.as_slice(), &["s1".to_string(), "s2".to_string()]);
        let rest: Vec<String> = it.collect();
        assert_eq!(rest, vec!["s1", "s2"]);
        assert_eq!(meter.report().live_blocks(), 0);
    }

    #[test]
    fn partial_iteration_destroys_remainder() {
        struct Counted(Rc<Cell<usize>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let meter = Metered::new();
        let mut s = RawStorage::new_in(meter.clone());
        relocate(
            &mut s,
            &Relocation::with_hole(5, 0, 5),
            &mut Generate(|_: usize| Counted(Rc::clone(&drops))),
        )
        .unwrap();
        let mut it = s.into_slots();
        drop(it.next());
        assert_eq!(drops.get(), 1);
        drop(it);
        assert_eq!(drops.get(), 5);
        assert_eq!(meter.report().live_blocks(), 0);
    }

    #[test]
    fn empty_storage_iterates_nothing() {
        let s: RawStorage<u8> = RawStorage::default();
        assert_eq!(s.into_slots().count(), 0);
    }
}
