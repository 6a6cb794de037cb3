//! Raw storage: one allocated block, its live length, and its capacity.
//!
//! [`RawStorage`] owns its block and every live element in it. Slots
//! `[0, len)` hold live values; slots `[len, capacity)` are allocated but
//! uninitialised. An empty storage holds no block (`capacity == 0`) and
//! allocates nothing until the first capacity-demanding mutation.
//!
//! This module supplies the primitives that need no staging: construction
//! at the end, destruction of a trailing run, and release. Positional
//! mutation lives in [`gap`](crate::gap) and [`erase`](crate::erase);
//! reallocation lives in [`relocate`](crate::relocate).

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use crate::alloc::{Global, SlotAllocator};
use crate::guard::destroy_slots;

/// Owning handle to a contiguous block of `T` slots.
pub struct RawStorage<T, A: SlotAllocator = Global> {
    /// Start of the block; dangling while `capacity == 0`.
    pub(crate) base: NonNull<T>,
    /// Number of live, fully constructed elements.
    pub(crate) len: usize,
    /// Number of allocated slots.
    pub(crate) capacity: usize,
    pub(crate) alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: RawStorage owns its elements exclusively, like `Vec<T>`.
unsafe impl<T: Send, A: SlotAllocator + Send> Send for RawStorage<T, A> {}
// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: SlotAllocator + Sync> Sync for RawStorage<T, A> {}

impl<T, A: SlotAllocator> RawStorage<T, A> {
    /// An empty storage that will allocate from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            base: NonNull::dangling(),
            len: 0,
            capacity: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocated slots not holding a live element.
    pub fn slack(&self) -> usize {
        self.capacity - self.len
    }

    /// Whether a block is currently held.
    pub fn is_allocated(&self) -> bool {
        self.capacity > 0
    }

    /// The allocator capability.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Largest slot count the allocator supports for `T`.
    pub fn max_count(&self) -> usize {
        self.alloc.max_count::<T>()
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: base is aligned and non-null (dangling when empty, where
        // len == 0), and [0, len) holds live values.
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.len) }
    }

    /// Address of the first slot. Dangling while unallocated.
    pub fn as_ptr(&self) -> *const T {
        self.base.as_ptr()
    }

    /// Construct `value` at `len` if spare capacity exists.
    ///
    /// This is the zero-shift append fast path. Hands the value back when
    /// the storage is full so the caller can take the relocation path.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity {
            return Err(value);
        }
        // SAFETY: len < capacity, so the slot is allocated and uninitialised.
        unsafe {
            let slot = self.base.add(self.len);
            self.alloc.construct(slot, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Move the last element out, if any.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live; lowering len first
        // makes it unreachable, so it is read exactly once.
        Some(unsafe { self.base.add(self.len).as_ptr().read() })
    }

    /// Destroy the elements at `[new_len, len)`. Capacity is retained.
    ///
    /// No-op when `new_len >= len`. If a destructor panics the remaining
    /// elements are still destroyed and `len` is already `new_len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let count = self.len - new_len;
        self.len = new_len;
        // SAFETY: [new_len, new_len + count) held live values that are now
        // outside the live range.
        unsafe { destroy_slots(&self.alloc, self.base.add(new_len), count) }
    }

    /// Destroy every element. Capacity is retained.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroy every element and free the block, returning to empty.
    pub fn release(&mut self) {
        self.clear();
        if self.capacity > 0 {
            let (block, capacity) = (self.base, self.capacity);
            self.base = NonNull::dangling();
            self.capacity = 0;
            // SAFETY: block was allocated with this capacity and holds no
            // live values after `clear`.
            unsafe { self.alloc.deallocate(block, capacity) }
        }
    }

    /// Install a fully built block, freeing the previous one.
    ///
    /// The previous block's elements are not destroyed: they must already
    /// have been moved into `block`.
    ///
    /// # Safety
    ///
    /// `block` must come from `self.alloc.allocate::<T>(capacity)`, hold
    /// `len <= capacity` live values at `[0, len)`, and the current block's
    /// live values must have been bitwise moved out.
    pub(crate) unsafe fn commit_block(&mut self, block: NonNull<T>, len: usize, capacity: usize) {
        let (old, old_capacity) = (self.base, self.capacity);
        self.base = block;
        self.len = len;
        self.capacity = capacity;
        if old_capacity > 0 {
            // SAFETY: old was allocated with old_capacity; its values were
            // moved out per the caller's contract.
            unsafe { self.alloc.deallocate(old, old_capacity) }
        }
    }
}

impl<T, A: SlotAllocator + Default> Default for RawStorage<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: SlotAllocator> Drop for RawStorage<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for RawStorage<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("elements", &self.as_slice())
            .finish()
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

    struct DropCount(Rc<Cell<usize>>);

    impl Drop for DropCount {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn counted(n: usize, drops: &Rc<Cell<usize>>, meter: &Metered) -> RawStorage<DropCount, Metered> {
        let mut s = RawStorage::new_in(meter.clone());
        relocate(
            &mut s,
            &Relocation::with_hole(n * 2, 0, n),
            &mut Generate(|_: usize| DropCount(Rc::clone(drops))),
        )
        .unwrap();
        s
    }

    #[test]
    fn empty_storage_holds_no_block() {
        let meter = Metered::new();
        let s: RawStorage<u32, _> = RawStorage::new_in(meter.clone());
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), 0);
        assert!(!s.is_allocated());
        assert!(s.as_slice().is_empty());
        drop(s);
        assert_eq!(meter.report().allocations, 0);
    }

    #[test]
    fn push_within_capacity_refuses_when_full() {
        let mut s: RawStorage<u32> = RawStorage::default();
        assert_eq!(s.push_within_capacity(7), Err(7));
        relocate(&mut s, &Relocation::to_capacity(2), &mut stave_core::EmptySource).unwrap();
        assert_eq!(s.push_within_capacity(1), Ok(()));
        assert_eq!(s.push_within_capacity(2), Ok(()));
        assert_eq!(s.push_within_capacity(3), Err(3));
        assert_eq!(s.as_slice(), &[1, 2]);
        assert_eq!(s.slack(), 0);
    }

    #[test]
    fn pop_moves_out_last() {
        let mut s: RawStorage<u32> = RawStorage::default();
        assert_eq!(s.pop(), None);
        relocate(&mut s, &Relocation::with_hole(4, 0, 3), &mut Generate(|i: usize| i as u32)).unwrap();
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.as_slice(), &[0, 1]);
    }

    #[test]
    fn truncate_destroys_tail_and_keeps_capacity() {
        let drops = Rc::new(Cell::new(0));
        let meter = Metered::new();
        let mut s = counted(5, &drops, &meter);
        s.truncate(7);
        assert_eq!(drops.get(), 0);
        s.truncate(2);
        assert_eq!(drops.get(), 3);
        assert_eq!(s.len(), 2);
        assert_eq!(s.capacity(), 10);
    }

    #[test]
    fn release_and_drop_free_everything() {
        let drops = Rc::new(Cell::new(0));
        let meter = Metered::new();
        let mut s = counted(3, &drops, &meter);
        s.release();
        assert_eq!(drops.get(), 3);
        assert!(!s.is_allocated());
        assert_eq!(meter.report().live_blocks(), 0);

        let s = counted(4, &drops, &meter);
        drop(s);
        assert_eq!(drops.get(), 7);
        assert_eq!(meter.report().live_bytes, 0);
    }
}
