//! Scoped cleanup for staged construction.
//!
//! - [`ConstructionGuard`] fills a run of uninitialised slots from a
//!   [`SlotSource`] and, if it is dropped before [`finish`](ConstructionGuard::finish),
//!   destroys exactly the prefix it built.
//! - [`BlockGuard`] frees a freshly allocated block unless disarmed.
//! - [`destroy_slots`] destroys a run of live slots and keeps going if a
//!   destructor panics.
//!
//! The guards run on both exit paths: an `Err` returned through `?` and a
//! panic unwinding out of a source or a destructor.

use std::mem;
use std::ptr::NonNull;

use stave_core::{SlotSource, StaveError};

use crate::alloc::SlotAllocator;

/// Destroy `count` live values starting at `start`.
///
/// If one destructor panics, the remaining values are still destroyed
/// while unwinding. A second panic aborts, as with slice drop glue.
///
/// # Safety
///
/// `[start, start + count)` must hold live values that are not used
/// afterwards.
pub unsafe fn destroy_slots<T, A: SlotAllocator>(alloc: &A, start: NonNull<T>, count: usize) {
    struct Rest<'a, T, A: SlotAllocator> {
        alloc: &'a A,
        next: NonNull<T>,
        remaining: usize,
    }

    impl<T, A: SlotAllocator> Rest<'_, T, A> {
        fn run(&mut self) {
            while self.remaining > 0 {
                let slot = self.next;
                self.remaining -= 1;
                // SAFETY: remaining counted the slot, so slot + 1 is at most
                // one past the run.
                self.next = unsafe { slot.add(1) };
                // SAFETY: slot is live per the caller's contract and is
                // visited exactly once.
                unsafe { self.alloc.destroy(slot) };
            }
        }
    }

    impl<T, A: SlotAllocator> Drop for Rest<'_, T, A> {
        fn drop(&mut self) {
            self.run();
        }
    }

    let mut rest = Rest {
        alloc,
        next: start,
        remaining: count,
    };
    rest.run();
}

/// Batch construction into uninitialised slots with prefix rollback.
///
/// Tracks how many of `target` slots have been constructed. Dropping the
/// guard without calling [`finish`](Self::finish) destroys exactly those
/// slots; the caller stays responsible for the memory.
#[must_use]
pub struct ConstructionGuard<'a, T, A: SlotAllocator> {
    alloc: &'a A,
    start: NonNull<T>,
    target: usize,
    built: usize,
}

impl<'a, T, A: SlotAllocator> ConstructionGuard<'a, T, A> {
    /// Guard `target` slots starting at `start`.
    ///
    /// # Safety
    ///
    /// `[start, start + target)` must be allocated, uninitialised, and not
    /// accessed by anyone else while the guard lives.
    pub unsafe fn new(alloc: &'a A, start: NonNull<T>, target: usize) -> Self {
        Self {
            alloc,
            start,
            target,
            built: 0,
        }
    }

    /// Slots constructed so far.
    pub fn built(&self) -> usize {
        self.built
    }

    /// Slots the guard was asked to fill.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Construct every remaining slot from `source`.
    ///
    /// On failure the error carries the offset of the failing slot and the
    /// guard still owns the slots built so far.
    pub fn fill<S: SlotSource<T> + ?Sized>(&mut self, source: &mut S) -> Result<(), StaveError> {
        while self.built < self.target {
            let value = source.produce(self.built).map_err(|e| e.at(self.built))?;
            // SAFETY: built < target, so the slot is inside the guarded run
            // and has not been constructed yet.
            unsafe {
                let slot = self.start.add(self.built);
                self.alloc.construct(slot, value);
            }
            self.built += 1;
        }
        Ok(())
    }

    /// Disarm the guard, handing ownership of the built slots to the caller.
    pub fn finish(self) -> usize {
        let built = self.built;
        mem::forget(self);
        built
    }
}

impl<T, A: SlotAllocator> Drop for ConstructionGuard<'_, T, A> {
    fn drop(&mut self) {
        if self.built > 0 {
            // SAFETY: exactly [start, start + built) were constructed by
            // this guard and never handed out.
            unsafe { destroy_slots(self.alloc, self.start, self.built) }
        }
    }
}

/// Frees a newly allocated block unless [`disarm`](Self::disarm)ed.
#[must_use]
pub struct BlockGuard<'a, T, A: SlotAllocator> {
    alloc: &'a A,
    block: NonNull<T>,
    capacity: usize,
}

impl<'a, T, A: SlotAllocator> BlockGuard<'a, T, A> {
    /// Take responsibility for freeing `block`.
    ///
    /// # Safety
    ///
    /// `block` must come from `alloc.allocate::<T>(capacity)` and hold no
    /// live values when the guard drops.
    pub unsafe fn new(alloc: &'a A, block: NonNull<T>, capacity: usize) -> Self {
        Self {
            alloc,
            block,
            capacity,
        }
    }

    /// The guarded block.
    pub fn block(&self) -> NonNull<T> {
        self.block
    }

    /// Keep the block.
    pub fn disarm(self) -> NonNull<T> {
        let block = self.block;
        mem::forget(self);
        block
    }
}

impl<T, A: SlotAllocator> Drop for BlockGuard<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: per `new`, the block is ours and empty.
        unsafe { self.alloc.deallocate(self.block, self.capacity) }
    }
}
