//! The allocator capability and its two implementations.
//!
//! [`SlotAllocator`] is the only interface the container uses to obtain
//! and release memory and to construct and destroy elements. [`Global`]
//! forwards to the process allocator; [`Metered`] wraps another allocator
//! and records every request, optionally refusing requests that would
//! exceed a byte budget.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use stave_core::StaveError;

/// Largest number of `T` slots a single block may hold.
///
/// Zero-sized types have no limit; otherwise the block size in bytes must
/// fit in `isize`.
pub fn max_slots<T>() -> usize {
    match std::mem::size_of::<T>() {
        0 => usize::MAX,
        size => isize::MAX as usize / size,
    }
}

/// Layout of a block of `count` slots of `T`.
pub fn slot_layout<T>(count: usize) -> Result<Layout, StaveError> {
    Layout::array::<T>(count).map_err(|_| StaveError::CapacityOverflow {
        requested: count,
        max: max_slots::<T>(),
    })
}

/// Allocation, deallocation, construction, and destruction of slots.
///
/// # Safety
///
/// `allocate::<T>(n)` must return a pointer aligned for `T` and valid for
/// reads and writes of `n` consecutive `T` values until it is passed to
/// `deallocate::<T>` with the same `n`. Requests of zero bytes may return
/// a dangling pointer, which `deallocate` must then accept and ignore.
pub unsafe trait SlotAllocator {
    /// Allocate an uninitialised block of `count` slots.
    fn allocate<T>(&self, count: usize) -> Result<NonNull<T>, StaveError>;

    /// Release a block obtained from `allocate`.
    ///
    /// # Safety
    ///
    /// `block` must come from `self.allocate::<T>(count)` and must not be
    /// used afterwards. No live values may remain in it.
    unsafe fn deallocate<T>(&self, block: NonNull<T>, count: usize);

    /// Move `value` into an uninitialised slot.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: caller guarantees slot is writable and uninitialised.
        unsafe { slot.as_ptr().write(value) }
    }

    /// Run the destructor of the value in `slot`, leaving it uninitialised.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used afterwards.
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: caller guarantees slot holds a live, unaliased value.
        unsafe { ptr::drop_in_place(slot.as_ptr()) }
    }

    /// Largest number of `T` slots this allocator will hand out at once.
    fn max_count<T>(&self) -> usize {
        max_slots::<T>()
    }
}

/// The process-wide allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: blocks come from `std::alloc::alloc` with `Layout::array::<T>`,
// which guarantees alignment and size; zero-size requests return a
// dangling pointer that `deallocate` ignores.
unsafe impl SlotAllocator for Global {
    fn allocate<T>(&self, count: usize) -> Result<NonNull<T>, StaveError> {
        let layout = slot_layout::<T>(count)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(StaveError::AllocationFailed {
            slots: count,
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate<T>(&self, block: NonNull<T>, count: usize) {
        let Ok(layout) = slot_layout::<T>(count) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: caller guarantees block came from `allocate` with this
        // count, so it was allocated with exactly this layout.
        unsafe { std::alloc::dealloc(block.as_ptr().cast::<u8>(), layout) }
    }
}

/// Point-in-time counters of a [`Metered`] allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeterReport {
    /// Successful non-empty allocations.
    pub allocations: u64,
    /// Non-empty deallocations.
    pub deallocations: u64,
    /// Requests refused by the byte budget or by the inner allocator.
    pub failures: u64,
    /// Bytes currently allocated.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
}

impl MeterReport {
    /// Blocks allocated and not yet released.
    pub fn live_blocks(&self) -> u64 {
        self.allocations - self.deallocations
    }
}

#[derive(Debug, Default)]
struct Meter {
    allocations: Cell<u64>,
    deallocations: Cell<u64>,
    failures: Cell<u64>,
    live_bytes: Cell<usize>,
    peak_bytes: Cell<usize>,
    byte_limit: Cell<Option<usize>>,
}

/// An allocator wrapper that counts requests and enforces a byte budget.
///
/// Clones share one meter, so a test can keep a clone, hand the other to
/// a container, and inspect the counters after the container is gone.
/// The meter uses `Cell`s and is therefore neither `Send` nor `Sync`.
#[derive(Clone, Debug, Default)]
pub struct Metered<A: SlotAllocator = Global> {
    inner: A,
    meter: Rc<Meter>,
}

impl Metered<Global> {
    /// Meter the process allocator.
    pub fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A: SlotAllocator> Metered<A> {
    /// Meter an arbitrary allocator.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            meter: Rc::new(Meter::default()),
        }
    }

    /// Refuse any allocation that would push live bytes above `limit`.
    pub fn with_byte_limit(self, limit: usize) -> Self {
        self.set_byte_limit(Some(limit));
        self
    }

    /// Replace the byte budget. `None` removes it.
    pub fn set_byte_limit(&self, limit: Option<usize>) {
        self.meter.byte_limit.set(limit);
    }

    /// Current counters.
    pub fn report(&self) -> MeterReport {
        let m = &self.meter;
        MeterReport {
            allocations: m.allocations.get(),
            deallocations: m.deallocations.get(),
            failures: m.failures.get(),
            live_bytes: m.live_bytes.get(),
            peak_bytes: m.peak_bytes.get(),
        }
    }

    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

// SAFETY: every block is obtained from and returned to `inner` unchanged;
// the wrapper only adds bookkeeping.
unsafe impl<A: SlotAllocator> SlotAllocator for Metered<A> {
    fn allocate<T>(&self, count: usize) -> Result<NonNull<T>, StaveError> {
        let layout = slot_layout::<T>(count)?;
        let bytes = layout.size();
        if bytes == 0 {
            return self.inner.allocate::<T>(count);
        }
        let m = &self.meter;
        let projected = m.live_bytes.get().saturating_add(bytes);
        if m.byte_limit.get().is_some_and(|limit| projected > limit) {
            m.failures.set(m.failures.get() + 1);
            return Err(StaveError::AllocationFailed {
                slots: count,
                bytes,
            });
        }
        match self.inner.allocate::<T>(count) {
            Ok(block) => {
                m.allocations.set(m.allocations.get() + 1);
                m.live_bytes.set(projected);
                m.peak_bytes.set(m.peak_bytes.get().max(projected));
                Ok(block)
            }
            Err(err) => {
                m.failures.set(m.failures.get() + 1);
                Err(err)
            }
        }
    }

    unsafe fn deallocate<T>(&self, block: NonNull<T>, count: usize) {
        let bytes = slot_layout::<T>(count).map(|l| l.size()).unwrap_or(0);
        if bytes > 0 {
            let m = &self.meter;
            m.deallocations.set(m.deallocations.get() + 1);
            m.live_bytes.set(m.live_bytes.get().saturating_sub(bytes));
        }
        // SAFETY: forwarded unchanged from the caller's contract.
        unsafe { self.inner.deallocate(block, count) }
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: forwarded unchanged from the caller's contract.
        unsafe { self.inner.construct(slot, value) }
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: forwarded unchanged from the caller's contract.
        unsafe { self.inner.destroy(slot) }
    }

    fn max_count<T>(&self) -> usize {
        self.inner.max_count::<T>()
    }
}
