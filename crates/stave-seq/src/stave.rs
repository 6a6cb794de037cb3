//! The [`Stave`] container: construction, inspection, and trait impls.
//!
//! Mutation algorithms live in sibling modules (`hole`, `erase`,
//! `resize`, `cursor`); each adds an `impl` block to [`Stave`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Bound, Deref, DerefMut, RangeBounds};

use stave_core::{CloneFill, CloneSlice, Drain, Epoch, SlotSource, StaveConfig, StaveError, StaveId};
use stave_raw::{relocate, Global, IntoSlots, RawStorage, Relocation, SlotAllocator};
use tracing::warn;

use crate::epoch::EpochLog;
use crate::metrics::StaveMetrics;

// ── Stave ───────────────────────────────────────────────────────

/// A growable, contiguous sequence with allocator-parameterised storage.
///
/// Every mutating operation either completes or leaves length, capacity,
/// and contents exactly as they were, and reports why through
/// [`StaveError`]. This holds for source failures returned as `Err` and
/// for panics unwinding out of a source or a `Clone` impl.
///
/// Elements are reached through the slice view (`Deref<Target = [T]>`)
/// or through [`Cursor`](stave_core::Cursor)s, which detect relocation
/// and shifting instead of dangling.
pub struct Stave<T, A: SlotAllocator = Global> {
    pub(crate) storage: RawStorage<T, A>,
    pub(crate) config: StaveConfig,
    pub(crate) epochs: EpochLog,
    pub(crate) metrics: StaveMetrics,
    pub(crate) id: StaveId,
}

impl<T> Stave<T, Global> {
    /// An empty container on the process allocator. Allocates nothing.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// An empty container with room for at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, StaveError> {
        Self::with_capacity_in(capacity, Global)
    }

    /// A container holding a copy of `values`.
    pub fn from_slice(values: &[T]) -> Result<Self, StaveError>
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global)
    }
}

impl<T, A: SlotAllocator> Stave<T, A> {
    /// An empty container on `alloc` with the default configuration.
    pub fn new_in(alloc: A) -> Self {
        let config = StaveConfig::default();
        Self {
            storage: RawStorage::new_in(alloc),
            epochs: EpochLog::new(config.cursor_history),
            config,
            metrics: StaveMetrics::default(),
            id: StaveId::next(),
        }
    }

    /// An empty container on `alloc` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`StaveError::InvalidConfig`] if `config` fails validation.
    pub fn with_config_in(config: StaveConfig, alloc: A) -> Result<Self, StaveError> {
        config.validate()?;
        Ok(Self {
            storage: RawStorage::new_in(alloc),
            epochs: EpochLog::new(config.cursor_history),
            config,
            metrics: StaveMetrics::default(),
            id: StaveId::next(),
        })
    }

    /// An empty container with exactly `capacity` slots allocated.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, StaveError> {
        let mut stave = Self::new_in(alloc);
        stave.reserve_exact(capacity)?;
        Ok(stave)
    }

    /// A container of `count` clones of `value`, allocated exactly.
    pub fn from_elem_in(count: usize, value: &T, alloc: A) -> Result<Self, StaveError>
    where
        T: Clone,
    {
        let mut stave = Self::new_in(alloc);
        if count > 0 {
            stave.relocate_with(Relocation::with_hole(count, 0, count), &mut CloneFill(value))?;
        }
        Ok(stave)
    }

    /// A container holding a copy of `values`, allocated exactly.
    pub fn from_slice_in(values: &[T], alloc: A) -> Result<Self, StaveError>
    where
        T: Clone,
    {
        let mut stave = Self::new_in(alloc);
        let n = values.len();
        if n > 0 {
            stave.relocate_with(Relocation::with_hole(n, 0, n), &mut CloneSlice(values))?;
        }
        Ok(stave)
    }

    /// A container holding every item of `iter`, in order.
    pub fn try_from_iter_in<I>(iter: I, alloc: A) -> Result<Self, StaveError>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let mut stave = Self::new_in(alloc);
        stave.reserve(iter.size_hint().0)?;
        for value in iter {
            stave.push(value)?;
        }
        Ok(stave)
    }

    /// A deep copy with the same configuration and a clone of the
    /// allocator.
    pub fn try_clone(&self) -> Result<Self, StaveError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::with_config_in(self.config.clone(), self.storage.allocator().clone())?;
        let n = self.len();
        if n > 0 {
            copy.relocate_with(Relocation::with_hole(n, 0, n), &mut CloneSlice(self.as_slice()))?;
        }
        Ok(copy)
    }

    // ── Inspection ──────────────────────────────────────────────

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Allocated slots not holding an element.
    pub fn slack(&self) -> usize {
        self.storage.slack()
    }

    /// Largest element count the allocator supports.
    pub fn max_len(&self) -> usize {
        self.storage.max_count()
    }

    /// The allocator capability.
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }

    /// The configuration this container was built with.
    pub fn config(&self) -> &StaveConfig {
        &self.config
    }

    /// Cumulative operation counters.
    pub fn metrics(&self) -> &StaveMetrics {
        &self.metrics
    }

    /// This container's identity, carried by every cursor it mints.
    pub fn id(&self) -> StaveId {
        self.id
    }

    /// The current mutation epoch.
    pub fn epoch(&self) -> Epoch {
        self.epochs.current()
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Address of the first slot. Dangling while nothing is allocated.
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    // ── Whole-container operations ──────────────────────────────

    /// Replace the contents with a copy of `values`.
    ///
    /// The copies are made and any needed capacity is secured before the
    /// old contents are destroyed, so a failure leaves the container
    /// unchanged.
    pub fn assign_from_slice(&mut self, values: &[T]) -> Result<(), StaveError>
    where
        T: Clone,
    {
        let staged = values.to_vec();
        let n = staged.len();
        if n > self.capacity() {
            self.reserve_exact(n - self.len())?;
        }
        self.storage.clear();
        self.invalidate(0);
        self.storage.fill_gap(0, n, &mut Drain(staged.into_iter()))
    }

    /// Exchange contents with `other`. Configurations stay put; cursors of
    /// both containers are invalidated.
    pub fn swap_with(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.storage, &mut other.storage);
        self.invalidate(0);
        other.invalidate(0);
    }

    // ── Internal plumbing ───────────────────────────────────────

    /// Relocate under `plan`, updating counters and cursor epochs.
    pub(crate) fn relocate_with<S: SlotSource<T> + ?Sized>(
        &mut self,
        plan: Relocation,
        source: &mut S,
    ) -> Result<(), StaveError> {
        match relocate(&mut self.storage, &plan, source) {
            Ok(report) => {
                self.metrics.reallocations += 1;
                self.metrics.relocated_elements += report.moved as u64;
                self.invalidate(0);
                Ok(())
            }
            Err(err) => {
                if matches!(err, StaveError::ConstructionFailed { .. }) {
                    self.metrics.rollbacks += 1;
                }
                Err(err)
            }
        }
    }

    /// Capacity the growth policy picks for holding `required` elements.
    pub(crate) fn grown_capacity(&self, required: usize) -> Result<usize, StaveError> {
        self.config
            .growth
            .next_capacity(self.capacity(), required, self.max_len())
    }

    /// Advance the epoch after slots at or above `floor` moved or died.
    pub(crate) fn invalidate(&mut self, floor: usize) {
        self.epochs.record(floor);
        self.metrics.invalidations += 1;
    }

    /// Account for an in-place operation that failed and was undone.
    pub(crate) fn note_rollback(&mut self, err: &StaveError, position: usize, count: usize) {
        if matches!(err, StaveError::ConstructionFailed { .. }) {
            self.metrics.rollbacks += 1;
            warn!(container = %self.id, position, count, %err, "operation rolled back");
        }
    }

    /// Resolve `range` against the live length.
    pub(crate) fn bounds<R: RangeBounds<usize>>(&self, range: R) -> Result<(usize, usize), StaveError> {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.checked_add(1).ok_or(StaveError::InvalidRange {
                start: s,
                end: s,
                len,
            })?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.checked_add(1).ok_or(StaveError::InvalidRange {
                start,
                end: e,
                len,
            })?,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if start > end || end > len {
            return Err(StaveError::InvalidRange { start, end, len });
        }
        Ok((start, end))
    }
}

// ── Trait impls ─────────────────────────────────────────────────

impl<T> Default for Stave<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: SlotAllocator> Deref for Stave<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator> DerefMut for Stave<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: SlotAllocator> AsRef<[T]> for Stave<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: fmt::Debug, A: SlotAllocator> fmt::Debug for Stave<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, U, A, B> PartialEq<Stave<U, B>> for Stave<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator,
    B: SlotAllocator,
{
    fn eq(&self, other: &Stave<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A: SlotAllocator> PartialEq<[U]> for Stave<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: SlotAllocator, const N: usize> PartialEq<[U; N]> for Stave<T, A> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: SlotAllocator> Eq for Stave<T, A> {}

impl<T: Hash, A: SlotAllocator> Hash for Stave<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: SlotAllocator> IntoIterator for Stave<T, A> {
    type Item = T;
    type IntoIter = IntoSlots<T, A>;

    fn into_iter(self) -> IntoSlots<T, A> {
        self.storage.into_slots()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a Stave<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: SlotAllocator> IntoIterator for &'a mut Stave<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}
