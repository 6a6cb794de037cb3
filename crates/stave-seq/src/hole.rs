//! Positional insertion.
//!
//! Bulk and constructed inserts funnel into [`Stave::insert_hole`], which
//! opens `count` slots at a position and fills them from a
//! [`SlotSource`]. With spare capacity the tail is shifted in place;
//! otherwise the storage is relocated into a block sized by the growth
//! policy. Either way a failing source leaves the container untouched.
//!
//! Single pre-built values (`push`, `insert`) reserve first and only then
//! move the value in, so a refused allocation can hand it back.

use std::convert::Infallible;
use std::fmt;
use std::ops::RangeBounds;

use stave_core::{
    CloneFill, CloneSlice, ConstructError, DefaultFill, Drain, SlotSource, StaveError,
};
use stave_raw::{Relocation, SlotAllocator};

use crate::stave::Stave;

/// Produces one value by running a closure once the slot is open.
struct Lazy<F>(Option<F>);

impl<T, E, F> SlotSource<T> for Lazy<F>
where
    E: fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        let f = self.0.take().ok_or_else(|| {
            ConstructError::new(format!("value already produced at offset {offset}"))
        })?;
        f().map_err(|e| ConstructError::new(e.to_string()))
    }
}

/// Drains an iterator that must yield exactly `count` items.
///
/// The last slot checks the iterator is spent, so an over-long iterator
/// fails while the hole can still be rolled back.
struct Exact<I> {
    iter: I,
    count: usize,
}

impl<T, I: Iterator<Item = T>> SlotSource<T> for Exact<I> {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        let value = Drain(&mut self.iter).produce(offset)?;
        if offset + 1 == self.count && self.iter.next().is_some() {
            return Err(overlong(self.count));
        }
        Ok(value)
    }
}

fn overlong(count: usize) -> ConstructError {
    ConstructError::new(format!("iterator yielded more than its reported {count} items"))
}

impl<T, A: SlotAllocator> Stave<T, A> {
    /// Open `count` slots at `position` and fill them from `source`.
    ///
    /// This is the primitive behind every insert, append, and grow-resize.
    ///
    /// # Errors
    ///
    /// - [`StaveError::OutOfBounds`] if `position > len`.
    /// - [`StaveError::CapacityOverflow`] if `len + count` exceeds the
    ///   allocator maximum.
    /// - [`StaveError::AllocationFailed`] if a new block is refused.
    /// - [`StaveError::ConstructionFailed`] if `source` fails.
    pub fn insert_hole<S: SlotSource<T> + ?Sized>(
        &mut self,
        position: usize,
        count: usize,
        source: &mut S,
    ) -> Result<(), StaveError> {
        let len = self.len();
        if position > len {
            return Err(StaveError::OutOfBounds {
                index: position,
                len,
            });
        }
        if count == 0 {
            return Ok(());
        }
        let required = len.checked_add(count).ok_or(StaveError::CapacityOverflow {
            requested: usize::MAX,
            max: self.max_len(),
        })?;

        if required > self.capacity() {
            let capacity = self.grown_capacity(required)?;
            return self.relocate_with(Relocation::with_hole(capacity, position, count), source);
        }

        if let Err(err) = self.storage.fill_gap(position, count, source) {
            self.note_rollback(&err, position, count);
            return Err(err);
        }
        let tail = len - position;
        if tail > 0 {
            self.metrics.shifted_elements += tail as u64;
            self.invalidate(position);
        }
        Ok(())
    }

    /// Append `value`, returning its index.
    ///
    /// On error `value` is dropped; use [`try_push`](Self::try_push) to
    /// get it back.
    pub fn push(&mut self, value: T) -> Result<usize, StaveError> {
        self.try_push(value).map_err(|(_, err)| err)
    }

    /// Append `value`, returning its index, or hand `value` back with the
    /// reason it could not be stored.
    pub fn try_push(&mut self, value: T) -> Result<usize, (T, StaveError)> {
        let index = self.len();
        self.try_insert(index, value).map(|()| index)
    }

    /// Insert `value` at `index`, shifting later elements up.
    ///
    /// On error `value` is dropped; use [`try_insert`](Self::try_insert)
    /// to get it back.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), StaveError> {
        self.try_insert(index, value).map_err(|(_, err)| err)
    }

    /// Insert `value` at `index`, or hand `value` back with the reason it
    /// could not be stored.
    ///
    /// Capacity is secured before `value` is moved, so a refused
    /// allocation returns it intact.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), (T, StaveError)> {
        let len = self.len();
        if index > len {
            return Err((value, StaveError::OutOfBounds { index, len }));
        }
        if self.slack() == 0 {
            if let Err(err) = self.reserve(1) {
                return Err((value, err));
            }
        }
        if let Err(value) = self.storage.insert_within_capacity(index, value) {
            let err = StaveError::CapacityOverflow {
                requested: len.saturating_add(1),
                max: self.max_len(),
            };
            return Err((value, err));
        }
        let tail = len - index;
        if tail > 0 {
            self.metrics.shifted_elements += tail as u64;
            self.invalidate(index);
        }
        Ok(())
    }

    /// Insert the value built by `f` at `index`.
    ///
    /// `f` runs after the slot is open; if it panics the container is
    /// restored.
    pub fn insert_with<F: FnOnce() -> T>(&mut self, index: usize, f: F) -> Result<(), StaveError> {
        self.try_insert_with(index, || Ok::<T, Infallible>(f()))
    }

    /// Insert the value built by a fallible `f` at `index`.
    ///
    /// An `Err` from `f` becomes [`StaveError::ConstructionFailed`] and the
    /// container is left unchanged.
    pub fn try_insert_with<E, F>(&mut self, index: usize, f: F) -> Result<(), StaveError>
    where
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        self.insert_hole(index, 1, &mut Lazy(Some(f)))
    }

    /// Insert `count` clones of `value` at `index`.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> Result<(), StaveError>
    where
        T: Clone,
    {
        self.insert_hole(index, count, &mut CloneFill(value))
    }

    /// Insert `count` default values at `index`.
    pub fn insert_default(&mut self, index: usize, count: usize) -> Result<(), StaveError>
    where
        T: Default,
    {
        self.insert_hole(index, count, &mut DefaultFill)
    }

    /// Insert clones of `values` at `index`, in order.
    ///
    /// `values` cannot alias this container; use
    /// [`insert_from_within`](Self::insert_from_within) to copy a run of
    /// this container's own elements.
    pub fn insert_slice(&mut self, index: usize, values: &[T]) -> Result<(), StaveError>
    where
        T: Clone,
    {
        self.insert_hole(index, values.len(), &mut CloneSlice(values))
    }

    /// Insert the items of `iter` at `index`, in order.
    ///
    /// The hole is sized from the iterator's reported length. An iterator
    /// that yields fewer or more items than it reported fails with
    /// [`StaveError::ConstructionFailed`] and the container is unchanged.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> Result<(), StaveError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut iter = iter.into_iter();
        let count = iter.len();
        if count == 0 {
            if index > self.len() {
                return Err(StaveError::OutOfBounds {
                    index,
                    len: self.len(),
                });
            }
            return match iter.next() {
                Some(_) => Err(overlong(0).at(0)),
                None => Ok(()),
            };
        }
        self.insert_hole(index, count, &mut Exact { iter, count })
    }

    /// Insert clones of this container's own `range` at `index`.
    ///
    /// The clones are staged in a temporary before anything moves, so the
    /// source run may overlap the insertion point.
    pub fn insert_from_within<R>(&mut self, index: usize, range: R) -> Result<(), StaveError>
    where
        T: Clone,
        R: RangeBounds<usize>,
    {
        let (start, end) = self.bounds(range)?;
        if index > self.len() {
            return Err(StaveError::OutOfBounds {
                index,
                len: self.len(),
            });
        }
        let staged = self.as_slice()[start..end].to_vec();
        self.insert_iter(index, staged)
    }

    /// Append clones of this container's own `range`.
    pub fn extend_from_within<R>(&mut self, range: R) -> Result<(), StaveError>
    where
        T: Clone,
        R: RangeBounds<usize>,
    {
        self.insert_from_within(self.len(), range)
    }

    /// Append clones of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), StaveError>
    where
        T: Clone,
    {
        self.insert_slice(self.len(), values)
    }

    /// Insert `value` at `index` unless an equal element is present.
    ///
    /// Returns whether the value was inserted. The index is validated
    /// either way.
    pub fn insert_unique(&mut self, index: usize, value: T) -> Result<bool, StaveError>
    where
        T: PartialEq,
    {
        if index > self.len() {
            return Err(StaveError::OutOfBounds {
                index,
                len: self.len(),
            });
        }
        if self.contains(&value) {
            return Ok(false);
        }
        self.insert(index, value)?;
        Ok(true)
    }

    /// Move every element of `other` onto the end of this container.
    ///
    /// `other` is left empty with its capacity intact. On error both
    /// containers are unchanged.
    pub fn append<B: SlotAllocator>(&mut self, other: &mut Stave<T, B>) -> Result<(), StaveError> {
        if other.is_empty() {
            return Ok(());
        }
        self.reserve(other.len())?;
        self.storage.absorb(&mut other.storage)?;
        other.invalidate(0);
        Ok(())
    }
}
