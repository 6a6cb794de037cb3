//! Producers of values for newly opened slots.
//!
//! Every insertion, fill, and grow-resize opens a run of uninitialised
//! slots (a "hole") and asks a [`SlotSource`] for one value per slot, in
//! order. A source may fail; the storage layer then destroys the values it
//! already placed and leaves the container unchanged.

use std::fmt;

use crate::error::ConstructError;

/// Produces the values that fill a hole.
///
/// `produce` is called with offsets `0, 1, 2, ...` relative to the start
/// of the hole, at most once per offset, and never again after it
/// returns an error.
pub trait SlotSource<T> {
    /// Produce the value for slot `offset` of the hole.
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError>;
}

impl<T, S: SlotSource<T> + ?Sized> SlotSource<T> for &mut S {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        (**self).produce(offset)
    }
}

/// Fills slots with `T::default()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFill;

impl<T: Default> SlotSource<T> for DefaultFill {
    fn produce(&mut self, _offset: usize) -> Result<T, ConstructError> {
        Ok(T::default())
    }
}

/// Fills every slot with a clone of one value.
#[derive(Clone, Copy, Debug)]
pub struct CloneFill<'a, T>(pub &'a T);

impl<T: Clone> SlotSource<T> for CloneFill<'_, T> {
    fn produce(&mut self, _offset: usize) -> Result<T, ConstructError> {
        Ok(self.0.clone())
    }
}

/// Fills slot `i` with a clone of `slice[i]`.
#[derive(Clone, Copy, Debug)]
pub struct CloneSlice<'a, T>(pub &'a [T]);

impl<T: Clone> SlotSource<T> for CloneSlice<'_, T> {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        self.0
            .get(offset)
            .cloned()
            .ok_or_else(|| ConstructError::new(format!("slice source has no element {offset}")))
    }
}

/// Fills slots by calling an infallible generator with the slot offset.
pub struct Generate<F>(pub F);

impl<T, F: FnMut(usize) -> T> SlotSource<T> for Generate<F> {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        Ok((self.0)(offset))
    }
}

/// Fills slots by calling a fallible generator with the slot offset.
///
/// The generator's error is rendered with `Display` into the
/// [`ConstructError`] reason.
pub struct TryGenerate<F>(pub F);

impl<T, E, F> SlotSource<T> for TryGenerate<F>
where
    E: fmt::Display,
    F: FnMut(usize) -> Result<T, E>,
{
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        (self.0)(offset).map_err(|e| ConstructError::new(e.to_string()))
    }
}

/// Moves values out of an iterator, one per slot.
///
/// Fails if the iterator ends before the hole is full.
pub struct Drain<I>(pub I);

impl<T, I: Iterator<Item = T>> SlotSource<T> for Drain<I> {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        self.0
            .next()
            .ok_or_else(|| ConstructError::new(format!("iterator exhausted at offset {offset}")))
    }
}

/// Yields a single pre-built value.
#[derive(Debug)]
pub struct Once<T>(pub Option<T>);

impl<T> Once<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }
}

impl<T> SlotSource<T> for Once<T> {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        self.0
            .take()
            .ok_or_else(|| ConstructError::new(format!("single value already taken at offset {offset}")))
    }
}

/// A source with nothing to give. Used for relocations that open no hole.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptySource;

impl<T> SlotSource<T> for EmptySource {
    fn produce(&mut self, offset: usize) -> Result<T, ConstructError> {
        Err(ConstructError::new(format!(
            "empty source asked for offset {offset}"
        )))
    }
}
