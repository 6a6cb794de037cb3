//! Resize, reserve, and shrink-to-fit.

use std::convert::Infallible;
use std::fmt;

use stave_core::{CloneFill, DefaultFill, EmptySource, SlotSource, StaveError, TryGenerate};
use stave_raw::{Relocation, SlotAllocator};

use crate::stave::Stave;

impl<T, A: SlotAllocator> Stave<T, A> {
    /// Grow or shrink to `new_len`, filling new slots from `source`.
    ///
    /// Shrinking destroys the tail and keeps capacity. Growing opens a hole
    /// at the end, relocating if capacity is short.
    pub fn resize_from<S: SlotSource<T> + ?Sized>(
        &mut self,
        new_len: usize,
        source: &mut S,
    ) -> Result<(), StaveError> {
        let len = self.len();
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }
        self.insert_hole(len, new_len - len, source)
    }

    /// Resize to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: &T) -> Result<(), StaveError>
    where
        T: Clone,
    {
        self.resize_from(new_len, &mut CloneFill(value))
    }

    /// Resize to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize) -> Result<(), StaveError>
    where
        T: Default,
    {
        self.resize_from(new_len, &mut DefaultFill)
    }

    /// Resize to `new_len`, filling new slots by calling `f`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) -> Result<(), StaveError> {
        self.resize_from(new_len, &mut TryGenerate(|_: usize| Ok::<T, Infallible>(f())))
    }

    /// Resize to `new_len`, filling new slots by calling a fallible `f`
    /// with each new slot's offset from the old end.
    ///
    /// If `f` fails the container is left unchanged.
    pub fn try_resize_with<E, F>(&mut self, new_len: usize, f: F) -> Result<(), StaveError>
    where
        E: fmt::Display,
        F: FnMut(usize) -> Result<T, E>,
    {
        self.resize_from(new_len, &mut TryGenerate(f))
    }

    /// Ensure room for at least `additional` more elements, growing by the
    /// configured policy.
    pub fn reserve(&mut self, additional: usize) -> Result<(), StaveError> {
        let required = self.required(additional)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let capacity = self.grown_capacity(required)?;
        self.relocate_with(Relocation::to_capacity(capacity), &mut EmptySource)
    }

    /// Ensure room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<(), StaveError> {
        let required = self.required(additional)?;
        if required <= self.capacity() {
            return Ok(());
        }
        if required > self.max_len() {
            return Err(StaveError::CapacityOverflow {
                requested: required,
                max: self.max_len(),
            });
        }
        self.relocate_with(Relocation::to_capacity(required), &mut EmptySource)
    }

    /// Drop unused capacity. An empty container frees its block.
    pub fn shrink_to_fit(&mut self) -> Result<(), StaveError> {
        let len = self.len();
        if len == self.capacity() {
            return Ok(());
        }
        if len == 0 {
            self.release();
            return Ok(());
        }
        self.relocate_with(Relocation::to_capacity(len), &mut EmptySource)
    }

    fn required(&self, additional: usize) -> Result<usize, StaveError> {
        self.len()
            .checked_add(additional)
            .ok_or(StaveError::CapacityOverflow {
                requested: usize::MAX,
                max: self.max_len(),
            })
    }
}
