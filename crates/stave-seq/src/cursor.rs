//! Minting, checking, and resolving cursors.
//!
//! A cursor is checked on every use: it must be bound, belong to this
//! container, have survived every relocation and shift since it was
//! minted, and still lie within the live range. Failures are ordinary
//! [`StaveError`]s, never dangling access.

use stave_core::{Cursor, CursorState, StaveError};
use stave_raw::SlotAllocator;

use crate::stave::Stave;

impl<T, A: SlotAllocator> Stave<T, A> {
    /// A cursor at the first slot.
    pub fn begin(&self) -> Cursor {
        Cursor::bound(self.id, self.epoch(), 0)
    }

    /// A cursor one past the last element.
    pub fn end(&self) -> Cursor {
        Cursor::bound(self.id, self.epoch(), self.len())
    }

    /// A cursor at `offset`. `offset == len` gives the end cursor.
    pub fn cursor(&self, offset: usize) -> Result<Cursor, StaveError> {
        if offset > self.len() {
            return Err(StaveError::OutOfBounds {
                index: offset,
                len: self.len(),
            });
        }
        Ok(Cursor::bound(self.id, self.epoch(), offset))
    }

    /// Classify `cursor` against this container.
    pub fn cursor_state(&self, cursor: &Cursor) -> CursorState {
        match self.check(cursor) {
            Ok(_) => CursorState::Valid,
            Err(StaveError::UnboundCursor) => CursorState::Unbound,
            Err(_) => CursorState::Invalidated,
        }
    }

    /// Validate `cursor`, returning its offset.
    ///
    /// # Errors
    ///
    /// - [`StaveError::UnboundCursor`] for a default cursor.
    /// - [`StaveError::ForeignCursor`] if another container minted it.
    /// - [`StaveError::StaleCursor`] if a relocation or a shift at or
    ///   below its offset happened since it was minted.
    /// - [`StaveError::OutOfBounds`] if it was moved past the end.
    pub fn check(&self, cursor: &Cursor) -> Result<usize, StaveError> {
        let (Some(owner), Some(minted)) = (cursor.owner(), cursor.minted()) else {
            return Err(StaveError::UnboundCursor);
        };
        if owner != self.id {
            return Err(StaveError::ForeignCursor {
                cursor_owner: owner,
                container: self.id,
            });
        }
        let offset = cursor.offset();
        if !self.epochs.is_live(minted, offset) {
            return Err(StaveError::StaleCursor {
                offset,
                minted,
                current: self.epoch(),
            });
        }
        if offset > self.len() {
            return Err(StaveError::OutOfBounds {
                index: offset,
                len: self.len(),
            });
        }
        Ok(offset)
    }

    /// The element `cursor` refers to.
    pub fn resolve(&self, cursor: &Cursor) -> Result<&T, StaveError> {
        let offset = self.check(cursor)?;
        self.at(offset)
    }

    /// The element `cursor` refers to, mutably.
    pub fn resolve_mut(&mut self, cursor: &Cursor) -> Result<&mut T, StaveError> {
        let offset = self.check(cursor)?;
        self.at_mut(offset)
    }

    /// Insert `value` before `cursor`, returning a fresh cursor to it.
    pub fn insert_at_cursor(&mut self, cursor: &Cursor, value: T) -> Result<Cursor, StaveError> {
        let offset = self.check(cursor)?;
        self.insert(offset, value)?;
        self.cursor(offset)
    }

    /// Remove the element at `cursor`, returning it and a fresh cursor to
    /// the element that followed it.
    pub fn erase_at_cursor(&mut self, cursor: &Cursor) -> Result<(T, Cursor), StaveError> {
        let offset = self.check(cursor)?;
        let value = self.erase(offset)?;
        Ok((value, self.cursor(offset)?))
    }

    /// Destroy the elements in `[first, last)`, returning a fresh cursor
    /// to the element that followed them.
    pub fn erase_between(&mut self, first: &Cursor, last: &Cursor) -> Result<Cursor, StaveError> {
        let start = self.check(first)?;
        let end = self.check(last)?;
        self.erase_range(start..end)?;
        self.cursor(start)
    }
}
