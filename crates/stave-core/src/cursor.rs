//! Position cursors over a container's live slots.
//!
//! A [`Cursor`] is a plain value: the ID of the container that minted it,
//! the epoch at mint time, and an offset. It never borrows or owns the
//! container. The container decides whether a cursor is still valid by
//! comparing the cursor's epoch against the mutations it has recorded
//! since; see [`CursorState`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::id::{Epoch, StaveId};

/// Validity of a cursor relative to a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Default-constructed; refers to no container.
    Unbound,
    /// Bound and still refers to the slot it was minted for.
    Valid,
    /// Bound, but the container relocated its storage or moved or
    /// destroyed elements at or before the cursor's offset since it was
    /// minted. Cursors presented to a container other than their owner
    /// also report this state.
    Invalidated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Binding {
    owner: StaveId,
    minted: Epoch,
}

/// A position within a container.
///
/// Cursors of the same container are ordered by offset. Cursors of
/// different containers, or unbound cursors mixed with bound ones, are
/// unordered. Equality ignores the mint epoch: two cursors at the same
/// offset of the same container are equal even if one of them is stale.
#[derive(Clone, Copy, Debug, Default)]
#[must_use]
pub struct Cursor {
    binding: Option<Binding>,
    offset: usize,
}

impl Cursor {
    /// A cursor bound to `owner` at `offset`, minted at `minted`.
    ///
    /// Containers call this; user code obtains cursors from the container.
    pub fn bound(owner: StaveId, minted: Epoch, offset: usize) -> Self {
        Self {
            binding: Some(Binding { owner, minted }),
            offset,
        }
    }

    /// An unbound cursor (same as `Cursor::default()`).
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Offset of the slot this cursor refers to.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Container that minted this cursor, if bound.
    pub fn owner(&self) -> Option<StaveId> {
        self.binding.map(|b| b.owner)
    }

    /// Epoch at which this cursor was minted, if bound.
    pub fn minted(&self) -> Option<Epoch> {
        self.binding.map(|b| b.minted)
    }

    /// Whether this cursor is bound to a container.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The cursor `n` slots further on, keeping owner and epoch.
    ///
    /// Returns `None` on offset overflow. Range checking against the
    /// container happens when the cursor is resolved.
    pub fn forward(self, n: usize) -> Option<Self> {
        let offset = self.offset.checked_add(n)?;
        Some(Self { offset, ..self })
    }

    /// The cursor `n` slots back, keeping owner and epoch.
    ///
    /// Returns `None` if that would move before offset 0.
    pub fn back(self, n: usize) -> Option<Self> {
        let offset = self.offset.checked_sub(n)?;
        Some(Self { offset, ..self })
    }

    /// Signed distance from `self` to `other`, if both belong to the same
    /// container.
    pub fn distance_to(&self, other: &Cursor) -> Option<isize> {
        if !self.same_owner(other) {
            return None;
        }
        let to = isize::try_from(other.offset).ok()?;
        let from = isize::try_from(self.offset).ok()?;
        to.checked_sub(from)
    }

    fn same_owner(&self, other: &Cursor) -> bool {
        match (self.binding, other.binding) {
            (Some(a), Some(b)) => a.owner == b.owner,
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.same_owner(other) && self.offset == other.offset
    }
}

impl Eq for Cursor {}

impl Hash for Cursor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner().hash(state);
        self.offset.hash(state);
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.same_owner(other) {
            return None;
        }
        Some(self.offset.cmp(&other.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cursor_is_unbound() {
        let c = Cursor::default();
        assert!(!c.is_bound());
        assert_eq!(c.owner(), None);
        assert_eq!(c.offset(), 0);
        assert_eq!(c, Cursor::unbound());
    }

    #[test]
    fn same_owner_cursors_order_by_offset() {
        let id = StaveId::next();
        let a = Cursor::bound(id, Epoch(0), 2);
        let b = Cursor::bound(id, Epoch(3), 5);
        assert!(a < b);
        assert_eq!(a.distance_to(&b), Some(3));
        assert_eq!(b.distance_to(&a), Some(-3));
    }

    #[test]
    fn equality_ignores_epoch() {
        let id = StaveId::next();
        assert_eq!(
            Cursor::bound(id, Epoch(0), 4),
            Cursor::bound(id, Epoch(9), 4)
        );
    }

    #[test]
    fn foreign_cursors_are_unordered() {
        let a = Cursor::bound(StaveId::next(), Epoch(0), 1);
        let b = Cursor::bound(StaveId::next(), Epoch(0), 1);
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
        assert_eq!(a.distance_to(&b), None);
    }

    #[test]
    fn forward_and_back_keep_binding() {
        let id = StaveId::next();
        let c = Cursor::bound(id, Epoch(2), 3);
        let f = c.forward(4).unwrap();
        assert_eq!(f.offset(), 7);
        assert_eq!(f.owner(), Some(id));
        assert_eq!(f.minted(), Some(Epoch(2)));
        assert_eq!(f.back(7).unwrap().offset(), 0);
        assert!(c.back(4).is_none());
        assert!(c.forward(usize::MAX).is_none());
    }
}
