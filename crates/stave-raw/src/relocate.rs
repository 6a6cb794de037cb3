//! Relocation into a fresh block.
//!
//! [`relocate`] builds a new block holding `prefix + hole + suffix` and
//! installs it only once every slot of the hole has been constructed. Until
//! that point the old block is read but never written, so a failure at
//! any step leaves the storage exactly as it was.
//!
//! Elements are transferred with a bitwise move. Moves cannot fail, so
//! there is no copy fallback and no partially transferred state to undo.

use std::ptr;

use stave_core::{SlotSource, StaveError};
use tracing::{debug, warn};

use crate::alloc::SlotAllocator;
use crate::guard::{BlockGuard, ConstructionGuard};
use crate::storage::RawStorage;

/// Shape of the block a relocation builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// Capacity of the new block. Must be at least `len + hole_len`.
    pub capacity: usize,
    /// Index at which the hole opens. Must be at most `len`.
    pub hole_at: usize,
    /// Number of new slots constructed from the source.
    pub hole_len: usize,
}

impl Relocation {
    /// A relocation that opens no hole (reserve, shrink-to-fit).
    pub fn to_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            hole_at: 0,
            hole_len: 0,
        }
    }

    /// A relocation that opens `hole_len` slots at `hole_at`.
    pub fn with_hole(capacity: usize, hole_at: usize, hole_len: usize) -> Self {
        Self {
            capacity,
            hole_at,
            hole_len,
        }
    }
}

/// What a successful relocation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelocationReport {
    /// Capacity before the relocation.
    pub old_capacity: usize,
    /// Capacity after the relocation.
    pub new_capacity: usize,
    /// Elements moved from the old block.
    pub moved: usize,
    /// Elements constructed in the hole.
    pub constructed: usize,
}

/// Rebuild `storage` into a block shaped by `plan`, filling the hole
/// from `source`.
///
/// # Errors
///
/// - [`StaveError::InvalidRange`] if the hole starts past the live range.
/// - [`StaveError::CapacityOverflow`] if the plan cannot hold the live
///   elements plus the hole.
/// - [`StaveError::AllocationFailed`] if the allocator refuses the block.
/// - [`StaveError::ConstructionFailed`] if the source fails.
///
/// On every error the storage is unchanged.
pub fn relocate<T, A, S>(
    storage: &mut RawStorage<T, A>,
    plan: &Relocation,
    source: &mut S,
) -> Result<RelocationReport, StaveError>
where
    A: SlotAllocator,
    S: SlotSource<T> + ?Sized,
{
    let len = storage.len;
    let Relocation {
        capacity,
        hole_at,
        hole_len,
    } = *plan;
    if hole_at > len {
        return Err(StaveError::InvalidRange {
            start: hole_at,
            end: hole_at.saturating_add(hole_len),
            len,
        });
    }
    let new_len = len
        .checked_add(hole_len)
        .ok_or(StaveError::CapacityOverflow {
            requested: usize::MAX,
            max: storage.max_count(),
        })?;
    if capacity < new_len || capacity > storage.max_count() {
        return Err(StaveError::CapacityOverflow {
            requested: new_len.max(capacity),
            max: storage.max_count(),
        });
    }

    let old_capacity = storage.capacity;
    let old = storage.base;

    let block = {
        let alloc = &storage.alloc;
        let fresh = alloc.allocate::<T>(capacity)?;
        // SAFETY: fresh was just allocated with this capacity and is empty.
        let free_on_failure = unsafe { BlockGuard::new(alloc, fresh, capacity) };
        // SAFETY: hole_at + hole_len <= capacity, and the hole lies inside
        // the fresh block, which nothing else references.
        let mut hole = unsafe { ConstructionGuard::new(alloc, fresh.add(hole_at), hole_len) };
        if let Err(err) = hole.fill(source) {
            warn!(
                hole_at,
                hole_len,
                built = hole.built(),
                %err,
                "relocation rolled back"
            );
            return Err(err);
        }
        let _ = hole.finish();
        free_on_failure.disarm()
    };

    // SAFETY: the prefix [0, hole_at) and suffix [hole_at, len) are live in
    // the old block; their destinations in the new block are uninitialised
    // and disjoint from the hole. The blocks are distinct allocations.
    // Nothing from here to `commit_block` can fail or panic.
    unsafe {
        ptr::copy_nonoverlapping(old.as_ptr(), block.as_ptr(), hole_at);
        ptr::copy_nonoverlapping(
            old.add(hole_at).as_ptr(),
            block.add(hole_at + hole_len).as_ptr(),
            len - hole_at,
        );
        storage.commit_block(block, new_len, capacity);
    }

    debug!(
        old_capacity,
        new_capacity = capacity,
        moved = len,
        constructed = hole_len,
        "storage relocated"
    );
    Ok(RelocationReport {
        old_capacity,
        new_capacity: capacity,
        moved: len,
        constructed: hole_len,
    })
}
