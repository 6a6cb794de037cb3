//! Error types for the Stave container workspace.
//!
//! Every fallible container operation reports a [`StaveError`]. Whenever
//! one is returned, the container's length, capacity, and contents are
//! exactly what they were before the call.

use std::error::Error;
use std::fmt;

use crate::id::{Epoch, StaveId};

/// Errors from container operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaveError {
    /// The requested element count exceeds what the allocator can represent.
    CapacityOverflow {
        /// Number of slots the operation needed.
        requested: usize,
        /// Largest slot count the allocator supports for this element type.
        max: usize,
    },
    /// The allocator could not satisfy a request.
    AllocationFailed {
        /// Number of slots requested.
        slots: usize,
        /// Size of the request in bytes.
        bytes: usize,
    },
    /// Producing an element for a new slot failed.
    ConstructionFailed {
        /// Offset of the failing slot within the run being constructed.
        offset: usize,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// An index lies outside the live range.
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// Container length at the time of the call.
        len: usize,
    },
    /// A range is inverted or extends past the live range.
    InvalidRange {
        /// Start of the range.
        start: usize,
        /// End of the range (exclusive).
        end: usize,
        /// Container length at the time of the call.
        len: usize,
    },
    /// The operation needs at least one element.
    Empty,
    /// A default-constructed cursor was used where a bound one is required.
    UnboundCursor,
    /// The cursor was minted by a different container.
    ForeignCursor {
        /// Container that minted the cursor.
        cursor_owner: StaveId,
        /// Container the cursor was presented to.
        container: StaveId,
    },
    /// The cursor was invalidated by a relocation or a shift at or
    /// before its offset.
    StaleCursor {
        /// Offset the cursor refers to.
        offset: usize,
        /// Epoch at which the cursor was minted.
        minted: Epoch,
        /// The container's current epoch.
        current: Epoch,
    },
    /// A configuration value was rejected.
    InvalidConfig {
        /// Description of the rejected value.
        reason: String,
    },
}

impl StaveError {
    /// Returns `true` for the cursor-validation variants.
    pub fn is_cursor_error(&self) -> bool {
        matches!(
            self,
            Self::UnboundCursor | Self::ForeignCursor { .. } | Self::StaleCursor { .. }
        )
    }
}

impl fmt::Display for StaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested, max } => {
                write!(
                    f,
                    "capacity overflow: requested {requested} slots, maximum {max}"
                )
            }
            Self::AllocationFailed { slots, bytes } => {
                write!(f, "allocation of {slots} slots ({bytes} bytes) failed")
            }
            Self::ConstructionFailed { offset, reason } => {
                write!(f, "construction failed at offset {offset}: {reason}")
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::InvalidRange { start, end, len } => {
                write!(f, "range {start}..{end} invalid for length {len}")
            }
            Self::Empty => write!(f, "container is empty"),
            Self::UnboundCursor => write!(f, "cursor is not bound to a container"),
            Self::ForeignCursor {
                cursor_owner,
                container,
            } => {
                write!(
                    f,
                    "cursor belongs to container {cursor_owner}, not {container}"
                )
            }
            Self::StaleCursor {
                offset,
                minted,
                current,
            } => {
                write!(
                    f,
                    "stale cursor at offset {offset}: minted at epoch {minted}, current {current}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for StaveError {}

/// Failure reported by a [`SlotSource`](crate::SlotSource).
///
/// Carries only the reason; the container attaches the slot offset when
/// converting it into [`StaveError::ConstructionFailed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl ConstructError {
    /// Create a construction error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Attach the offset of the failing slot.
    pub fn at(self, offset: usize) -> StaveError {
        StaveError::ConstructionFailed {
            offset,
            reason: self.reason,
        }
    }
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for ConstructError {}
