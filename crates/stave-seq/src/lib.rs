//! The Stave container: a growable, contiguous, allocator-parameterised
//! sequence with commit-or-rollback mutation.
//!
//! [`Stave<T, A>`] layers the container semantics over the raw storage of
//! `stave-raw`:
//!
//! - **Insertion** (`hole.rs`): every insert opens a hole and fills it from
//!   a [`SlotSource`](stave_core::SlotSource), in place or by relocation.
//! - **Removal** (`erase.rs`): erase, retain, truncate, pop, release.
//! - **Capacity** (`resize.rs`): resize, reserve, shrink-to-fit.
//! - **Cursors** (`cursor.rs`, `epoch.rs`): epoch-checked positions that
//!   report staleness instead of dangling.
//! - **Queries** (`query.rs`): checked access and linear search.
//!
//! Every `Err` leaves the container's length, capacity, and contents as
//! they were before the call.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cursor;
mod epoch;
mod erase;
mod hole;
pub mod metrics;
mod query;
mod resize;
mod stave;

pub use metrics::StaveMetrics;
pub use stave::Stave;

/// Owning iterator returned by `Stave::into_iter`.
pub type IntoIter<T, A = stave_raw::Global> = stave_raw::IntoSlots<T, A>;
