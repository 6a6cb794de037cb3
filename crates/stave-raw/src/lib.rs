//! Raw storage and the relocation engine for Stave containers.
//!
//! This is the only crate in the workspace that contains `unsafe` code.
//! Everything above it (`stave-seq`, `stave`) is `#![forbid(unsafe_code)]`
//! and reaches memory only through the API here.
//!
//! # Architecture
//!
//! ```text
//! RawStorage<T, A> (base, len, capacity, allocator)
//! ├── SlotAllocator (Global | Metered<A>)
//! ├── fill_gap / absorb            in-place hole opening   (gap.rs)
//! ├── erase_range / take / retain  in-place removal        (erase.rs)
//! ├── relocate                     prefix + hole + suffix  (relocate.rs)
//! │   ├── BlockGuard               frees the new block on failure
//! │   └── ConstructionGuard        destroys the built prefix on failure
//! └── into_slots                   owning iteration        (into_iter.rs)
//! ```
//!
//! # Unsafe discipline
//!
//! Every `unsafe` block carries a `// SAFETY:` comment naming the
//! invariant it relies on. Slots `[0, len)` are always live and
//! `[len, capacity)` always uninitialised whenever control can leave a
//! public function, including by unwinding.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod alloc;
pub mod erase;
pub mod gap;
pub mod guard;
pub mod into_iter;
pub mod relocate;
pub mod storage;

pub use alloc::{max_slots, Global, MeterReport, Metered, SlotAllocator};
pub use erase::Retained;
pub use guard::{BlockGuard, ConstructionGuard};
pub use into_iter::IntoSlots;
pub use relocate::{relocate, Relocation, RelocationReport};
pub use storage::RawStorage;
