//! Stave: a growable, contiguous sequence container with
//! allocator-parameterised storage.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Stave sub-crates. For most users, adding `stave` as a single
//! dependency is sufficient.
//!
//! Every mutating operation either completes or leaves the container
//! exactly as it was, and failures are reported as [`StaveError`] values
//! rather than panics.
//!
//! # Quick start
//!
//! ```rust
//! use stave::prelude::*;
//!
//! let mut s: Stave<i32> = Stave::new();
//! for v in 0..10 {
//!     s.push(v)?;
//! }
//! s.insert(5, 99)?;
//! assert_eq!(s.len(), 11);
//! assert_eq!(s[5], 99);
//! assert_eq!(s[6], 5);
//!
//! assert_eq!(s.erase(0)?, 0);
//! assert_eq!(s[4], 99);
//!
//! // A failing source leaves the container untouched.
//! let before = s.len();
//! let err = s.try_resize_with(20, |i| if i < 3 { Ok(0) } else { Err("dry") });
//! assert!(matches!(err, Err(StaveError::ConstructionFailed { offset: 3, .. })));
//! assert_eq!(s.len(), before);
//!
//! // Cursors report staleness instead of dangling.
//! let c = s.cursor(8)?;
//! s.erase(2)?;
//! assert_eq!(s.cursor_state(&c), CursorState::Invalidated);
//! # Ok::<(), StaveError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stave-core` | Errors, growth policy, config, cursors, slot sources |
//! | [`raw`] | `stave-raw` | Allocators, raw storage, guards, relocation |
//! | [`seq`] | `stave-seq` | The [`Stave`] container and its metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`stave-core`).
///
/// Contains the error enum, [`types::GrowthPolicy`], [`types::StaveConfig`],
/// cursors, and the [`types::SlotSource`] trait with its stock sources.
pub use stave_core as types;

/// Raw storage layer (`stave-raw`).
///
/// The [`raw::SlotAllocator`] capability, the [`raw::Global`] and
/// [`raw::Metered`] allocators, and the guard and relocation machinery
/// the container is built from.
pub use stave_raw as raw;

/// The container (`stave-seq`).
pub use stave_seq as seq;

pub use stave_core::StaveError;
pub use stave_seq::Stave;

/// Common imports for typical Stave usage.
///
/// ```rust
/// use stave::prelude::*;
/// ```
pub mod prelude {
    // Container
    pub use stave_seq::{Stave, StaveMetrics};

    // Configuration
    pub use stave_core::{GrowthPolicy, StaveConfig};

    // Cursors
    pub use stave_core::{Cursor, CursorState};

    // Sources
    pub use stave_core::{CloneFill, CloneSlice, DefaultFill, Generate, SlotSource, TryGenerate};

    // Allocators
    pub use stave_raw::{Global, Metered, SlotAllocator};

    // Errors
    pub use stave_core::{ConstructError, StaveError};
}
