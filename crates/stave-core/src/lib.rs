//! Core types for the Stave container workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the raw storage layer and the container:
//! identifiers, cursors, the error enum, the growth policy, container
//! configuration, and the [`SlotSource`] seam through which new elements
//! are produced.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod growth;
pub mod id;
pub mod source;

pub use config::StaveConfig;
pub use cursor::{Cursor, CursorState};
pub use error::{ConstructError, StaveError};
pub use growth::GrowthPolicy;
pub use id::{Epoch, StaveId};
pub use source::{
    CloneFill, CloneSlice, DefaultFill, Drain, EmptySource, Generate, Once, SlotSource,
    TryGenerate,
};
