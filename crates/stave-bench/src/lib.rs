//! Workload generators for benchmarking the Stave container.
//!
//! - [`edit_script`]: a deterministic, seeded mix of positional edits
//! - [`apply_to_stave`] / [`apply_to_vec`]: replay a script, so the same
//!   workload can be timed against `Vec` as a baseline

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stave_core::StaveError;
use stave_seq::Stave;

/// One positional edit. Positions are reduced modulo the current length
/// when the script is replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Append a value.
    Push(u64),
    /// Insert a value before `position % (len + 1)`.
    Insert { position: usize, value: u64 },
    /// Remove the element at `position % len`. Skipped when empty.
    Erase { position: usize },
    /// Remove the last element. Skipped when empty.
    Pop,
}

/// Generate `n` edits from `seed`.
///
/// `insert_bias` out of 100 edits add an element; the rest are split
/// evenly between positional erase and pop, so a bias above 50 grows the
/// container over the run.
pub fn edit_script(seed: u64, n: usize, insert_bias: u32) -> Vec<Edit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let roll = rng.next_u32() % 100;
            let position = rng.next_u64() as usize;
            let value = rng.next_u64();
            if roll < insert_bias {
                if roll % 4 == 0 {
                    Edit::Push(value)
                } else {
                    Edit::Insert { position, value }
                }
            } else if roll % 2 == 0 {
                Edit::Erase { position }
            } else {
                Edit::Pop
            }
        })
        .collect()
}

/// Replay `script` against a [`Stave`].
pub fn apply_to_stave(s: &mut Stave<u64>, script: &[Edit]) -> Result<(), StaveError> {
    for edit in script {
        match *edit {
            Edit::Push(value) => {
                s.push(value)?;
            }
            Edit::Insert { position, value } => s.insert(position % (s.len() + 1), value)?,
            Edit::Erase { position } if !s.is_empty() => {
                s.erase(position % s.len())?;
            }
            Edit::Pop if !s.is_empty() => {
                s.pop()?;
            }
            Edit::Erase { .. } | Edit::Pop => {}
        }
    }
    Ok(())
}

/// Replay `script` against a `Vec`.
pub fn apply_to_vec(v: &mut Vec<u64>, script: &[Edit]) {
    for edit in script {
        match *edit {
            Edit::Push(value) => v.push(value),
            Edit::Insert { position, value } => v.insert(position % (v.len() + 1), value),
            Edit::Erase { position } if !v.is_empty() => {
                v.remove(position % v.len());
            }
            Edit::Pop => {
                v.pop();
            }
            Edit::Erase { .. } => {}
        }
    }
}
