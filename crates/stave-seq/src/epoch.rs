//! Cursor validity tracking.
//!
//! Each invalidating mutation advances the container's [`Epoch`] and
//! records a *floor*: the lowest offset whose slot the mutation moved or
//! destroyed. A cursor minted at epoch `m` for offset `o` is still valid
//! iff every mutation recorded after `m` has a floor above `o`.
//!
//! Only the most recent `depth` records are kept. Dropping the oldest
//! record raises the *horizon*; cursors minted before the horizon can no
//! longer be checked and are treated as stale. A relocation (floor 0)
//! clears the log outright, since it invalidates every cursor anyway.

use smallvec::SmallVec;
use stave_core::Epoch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Shift {
    epoch: Epoch,
    floor: usize,
}

/// Bounded log of recent invalidating mutations.
#[derive(Clone, Debug)]
pub(crate) struct EpochLog {
    current: Epoch,
    horizon: Epoch,
    shifts: SmallVec<[Shift; 8]>,
    depth: usize,
}

impl EpochLog {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            current: Epoch::default(),
            horizon: Epoch::default(),
            shifts: SmallVec::new(),
            depth,
        }
    }

    pub(crate) fn current(&self) -> Epoch {
        self.current
    }

    /// Record a mutation that moved or destroyed every slot at or above
    /// `floor`.
    pub(crate) fn record(&mut self, floor: usize) {
        self.current = self.current.successor();
        if floor == 0 || self.depth == 0 {
            self.shifts.clear();
            self.horizon = self.current;
            return;
        }
        if self.shifts.len() == self.depth {
            let oldest = self.shifts.remove(0);
            self.horizon = oldest.epoch;
        }
        self.shifts.push(Shift {
            epoch: self.current,
            floor,
        });
    }

    /// Whether a cursor minted at `minted` for `offset` is still valid.
    pub(crate) fn is_live(&self, minted: Epoch, offset: usize) -> bool {
        if minted > self.current || minted < self.horizon {
            return false;
        }
        self.shifts
            .iter()
            .filter(|s| s.epoch > minted)
            .all(|s| offset < s.floor)
    }
}
