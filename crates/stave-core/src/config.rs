//! Container configuration parameters.

use crate::error::StaveError;
use crate::growth::GrowthPolicy;

/// Configuration for a container instance.
///
/// Controls capacity growth and how far back cursor validity is tracked.
/// Validated at construction; immutable for the life of the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaveConfig {
    /// Growth policy consulted whenever an insertion outgrows capacity.
    pub growth: GrowthPolicy,

    /// Number of recent invalidating mutations remembered for cursor checks.
    ///
    /// Default: 8. A cursor minted before the oldest remembered mutation
    /// is treated as stale even if that mutation did not touch its offset.
    /// Zero means every invalidating mutation stales all older cursors.
    pub cursor_history: usize,
}

impl StaveConfig {
    /// Default cursor history depth.
    pub const DEFAULT_CURSOR_HISTORY: usize = 8;

    /// Upper bound on `cursor_history`.
    pub const MAX_CURSOR_HISTORY: usize = 256;

    /// Create a config with the default growth policy and history depth.
    pub const fn new() -> Self {
        Self {
            growth: GrowthPolicy::new(),
            cursor_history: Self::DEFAULT_CURSOR_HISTORY,
        }
    }

    /// Replace the growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Replace the cursor history depth.
    pub fn with_cursor_history(mut self, depth: usize) -> Self {
        self.cursor_history = depth;
        self
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<(), StaveError> {
        self.growth.validate()?;
        if self.cursor_history > Self::MAX_CURSOR_HISTORY {
            return Err(StaveError::InvalidConfig {
                reason: format!(
                    "cursor_history must be <= {} (got {})",
                    Self::MAX_CURSOR_HISTORY,
                    self.cursor_history
                ),
            });
        }
        Ok(())
    }
}

impl Default for StaveConfig {
    fn default() -> Self {
        Self::new()
    }
}
