//! Capacity growth policy.
//!
//! [`GrowthPolicy::next_capacity`] is a pure function from the current
//! capacity and the required length to the capacity the next allocation
//! should have. Geometric growth keeps the total relocation work of `N`
//! sequential appends at O(N).

use crate::error::StaveError;

/// Geometric growth policy with a clamp to the allocator maximum.
///
/// The next capacity is `capacity * numerator / denominator`, raised to at
/// least `min_capacity` and to the required length, and never above the
/// allocator's maximum slot count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Growth factor numerator. Must be `>= denominator`.
    pub numerator: usize,
    /// Growth factor denominator. Must be non-zero.
    pub denominator: usize,
    /// Smallest capacity allocated for a non-empty container.
    pub min_capacity: usize,
}

impl GrowthPolicy {
    /// Default growth factor numerator (factor 1.5).
    pub const DEFAULT_NUMERATOR: usize = 3;

    /// Default growth factor denominator.
    pub const DEFAULT_DENOMINATOR: usize = 2;

    /// Default minimum non-zero capacity.
    pub const DEFAULT_MIN_CAPACITY: usize = 4;

    /// The default 1.5x policy.
    pub const fn new() -> Self {
        Self {
            numerator: Self::DEFAULT_NUMERATOR,
            denominator: Self::DEFAULT_DENOMINATOR,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
        }
    }

    /// A policy that always allocates exactly the required length.
    pub const fn exact() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
            min_capacity: 0,
        }
    }

    /// Check the factor is well-formed.
    pub fn validate(&self) -> Result<(), StaveError> {
        if self.denominator == 0 {
            return Err(StaveError::InvalidConfig {
                reason: "growth denominator must be non-zero".to_string(),
            });
        }
        if self.numerator < self.denominator {
            return Err(StaveError::InvalidConfig {
                reason: format!(
                    "growth factor {}/{} shrinks capacity",
                    self.numerator, self.denominator
                ),
            });
        }
        Ok(())
    }

    /// Compute the capacity for an allocation that must hold `required`
    /// elements, given the current `capacity` and the allocator's `max`.
    ///
    /// Returns `capacity` unchanged when it already suffices. Fails with
    /// [`StaveError::CapacityOverflow`] when `required > max`.
    pub fn next_capacity(
        &self,
        capacity: usize,
        required: usize,
        max: usize,
    ) -> Result<usize, StaveError> {
        if required > max {
            return Err(StaveError::CapacityOverflow {
                requested: required,
                max,
            });
        }
        if required <= capacity {
            return Ok(capacity);
        }

        let step = self.numerator.saturating_sub(self.denominator);
        let extra = (capacity / self.denominator.max(1))
            .checked_mul(step)
            .unwrap_or(usize::MAX);
        let geometric = if extra > max - capacity.min(max) {
            max
        } else {
            capacity + extra
        };

        let target = geometric.max(self.min_capacity).min(max);
        Ok(target.max(required))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = usize::MAX / 8;

    #[test]
    fn empty_grows_to_min_capacity() {
        let policy = GrowthPolicy::new();
        assert_eq!(policy.next_capacity(0, 1, MAX).unwrap(), 4);
    }

    #[test]
    fn grows_by_half() {
        let policy = GrowthPolicy::new();
        assert_eq!(policy.next_capacity(10, 11, MAX).unwrap(), 15);
        assert_eq!(policy.next_capacity(100, 101, MAX).unwrap(), 150);
    }

    #[test]
    fn clamps_to_required_when_geometric_too_small() {
        let policy = GrowthPolicy::new();
        assert_eq!(policy.next_capacity(10, 40, MAX).unwrap(), 40);
    }

    #[test]
    fn sufficient_capacity_is_unchanged() {
        let policy = GrowthPolicy::new();
        assert_eq!(policy.next_capacity(16, 9, MAX).unwrap(), 16);
    }

    #[test]
    fn caps_at_max() {
        let policy = GrowthPolicy::new();
        assert_eq!(policy.next_capacity(90, 91, 100).unwrap(), 100);
    }

    #[test]
    fn required_above_max_overflows() {
        let policy = GrowthPolicy::new();
        let err = policy.next_capacity(0, 101, 100).unwrap_err();
        assert_eq!(
            err,
            StaveError::CapacityOverflow {
                requested: 101,
                max: 100
            }
        );
    }

    #[test]
    fn exact_policy_allocates_required() {
        let policy = GrowthPolicy::exact();
        assert_eq!(policy.next_capacity(10, 11, MAX).unwrap(), 11);
        assert_eq!(policy.next_capacity(0, 1, MAX).unwrap(), 1);
    }

    #[test]
    fn shrinking_factor_rejected() {
        let policy = GrowthPolicy {
            numerator: 1,
            denominator: 2,
            min_capacity: 0,
        };
        assert!(matches!(
            policy.validate(),
            Err(StaveError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_denominator_rejected() {
        let policy = GrowthPolicy {
            numerator: 2,
            denominator: 0,
            min_capacity: 0,
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn huge_capacity_does_not_overflow() {
        let policy = GrowthPolicy::new();
        let cap = usize::MAX - 10;
        assert_eq!(
            policy.next_capacity(cap, cap + 1, usize::MAX).unwrap(),
            usize::MAX
        );
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn result_covers_required_and_respects_max(
                capacity in 0usize..1_000_000,
                extra in 1usize..1_000_000,
                max in 1usize..4_000_000,
            ) {
                let policy = GrowthPolicy::new();
                let required = capacity + extra;
                match policy.next_capacity(capacity, required, max) {
                    Ok(next) => {
                        prop_assert!(next >= required);
                        prop_assert!(next <= max);
                    }
                    Err(StaveError::CapacityOverflow { requested, .. }) => {
                        prop_assert!(required > max);
                        prop_assert_eq!(requested, required);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other}"),
                }
            }

            #[test]
            fn growth_is_at_least_geometric_when_unclamped(capacity in 8usize..1_000_000) {
                let policy = GrowthPolicy::new();
                let next = policy.next_capacity(capacity, capacity + 1, usize::MAX / 2).unwrap();
                prop_assert!(next >= capacity + capacity / 2);
            }
        }
    }
}
