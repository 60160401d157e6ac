//! # Zonal Transitions
//!
//! A `ZonalTransition` is the instant at which the active UTC offset of a
//! location changes. The standard offset is derived from the total and the
//! daylight saving offset and is never stored on its own.
//!
//! ## Chain Invariant
//!
//! In every ordered list of transitions, instants strictly increase and the
//! `previous_offset` of each transition equals the `total_offset` of the one
//! before it. [`check_transitions`] verifies both.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// An offset change at a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZonalTransition {
    posix_time: i64,
    previous_offset: i32,
    total_offset: i32,
    daylight_saving_offset: i32,
}

impl ZonalTransition {
    /// Create a transition. Offsets are in seconds.
    pub const fn new(
        posix_time: i64,
        previous_offset: i32,
        total_offset: i32,
        daylight_saving_offset: i32,
    ) -> Self {
        Self {
            posix_time,
            previous_offset,
            total_offset,
            daylight_saving_offset,
        }
    }

    /// Seconds since 1970-01-01T00:00:00Z.
    pub const fn posix_time(&self) -> i64 {
        self.posix_time
    }

    /// Total offset in force before this transition.
    pub const fn previous_offset(&self) -> i32 {
        self.previous_offset
    }

    /// Total offset in force from this transition on.
    pub const fn total_offset(&self) -> i32 {
        self.total_offset
    }

    /// Daylight saving part of the total offset.
    pub const fn daylight_saving_offset(&self) -> i32 {
        self.daylight_saving_offset
    }

    /// Standard part of the total offset.
    ///
    /// Exact for every transition held by a model. Saturates for a bare
    /// transition whose difference does not fit, see
    /// [`checked_standard_offset`](Self::checked_standard_offset).
    pub const fn standard_offset(&self) -> i32 {
        self.total_offset.saturating_sub(self.daylight_saving_offset)
    }

    /// Standard part of the total offset, or `None` if it overflows `i32`.
    pub const fn checked_standard_offset(&self) -> Option<i32> {
        self.total_offset.checked_sub(self.daylight_saving_offset)
    }

    /// Whether daylight saving time is in force after this transition.
    pub const fn is_daylight_saving(&self) -> bool {
        self.daylight_saving_offset != 0
    }

    /// Change of the total offset in seconds; positive for a gap.
    pub const fn size(&self) -> i64 {
        self.total_offset as i64 - self.previous_offset as i64
    }

    /// Local clocks jump forward, leaving a range of local times that never occur.
    pub const fn is_gap(&self) -> bool {
        self.size() > 0
    }

    /// Local clocks fall back, so a range of local times occurs twice.
    pub const fn is_overlap(&self) -> bool {
        self.size() < 0
    }
}

/// Verify that the standard offset of `transition` is representable.
pub(crate) fn check_standard_offset(
    index: usize,
    transition: &ZonalTransition,
) -> Result<(), ModelError> {
    match transition.checked_standard_offset() {
        Some(_) => Ok(()),
        None => Err(ModelError::StandardOffsetOverflow {
            index,
            total: transition.total_offset,
            daylight_saving: transition.daylight_saving_offset,
        }),
    }
}

/// Verify that `transitions` is non-empty, strictly ascending and chained,
/// and that every standard offset is representable.
pub fn check_transitions(transitions: &[ZonalTransition]) -> Result<(), ModelError> {
    if transitions.is_empty() {
        return Err(ModelError::MissingTransitions);
    }
    for (index, transition) in transitions.iter().enumerate() {
        check_standard_offset(index, transition)?;
    }

    for (index, pair) in transitions.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.posix_time <= prev.posix_time {
            return Err(ModelError::UnorderedTransitions {
                index: index + 1,
                posix_time: next.posix_time,
                previous: prev.posix_time,
            });
        }
        if next.previous_offset != prev.total_offset {
            return Err(ModelError::BrokenOffsetChain {
                index: index + 1,
                expected: prev.total_offset,
                actual: next.previous_offset,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_offset_is_derived() {
        let t = ZonalTransition::new(1_000_000_000, 3600, 7200, 3600);
        assert_eq!(t.standard_offset(), 3600);
        assert!(t.is_daylight_saving());
    }

    #[test]
    fn test_gap_and_overlap() {
        let spring = ZonalTransition::new(0, 3600, 7200, 3600);
        assert!(spring.is_gap());
        assert!(!spring.is_overlap());
        assert_eq!(spring.size(), 3600);

        let autumn = ZonalTransition::new(100, 7200, 3600, 0);
        assert!(autumn.is_overlap());
        assert_eq!(autumn.size(), -3600);

        let rename = ZonalTransition::new(200, 3600, 3600, 0);
        assert!(!rename.is_gap());
        assert!(!rename.is_overlap());
    }

    #[test]
    fn test_check_accepts_chained_ascending() {
        let list = [
            ZonalTransition::new(100, 0, 3600, 3600),
            ZonalTransition::new(200, 3600, 0, 0),
            ZonalTransition::new(300, 0, 3600, 3600),
        ];
        assert!(check_transitions(&list).is_ok());
    }

    #[test]
    fn test_check_rejects_empty() {
        assert_eq!(check_transitions(&[]), Err(ModelError::MissingTransitions));
    }

    #[test]
    fn test_check_rejects_descending() {
        let list = [
            ZonalTransition::new(100, 0, 3600, 3600),
            ZonalTransition::new(50, 3600, 0, 0),
        ];
        assert_eq!(
            check_transitions(&list),
            Err(ModelError::UnorderedTransitions {
                index: 1,
                posix_time: 50,
                previous: 100,
            })
        );
    }

    #[test]
    fn test_check_rejects_duplicate_instant() {
        let list = [
            ZonalTransition::new(100, 0, 3600, 3600),
            ZonalTransition::new(100, 3600, 0, 0),
        ];
        assert!(matches!(
            check_transitions(&list),
            Err(ModelError::UnorderedTransitions { index: 1, .. })
        ));
    }

    #[test]
    fn test_check_rejects_broken_chain() {
        let list = [
            ZonalTransition::new(100, 0, 3600, 3600),
            ZonalTransition::new(200, 1800, 0, 0),
        ];
        assert_eq!(
            check_transitions(&list),
            Err(ModelError::BrokenOffsetChain {
                index: 1,
                expected: 3600,
                actual: 1800,
            })
        );
    }

    #[test]
    fn test_extreme_offsets_do_not_overflow() {
        let t = ZonalTransition::new(0, i32::MAX, i32::MIN, 1);
        assert_eq!(t.checked_standard_offset(), None);
        assert_eq!(t.standard_offset(), i32::MIN);
        assert_eq!(t.size(), i64::from(i32::MIN) - i64::from(i32::MAX));
        assert!(t.is_overlap());
    }

    #[test]
    fn test_check_rejects_unrepresentable_standard_offset() {
        let list = [
            ZonalTransition::new(100, 0, 3600, 3600),
            ZonalTransition::new(200, 3600, i32::MIN, 1),
        ];
        assert_eq!(
            check_transitions(&list),
            Err(ModelError::StandardOffsetOverflow {
                index: 1,
                total: i32::MIN,
                daylight_saving: 1,
            })
        );
    }
}
