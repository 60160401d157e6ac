//! # Transition Codec
//!
//! Delta compression of one transition against the running standard offset.
//!
//! Each entry starts with a flag byte:
//!
//! ```text
//! bit  7      new standard offset follows
//! bits 6..5   DST shortcut (0 = explicit offset follows, i = DST_SHORTCUTS[i-1])
//! bits 4..2   time shortcut (0 = raw i64 instant follows, i = TIME_SHORTCUTS[i-1])
//! bits 1..0   high bits of the 18-bit day index
//! ```
//!
//! With a time shortcut two more bytes carry the low 16 bits of the day
//! index. The day and time of day are taken from the instant in local
//! standard time shifted by one hour, counted from 1825-01-01, so the common
//! transitions between 23:00 and 04:00 local time all hit a shortcut.
//!
//! The flag byte is followed by the explicit DST offset (without a DST
//! shortcut) and then the new standard offset (when bit 7 is set).

use std::io::{Read, Write};

use zonal_core::{CodecError, ZonalTransition};

use crate::primitive::{read_i64, read_offset, read_u8, write_i64, write_offset, write_u8};
use crate::wire::{
    DAYS_IN_18_BITS, DST_SHORTCUTS, LOCAL_TIME_SHIFT, NEW_STANDARD_OFFSET_BIT, NO_COMPRESSION,
    POSIX_TIME_1825, SECONDS_PER_DAY, TIME_SHORTCUTS,
};

/// Shortcut slot of `value` in `table`, stored as index + 1.
fn shortcut<T: PartialEq>(table: &[T], value: &T) -> u8 {
    table
        .iter()
        .position(|candidate| candidate == value)
        .map_or(NO_COMPRESSION, |index| index as u8 + 1)
}

/// Writes transitions one by one, carrying the standard offset in force.
#[derive(Debug)]
pub(crate) struct TransitionEncoder {
    standard_offset: i32,
}

impl TransitionEncoder {
    pub(crate) fn new(initial_offset: i32) -> Self {
        Self {
            standard_offset: initial_offset,
        }
    }

    pub(crate) fn write<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        transition: &ZonalTransition,
    ) -> Result<(), CodecError> {
        let standard = i64::from(transition.total_offset())
            - i64::from(transition.daylight_saving_offset());
        let standard = i32::try_from(standard).map_err(|_| CodecError::InvalidField {
            field: "standard offset",
            value: standard,
        })?;
        let new_standard = standard != self.standard_offset;

        let dst = transition.daylight_saving_offset();
        let dst_index = shortcut(&DST_SHORTCUTS, &dst);

        let mut flags = dst_index << 5;
        if new_standard {
            flags |= NEW_STANDARD_OFFSET_BIT;
        }

        let day_slot = self.day_slot(transition.posix_time());
        match day_slot {
            Some((day, time_index)) => {
                flags |= (time_index << 2) | ((day >> 16) & 0x03) as u8;
                write_u8(out, flags)?;
                write_u8(out, ((day >> 8) & 0xFF) as u8)?;
                write_u8(out, (day & 0xFF) as u8)?;
            }
            None => {
                write_u8(out, flags)?;
                write_i64(out, transition.posix_time())?;
            }
        }

        tracing::trace!(
            posix_time = transition.posix_time(),
            dst_shortcut = dst_index,
            day_slot = day_slot.is_some(),
            new_standard,
            "encoded transition"
        );

        if dst_index == NO_COMPRESSION {
            write_offset(out, dst)?;
        }
        if new_standard {
            write_offset(out, standard)?;
            self.standard_offset = standard;
        }
        Ok(())
    }

    /// Day index and time shortcut of `posix_time`, if the shifted local
    /// instant lies in the 18-bit day range on a shortcut time of day.
    fn day_slot(&self, posix_time: i64) -> Option<(u32, u8)> {
        let shifted = posix_time
            .checked_add(i64::from(self.standard_offset))?
            .checked_add(LOCAL_TIME_SHIFT)?;
        if !(POSIX_TIME_1825..POSIX_TIME_1825 + DAYS_IN_18_BITS).contains(&shifted) {
            return None;
        }
        let time_index = shortcut(&TIME_SHORTCUTS, &shifted.rem_euclid(SECONDS_PER_DAY));
        if time_index == NO_COMPRESSION {
            return None;
        }
        let day = (shifted - POSIX_TIME_1825) / SECONDS_PER_DAY;
        Some((day as u32, time_index))
    }
}

/// Reads transitions one by one, rebuilding offsets from the running state
/// and rejecting instants that do not strictly increase.
#[derive(Debug)]
pub(crate) struct TransitionDecoder {
    previous: i32,
    standard_offset: i32,
    last_posix_time: Option<i64>,
    index: usize,
}

impl TransitionDecoder {
    pub(crate) fn new(initial_offset: i32) -> Self {
        Self {
            previous: initial_offset,
            standard_offset: initial_offset,
            last_posix_time: None,
            index: 0,
        }
    }

    pub(crate) fn read<R: Read + ?Sized>(&mut self, input: &mut R) -> Result<ZonalTransition, CodecError> {
        let flags = read_u8(input)?;
        let dst_index = (flags >> 5) & 0x03;
        let time_index = (flags >> 2) & 0x07;

        let posix_time = if time_index == NO_COMPRESSION {
            read_i64(input)?
        } else {
            let high = u32::from(flags & 0x03) << 16;
            let mid = u32::from(read_u8(input)?) << 8;
            let low = u32::from(read_u8(input)?);
            let day = i64::from(high | mid | low);
            let time_of_day = TIME_SHORTCUTS[usize::from(time_index) - 1];
            day * SECONDS_PER_DAY + POSIX_TIME_1825 + time_of_day
                - LOCAL_TIME_SHIFT
                - i64::from(self.standard_offset)
        };

        if self.last_posix_time.is_some_and(|last| posix_time <= last) {
            tracing::warn!(
                index = self.index,
                posix_time,
                "rejected stream: transitions out of order"
            );
            return Err(CodecError::OrderViolation {
                what: "transition",
                index: self.index,
            });
        }

        let dst = if dst_index == NO_COMPRESSION {
            read_offset(input)?
        } else {
            DST_SHORTCUTS[usize::from(dst_index) - 1]
        };

        if flags & NEW_STANDARD_OFFSET_BIT != 0 {
            self.standard_offset = read_offset(input)?;
        }

        let total = self
            .standard_offset
            .checked_add(dst)
            .ok_or(CodecError::InvalidField {
                field: "total offset",
                value: i64::from(self.standard_offset) + i64::from(dst),
            })?;

        let transition = ZonalTransition::new(posix_time, self.previous, total, dst);
        self.previous = total;
        self.last_posix_time = Some(posix_time);
        self.index += 1;
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(initial: i32, transitions: &[ZonalTransition]) -> Vec<u8> {
        let mut encoder = TransitionEncoder::new(initial);
        let mut out = Vec::new();
        for t in transitions {
            encoder.write(&mut out, t).unwrap();
        }
        out
    }

    fn decode(initial: i32, count: usize, bytes: &[u8]) -> Result<Vec<ZonalTransition>, CodecError> {
        let mut decoder = TransitionDecoder::new(initial);
        let mut input = bytes;
        let decoded = (0..count)
            .map(|_| decoder.read(&mut input))
            .collect::<Result<Vec<_>, _>>()?;
        assert!(input.is_empty(), "unread bytes: {input:?}");
        Ok(decoded)
    }

    // 2024-03-31T01:00:00Z, CET to CEST.
    const SPRING_2024: i64 = 1_711_846_800;
    // 2024-10-27T01:00:00Z, CEST to CET.
    const AUTUMN_2024: i64 = 1_729_990_800;

    // ---- shortcuts ----

    #[test]
    fn test_typical_transition_is_three_bytes() {
        // 01:00Z + 1h std + 1h shift = 03:00 -> time shortcut 10800.
        let t = ZonalTransition::new(SPRING_2024, 3600, 7200, 3600);
        let bytes = encode(3600, &[t]);
        assert_eq!(bytes.len(), 3);
        assert_eq!((bytes[0] >> 5) & 0x03, 2, "dst shortcut for 3600");
        assert_eq!((bytes[0] >> 2) & 0x07, 5, "time shortcut for 10800");
        assert_eq!(bytes[0] & NEW_STANDARD_OFFSET_BIT, 0);
        assert_eq!(decode(3600, 1, &bytes).unwrap(), vec![t]);
    }

    #[test]
    fn test_dst_shortcuts() {
        for (dst, index) in [(0, 1u8), (3600, 2), (7200, 3)] {
            let t = ZonalTransition::new(SPRING_2024, 3600, 3600 + dst, dst);
            let bytes = encode(3600, &[t]);
            assert_eq!((bytes[0] >> 5) & 0x03, index);
            assert_eq!(bytes.len(), 3, "no explicit dst for {dst}");
            assert_eq!(decode(3600, 1, &bytes).unwrap(), vec![t]);
        }
    }

    #[test]
    fn test_half_hour_dst_is_explicit() {
        let t = ZonalTransition::new(SPRING_2024, 3600, 5400, 1800);
        let bytes = encode(3600, &[t]);
        assert_eq!((bytes[0] >> 5) & 0x03, 0);
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[3], 2);
        assert_eq!(decode(3600, 1, &bytes).unwrap(), vec![t]);
    }

    #[test]
    fn test_odd_time_uses_raw_instant() {
        let t = ZonalTransition::new(1_000_000_000, 0, 3600, 3600);
        let bytes = encode(0, &[t]);
        assert_eq!(bytes[0], 0x40);
        assert_eq!(&bytes[1..], &1_000_000_000i64.to_be_bytes());
        assert_eq!(decode(0, 1, &bytes).unwrap(), vec![t]);
    }

    #[test]
    fn test_before_1825_uses_raw_instant() {
        let t = ZonalTransition::new(POSIX_TIME_1825 - 7200, 0, 0, 0);
        let bytes = encode(0, &[t]);
        assert_eq!((bytes[0] >> 2) & 0x07, NO_COMPRESSION);
        assert_eq!(decode(0, 1, &bytes).unwrap(), vec![t]);
    }

    #[test]
    fn test_extreme_instant_does_not_overflow() {
        let t = ZonalTransition::new(i64::MAX, 0, 3600, 0);
        let bytes = encode(0, &[t]);
        assert_eq!(bytes[0] & NEW_STANDARD_OFFSET_BIT, NEW_STANDARD_OFFSET_BIT);
        assert_eq!(decode(0, 1, &bytes).unwrap(), vec![t]);
    }

    #[test]
    fn test_high_day_bits() {
        // Day index >= 65536 needs the low two flag bits (year 2004+).
        let t = ZonalTransition::new(SPRING_2024, 3600, 7200, 3600);
        let bytes = encode(3600, &[t]);
        let day = (SPRING_2024 + 3600 + 3600 - POSIX_TIME_1825) / SECONDS_PER_DAY;
        assert!(day >= 1 << 16);
        assert_eq!(i64::from(bytes[0] & 0x03), day >> 16);
    }

    // ---- running state ----

    #[test]
    fn test_standard_offset_change_is_flagged() {
        let first = ZonalTransition::new(SPRING_2024, 3600, 7200, 3600);
        let second = ZonalTransition::new(AUTUMN_2024, 7200, 7200, 0);
        let bytes = encode(3600, &[first, second]);
        let decoded = decode(3600, 2, &bytes).unwrap();
        assert_eq!(decoded, vec![first, second]);
        assert_eq!(decoded[1].standard_offset(), 7200);
    }

    #[test]
    fn test_offsets_chain() {
        let transitions = [
            ZonalTransition::new(SPRING_2024, 3600, 7200, 3600),
            ZonalTransition::new(AUTUMN_2024, 7200, 3600, 0),
        ];
        let decoded = decode(3600, 2, &encode(3600, &transitions)).unwrap();
        assert_eq!(decoded[0].previous_offset(), 3600);
        assert_eq!(decoded[1].previous_offset(), decoded[0].total_offset());
    }

    #[test]
    fn test_descending_instants_rejected() {
        let bytes = encode(
            0,
            &[
                ZonalTransition::new(100, 0, 0, 0),
                ZonalTransition::new(50, 0, 0, 0),
            ],
        );
        let err = decode(0, 2, &bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::OrderViolation { what: "transition", index: 1 }
        ));
    }

    #[test]
    fn test_equal_instants_rejected() {
        let t = ZonalTransition::new(100, 0, 0, 0);
        let bytes = encode(0, &[t, t]);
        assert!(matches!(
            decode(0, 2, &bytes).unwrap_err(),
            CodecError::OrderViolation { .. }
        ));
    }

    #[test]
    fn test_first_instant_may_be_minimum() {
        let t = ZonalTransition::new(i64::MIN, 0, 0, 0);
        assert_eq!(decode(0, 1, &encode(0, &[t])).unwrap(), vec![t]);
    }

    #[test]
    fn test_overflowing_total_rejected() {
        // raw instant, explicit dst 0x7F + i32::MAX, new standard 3600
        let mut bytes = vec![NEW_STANDARD_OFFSET_BIT];
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.push(0x7F);
        bytes.extend_from_slice(&i32::MAX.to_be_bytes());
        bytes.push(4);
        let err = decode(0, 1, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "total offset", .. }));
    }

    #[test]
    fn test_truncated_entry_is_io_error() {
        let t = ZonalTransition::new(SPRING_2024, 3600, 7200, 3600);
        let bytes = encode(3600, &[t]);
        assert!(matches!(
            decode(3600, 1, &bytes[..2]).unwrap_err(),
            CodecError::Io(_)
        ));
    }
}
