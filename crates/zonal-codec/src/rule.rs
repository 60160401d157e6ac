//! # Rule Codec
//!
//! Encodes one daylight saving rule body. The type tag that selects the
//! pattern is written by the caller (the envelope or the rule list).
//!
//! ## Layout
//!
//! ```text
//! FixedDay          [month: i8][dayOfMonth: i8][tail]
//! DayOfWeekInMonth  [month: i8][dayOfMonth: i8][±dayOfWeek: i8][tail]
//! LastDayOfWeek     [dayOfWeek << 4 | month: u8][tail]
//!
//! tail              [secondOfDay << 8 | shortcut | indicator: i32][savings?]
//! ```
//!
//! Days of week are ISO numbers (Monday = 1). A negative day of week in the
//! day-of-week-in-month pattern selects the "on or after" search.
//!
//! The low byte of the tail carries the indicator ordinal in bits 0-2, bit 3
//! for zero savings and bit 4 for one hour of savings. Any other savings
//! amount follows as an offset-encoded value.

use std::io::{Read, Write};

use zonal_core::rule::{month_from_number, weekday_from_number, SECONDS_PER_DAY};
use zonal_core::{
    CodecError, DayOfWeekInMonthPattern, DaylightSavingRule, FixedDayPattern,
    LastDayOfWeekPattern, Month, OffsetIndicator, RuleKind,
};

use crate::primitive::{read_i32, read_i8, read_offset, read_u8, write_i32, write_i8, write_offset, write_u8};
use crate::wire::{SAVINGS_ONE_HOUR_BIT, SAVINGS_ZERO_BIT};

const INDICATOR_MASK: i32 = 7;

/// Write the body of `rule` (without its type tag).
pub fn write_rule<W: Write + ?Sized>(out: &mut W, rule: &DaylightSavingRule) -> Result<(), CodecError> {
    let month = rule.month().number_from_month() as u8;

    match rule {
        DaylightSavingRule::FixedDay(p) => {
            write_u8(out, month)?;
            write_u8(out, p.day_of_month())?;
        }
        DaylightSavingRule::DayOfWeekInMonth(p) => {
            write_u8(out, month)?;
            write_u8(out, p.day_of_month())?;
            let dow = p.day_of_week().number_from_monday() as i8;
            write_i8(out, if p.is_after() { -dow } else { dow })?;
        }
        DaylightSavingRule::LastDayOfWeek(p) => {
            let dow = p.day_of_week().number_from_monday() as u8;
            write_u8(out, (dow << 4) | month)?;
        }
    }

    write_tail(out, rule)
}

/// Read the body of a rule of the given pattern.
pub fn read_rule<R: Read + ?Sized>(input: &mut R, kind: RuleKind) -> Result<DaylightSavingRule, CodecError> {
    let rule: DaylightSavingRule = match kind {
        RuleKind::FixedDay => {
            let month = read_month(i64::from(read_i8(input)?))?;
            let day_of_month = read_day_of_month(input)?;
            let tail = read_tail(input)?;
            FixedDayPattern::new(month, day_of_month, tail.time_of_day, tail.indicator, tail.savings)?
                .into()
        }
        RuleKind::DayOfWeekInMonth => {
            let month = read_month(i64::from(read_i8(input)?))?;
            let day_of_month = read_day_of_month(input)?;
            let dow = read_i8(input)?;
            let day_of_week = weekday_from_number(u32::from(dow.unsigned_abs())).map_err(|_| {
                CodecError::InvalidField {
                    field: "day of week",
                    value: i64::from(dow),
                }
            })?;
            let tail = read_tail(input)?;
            DayOfWeekInMonthPattern::new(
                month,
                day_of_month,
                day_of_week,
                dow < 0,
                tail.time_of_day,
                tail.indicator,
                tail.savings,
            )?
            .into()
        }
        RuleKind::LastDayOfWeek => {
            let data = read_u8(input)?;
            let month = read_month(i64::from(data & 0x0F))?;
            let day_of_week = weekday_from_number(u32::from(data >> 4)).map_err(|_| {
                CodecError::InvalidField {
                    field: "day of week",
                    value: i64::from(data >> 4),
                }
            })?;
            let tail = read_tail(input)?;
            LastDayOfWeekPattern::new(month, day_of_week, tail.time_of_day, tail.indicator, tail.savings)?
                .into()
        }
    };
    Ok(rule)
}

fn read_month(value: i64) -> Result<Month, CodecError> {
    u32::try_from(value)
        .ok()
        .and_then(|n| month_from_number(n).ok())
        .ok_or(CodecError::InvalidField {
            field: "month",
            value,
        })
}

fn read_day_of_month<R: Read + ?Sized>(input: &mut R) -> Result<u8, CodecError> {
    let day = read_i8(input)?;
    u8::try_from(day).map_err(|_| CodecError::InvalidField {
        field: "day of month",
        value: i64::from(day),
    })
}

// ---------------------------------------------------------------------------
// Shared tail
// ---------------------------------------------------------------------------

struct RuleTail {
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

fn write_tail<W: Write + ?Sized>(out: &mut W, rule: &DaylightSavingRule) -> Result<(), CodecError> {
    // time_of_day <= 86400, so the shift stays far below i32::MAX.
    let packed = ((rule.time_of_day() as i32) << 8) | i32::from(rule.indicator().ordinal());

    match rule.savings() {
        0 => write_i32(out, packed | SAVINGS_ZERO_BIT)?,
        3600 => write_i32(out, packed | SAVINGS_ONE_HOUR_BIT)?,
        savings => {
            write_i32(out, packed)?;
            write_offset(out, savings)?;
        }
    }
    Ok(())
}

fn read_tail<R: Read + ?Sized>(input: &mut R) -> Result<RuleTail, CodecError> {
    let packed = read_i32(input)?;

    let seconds = packed >> 8;
    let time_of_day = u32::try_from(seconds)
        .ok()
        .filter(|s| *s <= SECONDS_PER_DAY)
        .ok_or(CodecError::InvalidField {
            field: "time of day",
            value: i64::from(seconds),
        })?;

    let ordinal = packed & INDICATOR_MASK;
    let indicator = OffsetIndicator::from_ordinal(ordinal as u8).ok_or(CodecError::InvalidField {
        field: "offset indicator",
        value: i64::from(ordinal),
    })?;

    let savings = if packed & SAVINGS_ZERO_BIT != 0 {
        0
    } else if packed & SAVINGS_ONE_HOUR_BIT != 0 {
        3600
    } else {
        read_offset(input)?
    };

    Ok(RuleTail {
        time_of_day,
        indicator,
        savings,
    })
}
