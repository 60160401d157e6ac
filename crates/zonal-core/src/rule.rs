//! # Daylight Saving Rules — Annual Recurrence Patterns
//!
//! A daylight saving rule describes one offset change that recurs every year:
//! on which day, at which time of day, measured in which time scale, and
//! how many seconds of daylight saving apply from then on.
//!
//! Three patterns cover the tz database:
//!
//! | Pattern | tz notation | Example |
//! |---------|-------------|---------|
//! | [`FixedDayPattern`] | `Mar 1` | March 1st |
//! | [`DayOfWeekInMonthPattern`] | `Sun>=8`, `Sun<=25` | second Sunday in March |
//! | [`LastDayOfWeekPattern`] | `lastSun` | last Sunday in October |
//!
//! [`DaylightSavingRule`] is the closed sum over the three. Consumers match
//! on it; there is no open extension point.
//!
//! ## Ordering
//!
//! Rules of one model are kept in strictly ascending order of
//! [`compare_schedule`]: the date the rule selects in the leap reference
//! year 2000, then the time of day. Two rules that compare equal would fire
//! at the same moment and are rejected as duplicates.

use std::cmp::Ordering;

use chrono::{Datelike, Days, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Seconds in a civil day; also the largest accepted time of day (24:00).
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Leap year used to order rules independently of any concrete year.
pub const REFERENCE_YEAR: i32 = 2000;

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Time scale in which a rule's time of day is expressed.
///
/// The ordinal is part of the wire format and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetIndicator {
    /// Universal time.
    UtcTime,
    /// Local standard time, ignoring daylight saving.
    StandardTime,
    /// Local wall-clock time, including the daylight saving in force before
    /// the transition.
    WallTime,
}

impl OffsetIndicator {
    /// Wire ordinal (`0..=2`).
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::UtcTime => 0,
            Self::StandardTime => 1,
            Self::WallTime => 2,
        }
    }

    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::UtcTime),
            1 => Some(Self::StandardTime),
            2 => Some(Self::WallTime),
            _ => None,
        }
    }

    /// Seconds by which local time in this scale is ahead of UTC.
    pub const fn shift(self, standard_offset: i32, daylight_saving: i32) -> i64 {
        match self {
            Self::UtcTime => 0,
            Self::StandardTime => standard_offset as i64,
            Self::WallTime => standard_offset as i64 + daylight_saving as i64,
        }
    }
}

/// Serialized type tag of a fixed-day rule.
pub const FIXED_DAY_PATTERN_TYPE: u8 = 120;
/// Serialized type tag of a day-of-week-in-month rule.
pub const DAY_OF_WEEK_IN_MONTH_PATTERN_TYPE: u8 = 121;
/// Serialized type tag of a last-day-of-week rule.
pub const LAST_DAY_OF_WEEK_PATTERN_TYPE: u8 = 122;

/// Which of the three rule patterns a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    FixedDay,
    DayOfWeekInMonth,
    LastDayOfWeek,
}

impl RuleKind {
    /// Type tag selecting this pattern on the wire.
    pub const fn type_tag(self) -> u8 {
        match self {
            Self::FixedDay => FIXED_DAY_PATTERN_TYPE,
            Self::DayOfWeekInMonth => DAY_OF_WEEK_IN_MONTH_PATTERN_TYPE,
            Self::LastDayOfWeek => LAST_DAY_OF_WEEK_PATTERN_TYPE,
        }
    }
}

/// Parse a 1-based month number.
pub fn month_from_number(number: u32) -> Result<Month, ModelError> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .ok_or(ModelError::InvalidMonth(number))
}

/// Parse an ISO day-of-week number (Monday = 1, Sunday = 7).
pub fn weekday_from_number(number: u32) -> Result<Weekday, ModelError> {
    match number {
        1..=7 => u8::try_from(number - 1)
            .ok()
            .and_then(|n| Weekday::try_from(n).ok())
            .ok_or(ModelError::InvalidDayOfWeek(number)),
        _ => Err(ModelError::InvalidDayOfWeek(number)),
    }
}

fn days_in_month(year: i32, month: Month) -> u32 {
    match month {
        Month::February => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

fn check_day_of_month(month: Month, day: u8) -> Result<(), ModelError> {
    if day == 0 || u32::from(day) > days_in_month(REFERENCE_YEAR, month) {
        return Err(ModelError::InvalidDayOfMonth {
            month: month.number_from_month(),
            day: u32::from(day),
        });
    }
    Ok(())
}

fn check_time_of_day(time_of_day: u32) -> Result<(), ModelError> {
    if time_of_day > SECONDS_PER_DAY {
        return Err(ModelError::InvalidTimeOfDay(time_of_day));
    }
    Ok(())
}

/// Day of `month` in `year`, clamped to the month length.
fn clamped_date(year: i32, month: Month, day: u8) -> Option<NaiveDate> {
    let day = u32::from(day).min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
}

fn weekday_distance(from: Weekday, to: Weekday) -> u64 {
    let from = i64::from(from.num_days_from_monday());
    let to = i64::from(to.num_days_from_monday());
    (to - from).rem_euclid(7) as u64
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Rule firing on a fixed day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FixedDayFields")]
pub struct FixedDayPattern {
    month: Month,
    day_of_month: u8,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

#[derive(Deserialize)]
struct FixedDayFields {
    month: Month,
    day_of_month: u8,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

impl TryFrom<FixedDayFields> for FixedDayPattern {
    type Error = ModelError;

    fn try_from(f: FixedDayFields) -> Result<Self, Self::Error> {
        Self::new(f.month, f.day_of_month, f.time_of_day, f.indicator, f.savings)
    }
}

impl FixedDayPattern {
    /// February 29 is accepted and falls back to February 28 in common years.
    pub fn new(
        month: Month,
        day_of_month: u8,
        time_of_day: u32,
        indicator: OffsetIndicator,
        savings: i32,
    ) -> Result<Self, ModelError> {
        check_day_of_month(month, day_of_month)?;
        check_time_of_day(time_of_day)?;
        Ok(Self {
            month,
            day_of_month,
            time_of_day,
            indicator,
            savings,
        })
    }

    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    fn date_in(&self, year: i32) -> Option<NaiveDate> {
        clamped_date(year, self.month, self.day_of_month)
    }
}

/// Rule firing on the first given weekday on or after a day of the month
/// (`Sun>=8`), or the last one on or before it (`Sun<=25`). The result may
/// fall into the neighbouring month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DayOfWeekInMonthFields")]
pub struct DayOfWeekInMonthPattern {
    month: Month,
    day_of_month: u8,
    day_of_week: Weekday,
    after: bool,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

#[derive(Deserialize)]
struct DayOfWeekInMonthFields {
    month: Month,
    day_of_month: u8,
    day_of_week: Weekday,
    after: bool,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

impl TryFrom<DayOfWeekInMonthFields> for DayOfWeekInMonthPattern {
    type Error = ModelError;

    fn try_from(f: DayOfWeekInMonthFields) -> Result<Self, Self::Error> {
        Self::new(
            f.month,
            f.day_of_month,
            f.day_of_week,
            f.after,
            f.time_of_day,
            f.indicator,
            f.savings,
        )
    }
}

impl DayOfWeekInMonthPattern {
    pub fn new(
        month: Month,
        day_of_month: u8,
        day_of_week: Weekday,
        after: bool,
        time_of_day: u32,
        indicator: OffsetIndicator,
        savings: i32,
    ) -> Result<Self, ModelError> {
        check_day_of_month(month, day_of_month)?;
        check_time_of_day(time_of_day)?;
        Ok(Self {
            month,
            day_of_month,
            day_of_week,
            after,
            time_of_day,
            indicator,
            savings,
        })
    }

    /// Anchor day the weekday is searched from.
    pub fn day_of_month(&self) -> u8 {
        self.day_of_month
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// `true` searches forward from the anchor, `false` backward.
    pub fn is_after(&self) -> bool {
        self.after
    }

    fn date_in(&self, year: i32) -> Option<NaiveDate> {
        let anchor = clamped_date(year, self.month, self.day_of_month)?;
        if self.after {
            anchor.checked_add_days(Days::new(weekday_distance(
                anchor.weekday(),
                self.day_of_week,
            )))
        } else {
            anchor.checked_sub_days(Days::new(weekday_distance(
                self.day_of_week,
                anchor.weekday(),
            )))
        }
    }
}

/// Rule firing on the last given weekday of a month (`lastSun`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LastDayOfWeekFields")]
pub struct LastDayOfWeekPattern {
    month: Month,
    day_of_week: Weekday,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

#[derive(Deserialize)]
struct LastDayOfWeekFields {
    month: Month,
    day_of_week: Weekday,
    time_of_day: u32,
    indicator: OffsetIndicator,
    savings: i32,
}

impl TryFrom<LastDayOfWeekFields> for LastDayOfWeekPattern {
    type Error = ModelError;

    fn try_from(f: LastDayOfWeekFields) -> Result<Self, Self::Error> {
        Self::new(f.month, f.day_of_week, f.time_of_day, f.indicator, f.savings)
    }
}

impl LastDayOfWeekPattern {
    pub fn new(
        month: Month,
        day_of_week: Weekday,
        time_of_day: u32,
        indicator: OffsetIndicator,
        savings: i32,
    ) -> Result<Self, ModelError> {
        check_time_of_day(time_of_day)?;
        Ok(Self {
            month,
            day_of_week,
            time_of_day,
            indicator,
            savings,
        })
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    fn date_in(&self, year: i32) -> Option<NaiveDate> {
        let last = clamped_date(year, self.month, 31)?;
        last.checked_sub_days(Days::new(weekday_distance(
            self.day_of_week,
            last.weekday(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Sum type
// ---------------------------------------------------------------------------

/// A daylight saving rule of one of the three patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum DaylightSavingRule {
    FixedDay(FixedDayPattern),
    DayOfWeekInMonth(DayOfWeekInMonthPattern),
    LastDayOfWeek(LastDayOfWeekPattern),
}

impl DaylightSavingRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::FixedDay(_) => RuleKind::FixedDay,
            Self::DayOfWeekInMonth(_) => RuleKind::DayOfWeekInMonth,
            Self::LastDayOfWeek(_) => RuleKind::LastDayOfWeek,
        }
    }

    pub fn type_tag(&self) -> u8 {
        self.kind().type_tag()
    }

    pub fn month(&self) -> Month {
        match self {
            Self::FixedDay(p) => p.month,
            Self::DayOfWeekInMonth(p) => p.month,
            Self::LastDayOfWeek(p) => p.month,
        }
    }

    /// Seconds after local midnight, `0..=86400`.
    pub fn time_of_day(&self) -> u32 {
        match self {
            Self::FixedDay(p) => p.time_of_day,
            Self::DayOfWeekInMonth(p) => p.time_of_day,
            Self::LastDayOfWeek(p) => p.time_of_day,
        }
    }

    pub fn indicator(&self) -> OffsetIndicator {
        match self {
            Self::FixedDay(p) => p.indicator,
            Self::DayOfWeekInMonth(p) => p.indicator,
            Self::LastDayOfWeek(p) => p.indicator,
        }
    }

    /// Daylight saving amount in force after the rule fires.
    pub fn savings(&self) -> i32 {
        match self {
            Self::FixedDay(p) => p.savings,
            Self::DayOfWeekInMonth(p) => p.savings,
            Self::LastDayOfWeek(p) => p.savings,
        }
    }

    /// Calendar date selected in `year`, or `None` outside chrono's range.
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::FixedDay(p) => p.date_in(year),
            Self::DayOfWeekInMonth(p) => p.date_in(year),
            Self::LastDayOfWeek(p) => p.date_in(year),
        }
    }

    /// UTC instant at which the rule fires in `year`.
    ///
    /// `previous_savings` is the daylight saving in force just before, needed
    /// when the time of day is wall-clock time.
    pub fn transition_time(
        &self,
        year: i32,
        standard_offset: i32,
        previous_savings: i32,
    ) -> Option<i64> {
        let date = self.date_in(year)?;
        let days = i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
        let local = days * i64::from(SECONDS_PER_DAY) + i64::from(self.time_of_day());
        Some(local - self.indicator().shift(standard_offset, previous_savings))
    }
}

impl From<FixedDayPattern> for DaylightSavingRule {
    fn from(p: FixedDayPattern) -> Self {
        Self::FixedDay(p)
    }
}

impl From<DayOfWeekInMonthPattern> for DaylightSavingRule {
    fn from(p: DayOfWeekInMonthPattern) -> Self {
        Self::DayOfWeekInMonth(p)
    }
}

impl From<LastDayOfWeekPattern> for DaylightSavingRule {
    fn from(p: LastDayOfWeekPattern) -> Self {
        Self::LastDayOfWeek(p)
    }
}

/// Total order of rules within one model: date in [`REFERENCE_YEAR`], then
/// time of day.
pub fn compare_schedule(a: &DaylightSavingRule, b: &DaylightSavingRule) -> Ordering {
    a.date_in(REFERENCE_YEAR)
        .cmp(&b.date_in(REFERENCE_YEAR))
        .then_with(|| a.time_of_day().cmp(&b.time_of_day()))
}

/// Verify that `rules` is non-empty, within `max` entries and strictly
/// ascending under [`compare_schedule`].
pub fn check_rules(rules: &[DaylightSavingRule], max: usize) -> Result<(), ModelError> {
    if rules.is_empty() {
        return Err(ModelError::MissingRules);
    }
    if rules.len() > max {
        return Err(ModelError::TooManyRules {
            count: rules.len(),
            max,
        });
    }
    for (index, pair) in rules.windows(2).enumerate() {
        if compare_schedule(&pair[0], &pair[1]) != Ordering::Less {
            return Err(ModelError::UnorderedRules { index: index + 1 });
        }
    }
    Ok(())
}
