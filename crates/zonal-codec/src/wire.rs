//! # Wire Constants
//!
//! Every magic number of the binary format lives here. These values are part
//! of the persisted format: changing any of them makes existing data
//! unreadable.

use zonal_core::{ModelKind, RuleKind};

// Type tags are owned by the model types.
pub use zonal_core::model::{
    ARRAY_TRANSITION_MODEL_TYPE, COMPOSITE_TRANSITION_MODEL_TYPE, RULE_BASED_TRANSITION_MODEL_TYPE,
};
pub use zonal_core::rule::{
    DAY_OF_WEEK_IN_MONTH_PATTERN_TYPE, FIXED_DAY_PATTERN_TYPE, LAST_DAY_OF_WEEK_PATTERN_TYPE,
};

/// 1825-01-01T00:00:00Z, the origin of every epoch-relative counter.
pub const POSIX_TIME_1825: i64 = -4_575_744_000;

/// Seconds covered by the 18-bit day index (718 years of 365 days,
/// up to 2542-07-11).
pub const DAYS_IN_18_BITS: i64 = 86_400 * 365 * 718;

/// Seconds covered by the 24-bit quarter-hour index. The largest index stays
/// below `0xFF0000`, so a leading `0xFF` byte is free to mark the escape.
pub const QUARTERS_IN_24_BITS: i64 = 15_040_511_099;

/// Offsets and quarter-hour instants are quantized to this many seconds.
pub const QUARTER_HOUR: i32 = 900;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Escape byte announcing a full `i32` offset.
pub const OFFSET_ESCAPE: i8 = 127;

/// Escape byte announcing a full `i64` instant in the quarter-hour form.
pub const INSTANT_ESCAPE: u8 = 0xFF;

/// Shift applied to local standard time before matching the time-of-day
/// shortcuts, so late-evening and early-morning transitions share one day.
pub const LOCAL_TIME_SHIFT: i64 = 3600;

/// Second-of-day values reachable through the 3-bit time shortcut.
/// Index `i` is stored as `i + 1`; `0` means no shortcut.
pub const TIME_SHORTCUTS: [i64; 7] = [0, 60, 3600, 7200, 10_800, 14_400, 18_000];

/// Daylight saving offsets reachable through the 2-bit shortcut.
/// Index `i` is stored as `i + 1`; `0` means an explicit offset follows.
pub const DST_SHORTCUTS: [i32; 3] = [0, 3600, 7200];

/// Shortcut value meaning "not compressed".
pub const NO_COMPRESSION: u8 = 0;

/// Flag bit: the standard offset changed with this transition.
pub const NEW_STANDARD_OFFSET_BIT: u8 = 0x80;

/// Rule tail bit: savings are zero.
pub const SAVINGS_ZERO_BIT: i32 = 8;
/// Rule tail bit: savings are one hour.
pub const SAVINGS_ONE_HOUR_BIT: i32 = 16;

/// Upper bound of the one-byte rule count.
pub const MAX_RULE_COUNT: usize = u8::MAX as usize;

/// Object shape selected by a type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Rule(RuleKind),
    Model(ModelKind),
}

impl WireType {
    pub const fn tag(self) -> u8 {
        match self {
            Self::Rule(kind) => kind.type_tag(),
            Self::Model(kind) => kind.type_tag(),
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            FIXED_DAY_PATTERN_TYPE => Some(Self::Rule(RuleKind::FixedDay)),
            DAY_OF_WEEK_IN_MONTH_PATTERN_TYPE => Some(Self::Rule(RuleKind::DayOfWeekInMonth)),
            LAST_DAY_OF_WEEK_PATTERN_TYPE => Some(Self::Rule(RuleKind::LastDayOfWeek)),
            RULE_BASED_TRANSITION_MODEL_TYPE => Some(Self::Model(ModelKind::RuleBased)),
            ARRAY_TRANSITION_MODEL_TYPE => Some(Self::Model(ModelKind::Array)),
            COMPOSITE_TRANSITION_MODEL_TYPE => Some(Self::Model(ModelKind::Composite)),
            _ => None,
        }
    }
}
