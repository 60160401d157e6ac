//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout zonal. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Model errors are raised by the validating constructors and carry the
//!   offending value, so a caller building models from external data can
//!   report exactly which field is wrong.
//! - Codec errors separate three classes a caller reacts to differently:
//!   unknown type tags (version mismatch or garbage), order violations
//!   (corruption or tampering) and I/O failures (transport), which pass
//!   through unchanged.
//! - Non-aligned offsets and out-of-range instants are not errors. The wire
//!   format has escape paths for both.

use thiserror::Error;

/// Invariant violation detected while constructing a rule or a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Month number outside `1..=12`.
    #[error("invalid month: {0}")]
    InvalidMonth(u32),

    /// Day of week number outside `1..=7` (ISO, Monday = 1).
    #[error("invalid day of week: {0}")]
    InvalidDayOfWeek(u32),

    /// Day of month that does not exist in the given month of a leap year.
    #[error("invalid day of month {day} for month {month}")]
    InvalidDayOfMonth {
        /// Month number (1-based).
        month: u32,
        /// Rejected day of month.
        day: u32,
    },

    /// Time of day beyond 24:00.
    #[error("time of day out of range: {0} seconds (max 86400)")]
    InvalidTimeOfDay(u32),

    /// A model that stores transitions was given none.
    #[error("transition model requires at least one transition")]
    MissingTransitions,

    /// A model that stores rules was given none.
    #[error("transition model requires at least one daylight saving rule")]
    MissingRules,

    /// More rules than the wire format can count in one byte.
    #[error("too many daylight saving rules: {count} (max {max})")]
    TooManyRules {
        /// Number of rules supplied.
        count: usize,
        /// Upper bound.
        max: usize,
    },

    /// Transition instants are not strictly ascending.
    #[error("transition {index} at {posix_time} does not follow {previous}")]
    UnorderedTransitions {
        /// Index of the offending transition.
        index: usize,
        /// Its instant.
        posix_time: i64,
        /// Instant of the preceding transition.
        previous: i64,
    },

    /// A transition's previous offset differs from the prior total offset.
    #[error("transition {index} starts from offset {actual}, expected {expected}")]
    BrokenOffsetChain {
        /// Index of the offending transition.
        index: usize,
        /// Total offset of the preceding transition.
        expected: i32,
        /// Previous offset recorded on the transition.
        actual: i32,
    },

    /// Total minus daylight saving offset does not fit in an `i32`.
    #[error(
        "transition {index}: standard offset of total {total} minus daylight saving {daylight_saving} overflows"
    )]
    StandardOffsetOverflow {
        /// Index of the offending transition.
        index: usize,
        /// Total offset of the transition.
        total: i32,
        /// Daylight saving offset of the transition.
        daylight_saving: i32,
    },

    /// Daylight saving rules are not strictly ascending.
    #[error("daylight saving rule {index} is not ordered after its predecessor")]
    UnorderedRules {
        /// Index of the offending rule.
        index: usize,
    },
}

/// Error raised while encoding or decoding the binary wire format.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Type tag outside the recognized set.
    #[error("unknown serialized type: {tag}")]
    UnknownType {
        /// The tag byte as read.
        tag: u8,
    },

    /// A list in the stream is not strictly ascending.
    #[error("corrupted stream: {what} {index} is out of order")]
    OrderViolation {
        /// Which list was being decoded (`"transition"` or `"rule"`).
        what: &'static str,
        /// Index of the first out-of-order entry.
        index: usize,
    },

    /// Underlying read or write failed, including a truncated stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A field decoded to a value outside its domain.
    #[error("invalid {field} in stream: {value}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Raw value read.
        value: i64,
    },

    /// A decoded count exceeds the configured decode limit.
    #[error("{what} count {count} exceeds limit {limit}")]
    LimitExceeded {
        /// What was being counted.
        what: &'static str,
        /// Count announced by the stream.
        count: u64,
        /// Configured upper bound.
        limit: u64,
    },

    /// A list holds more entries than its count field can express.
    #[error("cannot encode {count} {what} entries (max {max})")]
    TooManyEntries {
        /// Which list.
        what: &'static str,
        /// Number of entries.
        count: usize,
        /// Upper bound of the count field.
        max: usize,
    },

    /// Input continues after a complete object.
    #[error("{remaining} trailing bytes after decoded object")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },

    /// The envelope holds a different kind of object than requested.
    #[error("expected a {expected}, found type {tag}")]
    UnexpectedKind {
        /// Kind the caller asked for.
        expected: &'static str,
        /// Tag actually found.
        tag: u8,
    },

    /// Decoded parts do not form a valid model.
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}

impl CodecError {
    /// Whether the error signals a damaged stream rather than a transport
    /// failure. Unknown tags, order violations and out-of-domain fields all
    /// count as malformed input.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::TooManyEntries { .. })
    }
}
