//! # Collection Codecs
//!
//! Transition lists and rule lists, as embedded in model payloads. Both are
//! public so loaders can persist bare lists outside an envelope.
//!
//! ```text
//! transitions  [count: i32][initialOffset, if count > 0][entry]*
//! rules        [count: u8][tag][body]*
//! ```
//!
//! Lists are built completely before they are returned; an error at any
//! entry discards everything read so far.

use std::cmp::Ordering;
use std::io::{Read, Write};

use zonal_core::{compare_schedule, CodecError, DaylightSavingRule, ZonalTransition};

use crate::config::{DecodeLimits, MAX_PREALLOCATION};
use crate::primitive::{read_i32, read_offset, read_u8, write_i32, write_offset, write_u8};
use crate::rule::{read_rule, write_rule};
use crate::transition::{TransitionDecoder, TransitionEncoder};
use crate::wire::{WireType, MAX_RULE_COUNT};

/// Write a transition list.
///
/// The first transition's previous offset seeds the running standard offset.
pub fn write_transitions<W: Write + ?Sized>(
    out: &mut W,
    transitions: &[ZonalTransition],
) -> Result<(), CodecError> {
    let count = i32::try_from(transitions.len()).map_err(|_| CodecError::TooManyEntries {
        what: "transition",
        count: transitions.len(),
        max: i32::MAX as usize,
    })?;
    write_i32(out, count)?;

    let Some(first) = transitions.first() else {
        return Ok(());
    };
    let initial = first.previous_offset();
    write_offset(out, initial)?;

    let mut encoder = TransitionEncoder::new(initial);
    for transition in transitions {
        encoder.write(out, transition)?;
    }
    Ok(())
}

/// Read a transition list, rejecting counts beyond `limits`.
pub fn read_transitions<R: Read + ?Sized>(
    input: &mut R,
    limits: &DecodeLimits,
) -> Result<Vec<ZonalTransition>, CodecError> {
    let count = read_i32(input)?;
    let count = u32::try_from(count).map_err(|_| {
        tracing::warn!(count, "rejected stream: negative transition count");
        CodecError::InvalidField {
            field: "transition count",
            value: i64::from(count),
        }
    })?;
    if count > limits.max_transitions {
        tracing::warn!(
            count,
            limit = limits.max_transitions,
            "rejected stream: transition count over limit"
        );
        return Err(CodecError::LimitExceeded {
            what: "transition",
            count: u64::from(count),
            limit: u64::from(limits.max_transitions),
        });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let count = count as usize;
    let initial = read_offset(input)?;
    let mut decoder = TransitionDecoder::new(initial);
    let mut transitions = Vec::with_capacity(count.min(MAX_PREALLOCATION));
    for _ in 0..count {
        transitions.push(decoder.read(input)?);
    }

    tracing::debug!(count, initial_offset = initial, "decoded transition list");
    Ok(transitions)
}

/// Write a rule list. Fails when there are more rules than one byte counts.
pub fn write_rules<W: Write + ?Sized>(out: &mut W, rules: &[DaylightSavingRule]) -> Result<(), CodecError> {
    let count = u8::try_from(rules.len()).map_err(|_| CodecError::TooManyEntries {
        what: "rule",
        count: rules.len(),
        max: MAX_RULE_COUNT,
    })?;
    write_u8(out, count)?;

    for rule in rules {
        write_u8(out, rule.type_tag())?;
        write_rule(out, rule)?;
    }
    Ok(())
}

/// Read a rule list, rejecting non-rule tags and rules out of schedule order.
pub fn read_rules<R: Read + ?Sized>(input: &mut R) -> Result<Vec<DaylightSavingRule>, CodecError> {
    let count = usize::from(read_u8(input)?);
    let mut rules: Vec<DaylightSavingRule> = Vec::with_capacity(count);

    for index in 0..count {
        let tag = read_u8(input)?;
        let Some(WireType::Rule(kind)) = WireType::from_tag(tag) else {
            tracing::warn!(tag, index, "rejected stream: unknown rule type");
            return Err(CodecError::UnknownType { tag });
        };
        let rule = read_rule(input, kind)?;

        if let Some(previous) = rules.last() {
            if compare_schedule(previous, &rule) != Ordering::Less {
                tracing::warn!(index, "rejected stream: rules out of order");
                return Err(CodecError::OrderViolation { what: "rule", index });
            }
        }
        rules.push(rule);
    }

    tracing::debug!(count, "decoded rule list");
    Ok(rules)
}
