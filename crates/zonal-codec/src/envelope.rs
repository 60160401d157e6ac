//! # Envelope — Tagged Object Dispatch
//!
//! Every serialized object starts with one type byte selecting its shape:
//!
//! | Tag | Object |
//! |-----|--------|
//! | 120 | fixed-day rule |
//! | 121 | day-of-week-in-month rule |
//! | 122 | last-day-of-week rule |
//! | 125 | rule-based model |
//! | 126 | array model |
//! | 127 | composite model |
//!
//! Model payloads:
//!
//! ```text
//! rule-based  [initial instant (quarter form)][previous][total][dst][rule list]
//! array       [transition list]
//! composite   [transition list][rule list]
//! ```
//!
//! Decoding rebuilds models through their validating constructors, so a
//! decoded model satisfies the same invariants as one built in memory.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use zonal_core::{
    ArrayTransitionModel, CodecError, CompositeTransitionModel, DaylightSavingRule, ModelKind,
    RuleBasedTransitionModel, TransitionModel, ZonalTransition,
};

use crate::config::DecodeLimits;
use crate::list::{read_rules, read_transitions, write_rules, write_transitions};
use crate::primitive::{read_offset, read_quarter_instant, read_u8, write_offset, write_quarter_instant, write_u8};
use crate::rule::{read_rule, write_rule};
use crate::wire::WireType;

/// Any object the envelope can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneObject {
    Rule(DaylightSavingRule),
    Model(TransitionModel),
}

impl ZoneObject {
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Rule(rule) => WireType::Rule(rule.kind()),
            Self::Model(model) => WireType::Model(model.kind()),
        }
    }

    /// Type byte written in front of the payload.
    pub fn type_tag(&self) -> u8 {
        self.wire_type().tag()
    }
}

impl From<DaylightSavingRule> for ZoneObject {
    fn from(rule: DaylightSavingRule) -> Self {
        Self::Rule(rule)
    }
}

impl From<TransitionModel> for ZoneObject {
    fn from(model: TransitionModel) -> Self {
        Self::Model(model)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Write `object` as type byte plus payload.
pub fn write_object<W: Write + ?Sized>(out: &mut W, object: &ZoneObject) -> Result<(), CodecError> {
    write_u8(out, object.type_tag())?;
    match object {
        ZoneObject::Rule(rule) => write_rule(out, rule),
        ZoneObject::Model(model) => write_model_payload(out, model),
    }
}

fn write_model_payload<W: Write + ?Sized>(out: &mut W, model: &TransitionModel) -> Result<(), CodecError> {
    match model {
        TransitionModel::RuleBased(m) => {
            let initial = m.initial_transition();
            write_quarter_instant(out, initial.posix_time())?;
            write_offset(out, initial.previous_offset())?;
            write_offset(out, initial.total_offset())?;
            write_offset(out, initial.daylight_saving_offset())?;
            write_rules(out, m.rules())
        }
        TransitionModel::Array(m) => write_transitions(out, m.transitions()),
        TransitionModel::Composite(m) => {
            write_transitions(out, m.transitions())?;
            write_rules(out, m.rules())
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Reads envelopes under a set of [`DecodeLimits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    limits: DecodeLimits,
}

impl Decoder {
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Read one object of any kind.
    pub fn read_object<R: Read + ?Sized>(&self, input: &mut R) -> Result<ZoneObject, CodecError> {
        let tag = read_u8(input)?;
        let Some(wire) = WireType::from_tag(tag) else {
            tracing::warn!(tag, "rejected stream: unknown serialized type");
            return Err(CodecError::UnknownType { tag });
        };

        let object = match wire {
            WireType::Rule(kind) => ZoneObject::Rule(read_rule(input, kind)?),
            WireType::Model(kind) => ZoneObject::Model(self.read_model_payload(input, kind)?),
        };

        let (transitions, rules) = match &object {
            ZoneObject::Model(model) => (model.transitions().len(), model.rules().len()),
            ZoneObject::Rule(_) => (0, 1),
        };
        tracing::debug!(tag, transitions, rules, "decoded object");
        Ok(object)
    }

    /// Read one object that must be a transition model.
    pub fn read_model<R: Read + ?Sized>(&self, input: &mut R) -> Result<TransitionModel, CodecError> {
        match self.read_object(input)? {
            ZoneObject::Model(model) => Ok(model),
            other => Err(CodecError::UnexpectedKind {
                expected: "transition model",
                tag: other.type_tag(),
            }),
        }
    }

    /// Read one object that must be a daylight saving rule.
    pub fn read_rule<R: Read + ?Sized>(&self, input: &mut R) -> Result<DaylightSavingRule, CodecError> {
        match self.read_object(input)? {
            ZoneObject::Rule(rule) => Ok(rule),
            other => Err(CodecError::UnexpectedKind {
                expected: "daylight saving rule",
                tag: other.type_tag(),
            }),
        }
    }

    /// Decode an object of any kind occupying all of `bytes`.
    pub fn decode_object(&self, bytes: &[u8]) -> Result<ZoneObject, CodecError> {
        let mut input = bytes;
        let object = self.read_object(&mut input)?;
        ensure_consumed(input)?;
        Ok(object)
    }

    /// Decode a model occupying all of `bytes`.
    pub fn decode_model(&self, bytes: &[u8]) -> Result<TransitionModel, CodecError> {
        let mut input = bytes;
        let model = self.read_model(&mut input)?;
        ensure_consumed(input)?;
        Ok(model)
    }

    /// Decode a rule occupying all of `bytes`.
    pub fn decode_rule(&self, bytes: &[u8]) -> Result<DaylightSavingRule, CodecError> {
        let mut input = bytes;
        let rule = self.read_rule(&mut input)?;
        ensure_consumed(input)?;
        Ok(rule)
    }

    fn read_model_payload<R: Read + ?Sized>(
        &self,
        input: &mut R,
        kind: ModelKind,
    ) -> Result<TransitionModel, CodecError> {
        let model: TransitionModel = match kind {
            ModelKind::RuleBased => {
                let posix_time = read_quarter_instant(input)?;
                let previous = read_offset(input)?;
                let total = read_offset(input)?;
                let dst = read_offset(input)?;
                let initial = ZonalTransition::new(posix_time, previous, total, dst);
                RuleBasedTransitionModel::new(initial, read_rules(input)?)?.into()
            }
            ModelKind::Array => {
                ArrayTransitionModel::new(read_transitions(input, &self.limits)?)?.into()
            }
            ModelKind::Composite => {
                let transitions = read_transitions(input, &self.limits)?;
                CompositeTransitionModel::new(transitions, read_rules(input)?)?.into()
            }
        };
        Ok(model)
    }
}

fn ensure_consumed(rest: &[u8]) -> Result<(), CodecError> {
    if rest.is_empty() {
        Ok(())
    } else {
        tracing::warn!(remaining = rest.len(), "rejected stream: trailing bytes");
        Err(CodecError::TrailingBytes {
            remaining: rest.len(),
        })
    }
}

/// Read one object with default limits.
pub fn read_object<R: Read + ?Sized>(input: &mut R) -> Result<ZoneObject, CodecError> {
    Decoder::default().read_object(input)
}

// ---------------------------------------------------------------------------
// Byte-buffer conveniences
// ---------------------------------------------------------------------------

/// Serialize a model into a fresh buffer.
pub fn encode_model(model: &TransitionModel) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_u8(&mut out, model.type_tag())?;
    write_model_payload(&mut out, model)?;
    Ok(out)
}

/// Deserialize a model from exactly `bytes`, with default limits.
pub fn decode_model(bytes: &[u8]) -> Result<TransitionModel, CodecError> {
    Decoder::default().decode_model(bytes)
}

/// Serialize a rule into a fresh buffer.
pub fn encode_rule(rule: &DaylightSavingRule) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_u8(&mut out, rule.type_tag())?;
    write_rule(&mut out, rule)?;
    Ok(out)
}

/// Deserialize a rule from exactly `bytes`.
pub fn decode_rule(bytes: &[u8]) -> Result<DaylightSavingRule, CodecError> {
    Decoder::default().decode_rule(bytes)
}
