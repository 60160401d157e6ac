//! # zonal-codec — Binary Wire Format for Zone Transition History
//!
//! Serializes the models of `zonal-core` into a compact, bit-packed,
//! big-endian byte stream and reads them back.
//!
//! ## Layers
//!
//! - [`primitive`]: quarter-hour offsets and instants with escape paths.
//! - `transition`: delta compression of one transition against the running
//!   standard offset.
//! - `rule`: bodies of the three daylight saving rule patterns.
//! - [`list`]: counted transition and rule lists.
//! - [`envelope`]: the type byte selecting one of six object shapes.
//!
//! ## Key Design Principles
//!
//! 1. **Exhaustive dispatch.** Type tags map to a closed [`WireType`] enum; an
//!    unknown tag can only arise on decode.
//!
//! 2. **Explicit accumulators.** The running standard offset of a transition
//!    list lives in a per-call encoder or decoder value. There is no shared
//!    state between calls.
//!
//! 3. **Strict decoding.** Lists must be strictly ascending, counts are
//!    bounded by [`DecodeLimits`] before allocation, and decoded models go
//!    through the validating constructors of `zonal-core`.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests, including on hostile input.
//! - The byte layout is frozen; the constants in [`wire`] are part of it.

pub mod config;
pub mod envelope;
pub mod list;
pub mod primitive;
mod rule;
mod transition;
pub mod wire;

pub use config::{ConfigError, DecodeLimits, DEFAULT_MAX_TRANSITIONS};
pub use envelope::{
    decode_model, decode_rule, encode_model, encode_rule, read_object, write_object, Decoder,
    ZoneObject,
};
pub use list::{read_rules, read_transitions, write_rules, write_transitions};
pub use primitive::{read_offset, read_quarter_instant, write_offset, write_quarter_instant};
pub use wire::WireType;

// Errors are defined next to the model types.
pub use zonal_core::CodecError;
