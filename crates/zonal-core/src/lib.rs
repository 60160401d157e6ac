//! # zonal-core — Foundational Types for Zone Transition History
//!
//! This crate defines the in-memory object model of a time zone's offset
//! history. The wire codec in `zonal-codec` and the `zonal` CLI build on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed sum types.** `DaylightSavingRule` has exactly three patterns
//!    and `TransitionModel` exactly three shapes. Consumers match
//!    exhaustively; adding a shape forces every consumer to handle it.
//!
//! 2. **Validated construction.** Rules and models are built only through
//!    constructors that check their invariants (ascending, offset-chained
//!    transitions; ascending rules). Deserialization goes through the same
//!    constructors.
//!
//! 3. **Derived, not stored.** The standard offset of a transition is always
//!    `total - daylight_saving`; there is no second source of truth.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zonal-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public model types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod error;
pub mod model;
pub mod rule;
pub mod transition;

// Re-export primary types for ergonomic imports.
pub use error::{CodecError, ModelError};
pub use model::{
    ArrayTransitionModel, CompositeTransitionModel, ModelKind, RuleBasedTransitionModel,
    TransitionModel, MAX_RULES,
};
pub use rule::{
    compare_schedule, DayOfWeekInMonthPattern, DaylightSavingRule, FixedDayPattern,
    LastDayOfWeekPattern, OffsetIndicator, RuleKind,
};
pub use transition::ZonalTransition;

// Calendar types used in rule signatures.
pub use chrono::{Month, Weekday};
