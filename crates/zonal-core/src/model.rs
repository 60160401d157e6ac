//! # Transition Models
//!
//! The history of one zone is represented by one of three models:
//!
//! - [`RuleBasedTransitionModel`] — an initial transition plus recurrence
//!   rules; transitions are generated from the rules on demand.
//! - [`ArrayTransitionModel`] — a fixed list of historical transitions.
//! - [`CompositeTransitionModel`] — historical transitions followed by
//!   rule-generated future ones.
//!
//! [`TransitionModel`] is the closed sum over the three.
//!
//! ## Invariants
//!
//! Every model is validated at construction (and at deserialization, which
//! goes through the same constructors) and is immutable afterwards:
//!
//! - stored transitions are non-empty, strictly ascending and offset-chained;
//! - rule lists hold `1..=MAX_RULES` rules in strictly ascending schedule order.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::rule::{check_rules, DaylightSavingRule};
use crate::transition::{check_standard_offset, check_transitions, ZonalTransition};

/// Upper bound on the rules of one model.
pub const MAX_RULES: usize = 255;

/// Serialized type tag of a rule-based model.
pub const RULE_BASED_TRANSITION_MODEL_TYPE: u8 = 125;
/// Serialized type tag of an array model.
pub const ARRAY_TRANSITION_MODEL_TYPE: u8 = 126;
/// Serialized type tag of a composite model.
pub const COMPOSITE_TRANSITION_MODEL_TYPE: u8 = 127;

/// Which of the three model shapes a model uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    RuleBased,
    Array,
    Composite,
}

impl ModelKind {
    /// Type tag selecting this shape on the wire.
    pub const fn type_tag(self) -> u8 {
        match self {
            Self::RuleBased => RULE_BASED_TRANSITION_MODEL_TYPE,
            Self::Array => ARRAY_TRANSITION_MODEL_TYPE,
            Self::Composite => COMPOSITE_TRANSITION_MODEL_TYPE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule-based",
            Self::Array => "array",
            Self::Composite => "composite",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule-based
// ---------------------------------------------------------------------------

/// Offset regime described by an initial transition and annual rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleBasedFields")]
pub struct RuleBasedTransitionModel {
    initial: ZonalTransition,
    rules: Vec<DaylightSavingRule>,
}

#[derive(Deserialize)]
struct RuleBasedFields {
    initial: ZonalTransition,
    rules: Vec<DaylightSavingRule>,
}

impl TryFrom<RuleBasedFields> for RuleBasedTransitionModel {
    type Error = ModelError;

    fn try_from(f: RuleBasedFields) -> Result<Self, Self::Error> {
        Self::new(f.initial, f.rules)
    }
}

impl RuleBasedTransitionModel {
    pub fn new(
        initial: ZonalTransition,
        rules: Vec<DaylightSavingRule>,
    ) -> Result<Self, ModelError> {
        check_standard_offset(0, &initial)?;
        check_rules(&rules, MAX_RULES)?;
        Ok(Self { initial, rules })
    }

    /// Offset regime in force before any rule applies.
    pub fn initial_transition(&self) -> &ZonalTransition {
        &self.initial
    }

    pub fn rules(&self) -> &[DaylightSavingRule] {
        &self.rules
    }

    /// Transitions the rules generate in `year`, in rule order.
    ///
    /// The standard offset is that of the initial transition. The year starts
    /// with the savings of the last rule, since the rules repeat annually.
    /// Rules that would not change the offset and instants not after the
    /// initial transition are skipped, as are transitions whose total offset
    /// does not fit in an `i32`.
    pub fn transitions_in_year(&self, year: i32) -> Vec<ZonalTransition> {
        let standard = self.initial.standard_offset();
        let mut savings = self.rules.last().map_or(0, DaylightSavingRule::savings);
        let mut out = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if rule.savings() == savings {
                continue;
            }
            let previous = standard.checked_add(savings);
            let total = standard.checked_add(rule.savings());
            let time = rule.transition_time(year, standard, savings);
            if let (Some(previous), Some(total), Some(posix_time)) = (previous, total, time) {
                if posix_time > self.initial.posix_time() {
                    out.push(ZonalTransition::new(posix_time, previous, total, rule.savings()));
                }
            }
            savings = rule.savings();
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// Fixed historical transitions without future generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArrayFields")]
pub struct ArrayTransitionModel {
    transitions: Vec<ZonalTransition>,
}

#[derive(Deserialize)]
struct ArrayFields {
    transitions: Vec<ZonalTransition>,
}

impl TryFrom<ArrayFields> for ArrayTransitionModel {
    type Error = ModelError;

    fn try_from(f: ArrayFields) -> Result<Self, Self::Error> {
        Self::new(f.transitions)
    }
}

impl ArrayTransitionModel {
    pub fn new(transitions: Vec<ZonalTransition>) -> Result<Self, ModelError> {
        check_transitions(&transitions)?;
        Ok(Self { transitions })
    }

    pub fn transitions(&self) -> &[ZonalTransition] {
        &self.transitions
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// Historical transitions followed by rule-generated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CompositeFields")]
pub struct CompositeTransitionModel {
    transitions: Vec<ZonalTransition>,
    rules: Vec<DaylightSavingRule>,
}

#[derive(Deserialize)]
struct CompositeFields {
    transitions: Vec<ZonalTransition>,
    rules: Vec<DaylightSavingRule>,
}

impl TryFrom<CompositeFields> for CompositeTransitionModel {
    type Error = ModelError;

    fn try_from(f: CompositeFields) -> Result<Self, Self::Error> {
        Self::new(f.transitions, f.rules)
    }
}

impl CompositeTransitionModel {
    pub fn new(
        transitions: Vec<ZonalTransition>,
        rules: Vec<DaylightSavingRule>,
    ) -> Result<Self, ModelError> {
        check_transitions(&transitions)?;
        check_rules(&rules, MAX_RULES)?;
        Ok(Self { transitions, rules })
    }

    pub fn transitions(&self) -> &[ZonalTransition] {
        &self.transitions
    }

    pub fn rules(&self) -> &[DaylightSavingRule] {
        &self.rules
    }
}

// ---------------------------------------------------------------------------
// Sum type
// ---------------------------------------------------------------------------

/// Transition history of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TransitionModel {
    RuleBased(RuleBasedTransitionModel),
    Array(ArrayTransitionModel),
    Composite(CompositeTransitionModel),
}

impl TransitionModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::RuleBased(_) => ModelKind::RuleBased,
            Self::Array(_) => ModelKind::Array,
            Self::Composite(_) => ModelKind::Composite,
        }
    }

    pub fn type_tag(&self) -> u8 {
        self.kind().type_tag()
    }

    /// Total offset before the first known transition.
    pub fn initial_offset(&self) -> i32 {
        match self {
            Self::RuleBased(m) => m.initial.previous_offset(),
            Self::Array(m) => m.transitions[0].previous_offset(),
            Self::Composite(m) => m.transitions[0].previous_offset(),
        }
    }

    /// Stored transitions; empty for a rule-based model.
    pub fn transitions(&self) -> &[ZonalTransition] {
        match self {
            Self::RuleBased(_) => &[],
            Self::Array(m) => &m.transitions,
            Self::Composite(m) => &m.transitions,
        }
    }

    /// Recurrence rules; empty for an array model.
    pub fn rules(&self) -> &[DaylightSavingRule] {
        match self {
            Self::RuleBased(m) => &m.rules,
            Self::Array(_) => &[],
            Self::Composite(m) => &m.rules,
        }
    }
}

impl From<RuleBasedTransitionModel> for TransitionModel {
    fn from(m: RuleBasedTransitionModel) -> Self {
        Self::RuleBased(m)
    }
}

impl From<ArrayTransitionModel> for TransitionModel {
    fn from(m: ArrayTransitionModel) -> Self {
        Self::Array(m)
    }
}

impl From<CompositeTransitionModel> for TransitionModel {
    fn from(m: CompositeTransitionModel) -> Self {
        Self::Composite(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{LastDayOfWeekPattern, OffsetIndicator};
    use chrono::{Month, Weekday};

    fn eu_rules() -> Vec<DaylightSavingRule> {
        vec![
            LastDayOfWeekPattern::new(Month::March, Weekday::Sun, 3600, OffsetIndicator::UtcTime, 3600)
                .unwrap()
                .into(),
            LastDayOfWeekPattern::new(Month::October, Weekday::Sun, 3600, OffsetIndicator::UtcTime, 0)
                .unwrap()
                .into(),
        ]
    }

    fn history() -> Vec<ZonalTransition> {
        vec![
            ZonalTransition::new(100, 0, 3600, 0),
            ZonalTransition::new(200, 3600, 7200, 3600),
        ]
    }

    #[test]
    fn test_rule_based_requires_rules() {
        let initial = ZonalTransition::new(0, 0, 3600, 0);
        assert_eq!(
            RuleBasedTransitionModel::new(initial, vec![]),
            Err(ModelError::MissingRules)
        );
    }

    #[test]
    fn test_rule_based_rejects_unordered_rules() {
        let initial = ZonalTransition::new(0, 0, 3600, 0);
        let mut rules = eu_rules();
        rules.reverse();
        assert_eq!(
            RuleBasedTransitionModel::new(initial, rules),
            Err(ModelError::UnorderedRules { index: 1 })
        );
    }

    #[test]
    fn test_rule_based_rejects_unrepresentable_standard_offset() {
        let initial = ZonalTransition::new(0, 0, i32::MIN, 1);
        assert_eq!(
            RuleBasedTransitionModel::new(initial, eu_rules()),
            Err(ModelError::StandardOffsetOverflow {
                index: 0,
                total: i32::MIN,
                daylight_saving: 1,
            })
        );
    }

    #[test]
    fn test_transitions_in_year_skips_overflowing_totals() {
        let initial = ZonalTransition::new(0, 0, i32::MAX, 0);
        let model = RuleBasedTransitionModel::new(initial, eu_rules()).unwrap();
        assert!(model.transitions_in_year(2024).is_empty());

        let initial = ZonalTransition::new(0, 0, i32::MAX - 3600, 0);
        let model = RuleBasedTransitionModel::new(initial, eu_rules()).unwrap();
        let generated = model.transitions_in_year(2024);
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0].total_offset(), i32::MAX);
    }

    #[test]
    fn test_array_requires_transitions() {
        assert_eq!(
            ArrayTransitionModel::new(vec![]),
            Err(ModelError::MissingTransitions)
        );
    }

    #[test]
    fn test_composite_validates_both_lists() {
        assert!(CompositeTransitionModel::new(history(), eu_rules()).is_ok());
        assert_eq!(
            CompositeTransitionModel::new(history(), vec![]),
            Err(ModelError::MissingRules)
        );
        assert_eq!(
            CompositeTransitionModel::new(vec![], eu_rules()),
            Err(ModelError::MissingTransitions)
        );
    }

    #[test]
    fn test_sum_type_accessors() {
        let model: TransitionModel = CompositeTransitionModel::new(history(), eu_rules())
            .unwrap()
            .into();
        assert_eq!(model.kind(), ModelKind::Composite);
        assert_eq!(model.initial_offset(), 0);
        assert_eq!(model.transitions().len(), 2);
        assert_eq!(model.rules().len(), 2);

        let array: TransitionModel = ArrayTransitionModel::new(history()).unwrap().into();
        assert!(array.rules().is_empty());

        let initial = ZonalTransition::new(0, 0, 3600, 0);
        let rule_based: TransitionModel =
            RuleBasedTransitionModel::new(initial, eu_rules()).unwrap().into();
        assert!(rule_based.transitions().is_empty());
        assert_eq!(rule_based.kind().to_string(), "rule-based");
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(ModelKind::RuleBased.type_tag(), 125);
        assert_eq!(ModelKind::Array.type_tag(), 126);
        let model: TransitionModel = CompositeTransitionModel::new(history(), eu_rules())
            .unwrap()
            .into();
        assert_eq!(model.type_tag(), 127);
    }

    #[test]
    fn test_transitions_in_year_eu() {
        // CET since 1996-ish: +01:00 standard.
        let initial = ZonalTransition::new(820_454_400, 3600, 3600, 0);
        let model = RuleBasedTransitionModel::new(initial, eu_rules()).unwrap();

        let generated = model.transitions_in_year(2024);
        assert_eq!(
            generated,
            vec![
                // 2024-03-31T01:00:00Z
                ZonalTransition::new(1_711_846_800, 3600, 7200, 3600),
                // 2024-10-27T01:00:00Z
                ZonalTransition::new(1_729_990_800, 7200, 3600, 0),
            ]
        );
        assert!(check_transitions(&generated).is_ok());
    }

    #[test]
    fn test_transitions_in_year_before_initial_is_empty() {
        let initial = ZonalTransition::new(1_800_000_000, 3600, 3600, 0);
        let model = RuleBasedTransitionModel::new(initial, eu_rules()).unwrap();
        assert!(model.transitions_in_year(2024).is_empty());
    }

    #[test]
    fn test_serde_roundtrip_and_validation() {
        let model: TransitionModel = CompositeTransitionModel::new(history(), eu_rules())
            .unwrap()
            .into();
        let json = serde_json::to_string(&model).unwrap();
        let parsed: TransitionModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, parsed);

        let broken = r#"{"model":"array","transitions":[
            {"posix_time":200,"previous_offset":0,"total_offset":3600,"daylight_saving_offset":0},
            {"posix_time":100,"previous_offset":3600,"total_offset":0,"daylight_saving_offset":0}]}"#;
        assert!(serde_json::from_str::<TransitionModel>(broken).is_err());
    }
}
