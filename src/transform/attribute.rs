//! Attribute transformation steps
//!
//! One step rewrites one attribute for a legacy peer. Steps are pure
//! `Value -> Value` functions collected into an ordered chain and applied
//! left-to-right; a single attribute may need several (rename and then
//! value-correct, for example). Each step carries the version that
//! introduced the current shape: the step fires only when the target peer
//! predates it.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::transform::ModelVersion;

/// Pure value conversion used by [`AttributeStep::Correct`]
pub type ValueFn = fn(&Value) -> Value;

/// One declared rewrite of an attribute for legacy peers
#[derive(Debug, Clone)]
pub enum AttributeStep {
    /// The attribute was renamed; legacy peers know it as `legacy`
    Rename {
        current: String,
        legacy: String,
        since: ModelVersion,
    },

    /// The attribute's legal representation changed
    ///
    /// `to_legacy` rewrites a current value for a legacy peer and
    /// `from_legacy` is its inverse for values arriving from one.
    Correct {
        attribute: String,
        since: ModelVersion,
        to_legacy: ValueFn,
        from_legacy: ValueFn,
    },

    /// The attribute is meaningless to legacy peers and safe to drop from
    /// read results
    Discard {
        attribute: String,
        since: ModelVersion,
    },

    /// Writes naming the attribute cannot be expressed for legacy peers
    Reject {
        attribute: String,
        since: ModelVersion,
        reason: String,
    },
}

impl AttributeStep {
    /// Whether the step fires for a peer at `target`
    pub fn applies_to(&self, target: ModelVersion) -> bool {
        target < self.since()
    }

    pub fn since(&self) -> ModelVersion {
        match self {
            AttributeStep::Rename { since, .. }
            | AttributeStep::Correct { since, .. }
            | AttributeStep::Discard { since, .. }
            | AttributeStep::Reject { since, .. } => *since,
        }
    }

    /// The current-schema attribute name the step is declared on
    pub fn attribute(&self) -> &str {
        match self {
            AttributeStep::Rename { current, .. } => current,
            AttributeStep::Correct { attribute, .. }
            | AttributeStep::Discard { attribute, .. }
            | AttributeStep::Reject { attribute, .. } => attribute,
        }
    }
}

/// What applying one step to an attribute map did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    Untouched,
    Renamed,
    Corrected,
    Discarded,
}

/// Apply one step to a flat attribute map (outbound, current -> legacy)
///
/// Rejection is not handled here; the engine checks [`AttributeStep::Reject`]
/// before rewriting so failures carry a precise address.
pub fn apply_step_outbound(
    step: &AttributeStep,
    attributes: &mut BTreeMap<String, Value>,
) -> StepEffect {
    match step {
        AttributeStep::Rename {
            current, legacy, ..
        } => match attributes.remove(current) {
            Some(value) => {
                attributes.insert(legacy.clone(), value);
                StepEffect::Renamed
            }
            None => StepEffect::Untouched,
        },
        AttributeStep::Correct {
            attribute,
            to_legacy,
            ..
        } => match attributes.get_mut(attribute) {
            Some(value) => {
                *value = to_legacy(value);
                StepEffect::Corrected
            }
            None => StepEffect::Untouched,
        },
        AttributeStep::Discard { attribute, .. } => {
            if attributes.remove(attribute).is_some() {
                StepEffect::Discarded
            } else {
                StepEffect::Untouched
            }
        }
        AttributeStep::Reject { .. } => StepEffect::Untouched,
    }
}

/// Apply one step to a flat attribute map (inbound, legacy -> current)
pub fn apply_step_inbound(
    step: &AttributeStep,
    attributes: &mut BTreeMap<String, Value>,
) -> StepEffect {
    match step {
        AttributeStep::Rename {
            current, legacy, ..
        } => match attributes.remove(legacy) {
            Some(value) => {
                attributes.insert(current.clone(), value);
                StepEffect::Renamed
            }
            None => StepEffect::Untouched,
        },
        AttributeStep::Correct {
            attribute,
            from_legacy,
            ..
        } => match attributes.get_mut(attribute) {
            Some(value) => {
                *value = from_legacy(value);
                StepEffect::Corrected
            }
            None => StepEffect::Untouched,
        },
        // Nothing to restore; discarded attributes simply come back with
        // their defaults.
        AttributeStep::Discard { .. } | AttributeStep::Reject { .. } => StepEffect::Untouched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flip(value: &Value) -> Value {
        match value.as_bool() {
            Some(b) => Value::Bool(!b),
            None => value.clone(),
        }
    }

    fn attrs(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn rename_moves_the_value() {
        let step = AttributeStep::Rename {
            current: "enabled".into(),
            legacy: "enable".into(),
            since: ModelVersion::new(2, 0, 0),
        };
        let mut map = attrs(&[("enabled", json!(true))]);
        assert_eq!(apply_step_outbound(&step, &mut map), StepEffect::Renamed);
        assert_eq!(map, attrs(&[("enable", json!(true))]));

        assert_eq!(apply_step_inbound(&step, &mut map), StepEffect::Renamed);
        assert_eq!(map, attrs(&[("enabled", json!(true))]));
    }

    #[test]
    fn correct_applies_direction_specific_function() {
        let step = AttributeStep::Correct {
            attribute: "inverted".into(),
            since: ModelVersion::new(3, 0, 0),
            to_legacy: flip,
            from_legacy: flip,
        };
        let mut map = attrs(&[("inverted", json!(true))]);
        apply_step_outbound(&step, &mut map);
        assert_eq!(map["inverted"], json!(false));
        apply_step_inbound(&step, &mut map);
        assert_eq!(map["inverted"], json!(true));
    }

    #[test]
    fn discard_removes_only_outbound() {
        let step = AttributeStep::Discard {
            attribute: "statistics".into(),
            since: ModelVersion::new(2, 0, 0),
        };
        let mut map = attrs(&[("statistics", json!("none"))]);
        assert_eq!(apply_step_outbound(&step, &mut map), StepEffect::Discarded);
        assert!(map.is_empty());
        assert_eq!(apply_step_inbound(&step, &mut map), StepEffect::Untouched);
    }

    #[test]
    fn step_fires_only_for_older_targets() {
        let step = AttributeStep::Rename {
            current: "a".into(),
            legacy: "b".into(),
            since: ModelVersion::new(2, 0, 0),
        };
        assert!(step.applies_to(ModelVersion::new(1, 3, 0)));
        assert!(!step.applies_to(ModelVersion::new(2, 0, 0)));
        assert!(!step.applies_to(ModelVersion::new(4, 0, 0)));
    }
}
