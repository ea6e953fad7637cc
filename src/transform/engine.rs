//! The transformation engine
//!
//! Rewrites operations and resource trees for peers running older schema
//! versions. Each subsystem registers a transformer describing what
//! changed since each published version; the engine classifies every
//! piece of work as accepted, renamed, value-corrected, or rejected.
//!
//! Writes that a legacy peer cannot represent fail with a [`Rejection`]
//! naming the exact address and attribute - the caller decides whether to
//! omit that piece of configuration. Reads are never failed: attributes
//! the legacy peer does not know are discarded from the result and
//! reported in the outcome.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::address::ResourceAddress;
use crate::operation::{ops, Operation, ResourceNode};
use crate::transform::attribute::{
    apply_step_inbound, apply_step_outbound, AttributeStep, StepEffect, ValueFn,
};
use crate::transform::{ModelVersion, SubsystemModel};

/// Final classification of one transformation
///
/// Ordered by severity; composite work keeps the strongest classification
/// of its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransformOutcome {
    Accepted,
    AttributeRenamed,
    ValueCorrected,
    ResourceRejected,
}

/// A change the target peer's schema cannot represent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot express {address} for model version {target}: {reason}")]
pub struct Rejection {
    pub address: ResourceAddress,
    pub attribute: Option<String>,
    pub target: ModelVersion,
    pub reason: String,
}

/// An operation rewritten for a legacy peer
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedOperation {
    pub operation: Operation,
    pub outcome: TransformOutcome,
}

/// A resource tree rewritten for a legacy peer
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedResource {
    pub resource: ResourceNode,
    pub outcome: TransformOutcome,
    /// Attribute/child names dropped because the peer cannot represent them
    pub discarded: Vec<String>,
}

/// Per-subsystem transformation rules
#[derive(Debug, Clone)]
pub struct SubsystemTransformer {
    model: SubsystemModel,
    steps: Vec<AttributeStep>,
    /// Attributes introduced after some version: discarded from reads and
    /// rejected on writes for peers older than that version
    attributes_since: BTreeMap<String, ModelVersion>,
    /// Child resource types introduced after some version
    children_since: BTreeMap<String, ModelVersion>,
}

impl SubsystemTransformer {
    pub fn new(model: SubsystemModel) -> Self {
        Self {
            model,
            steps: Vec::new(),
            attributes_since: BTreeMap::new(),
            children_since: BTreeMap::new(),
        }
    }

    pub fn subsystem(&self) -> &str {
        &self.model.subsystem
    }

    pub fn rename(
        mut self,
        current: impl Into<String>,
        legacy: impl Into<String>,
        since: ModelVersion,
    ) -> Self {
        self.steps.push(AttributeStep::Rename {
            current: current.into(),
            legacy: legacy.into(),
            since,
        });
        self
    }

    pub fn correct(
        mut self,
        attribute: impl Into<String>,
        since: ModelVersion,
        to_legacy: ValueFn,
        from_legacy: ValueFn,
    ) -> Self {
        self.steps.push(AttributeStep::Correct {
            attribute: attribute.into(),
            since,
            to_legacy,
            from_legacy,
        });
        self
    }

    pub fn discard(mut self, attribute: impl Into<String>, since: ModelVersion) -> Self {
        self.steps.push(AttributeStep::Discard {
            attribute: attribute.into(),
            since,
        });
        self
    }

    pub fn reject(
        mut self,
        attribute: impl Into<String>,
        since: ModelVersion,
        reason: impl Into<String>,
    ) -> Self {
        self.steps.push(AttributeStep::Reject {
            attribute: attribute.into(),
            since,
            reason: reason.into(),
        });
        self
    }

    /// Declare an attribute introduced at `since`
    pub fn attribute_since(mut self, attribute: impl Into<String>, since: ModelVersion) -> Self {
        self.attributes_since.insert(attribute.into(), since);
        self
    }

    /// Declare a child resource type introduced at `since`
    pub fn child_since(mut self, child_type: impl Into<String>, since: ModelVersion) -> Self {
        self.children_since.insert(child_type.into(), since);
        self
    }

    fn active_steps(&self, target: ModelVersion) -> impl Iterator<Item = &AttributeStep> {
        self.steps.iter().filter(move |s| s.applies_to(target))
    }

    /// The reason writes to `attribute` must be refused for `target`, if any
    fn write_rejection(&self, attribute: &str, target: ModelVersion) -> Option<String> {
        for step in self.active_steps(target) {
            if let AttributeStep::Reject {
                attribute: name,
                reason,
                ..
            } = step
            {
                if name == attribute {
                    return Some(reason.clone());
                }
            }
        }
        match self.attributes_since.get(attribute) {
            Some(since) if target < *since => Some(format!(
                "attribute '{attribute}' was introduced in {since}"
            )),
            _ => None,
        }
    }
}

/// Registry of subsystem transformers, the engine's entry point
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    subsystems: BTreeMap<String, SubsystemTransformer>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, transformer: SubsystemTransformer) {
        self.subsystems
            .insert(transformer.subsystem().to_string(), transformer);
    }

    pub fn transformer(&self, subsystem: &str) -> Option<&SubsystemTransformer> {
        self.subsystems.get(subsystem)
    }

    /// Rewrite one operation for a peer at `target` (current -> legacy)
    pub fn transform_operation(
        &self,
        operation: &Operation,
        target: ModelVersion,
    ) -> Result<TransformedOperation, Rejection> {
        let Some((subsystem, depth)) = subsystem_of(&operation.address) else {
            return Ok(accepted(operation));
        };
        let Some(transformer) = self.subsystems.get(subsystem) else {
            return Ok(accepted(operation));
        };
        if !transformer.model.requires_transform(target) {
            return Ok(accepted(operation));
        }

        // Child resources the peer predates reject the whole operation.
        for element in &operation.address.elements()[depth + 1..] {
            if let Some(since) = transformer.children_since.get(&element.key) {
                if target < *since {
                    return Err(Rejection {
                        address: operation.address.clone(),
                        attribute: None,
                        target,
                        reason: format!(
                            "resource type '{}' was introduced in {since}",
                            element.key
                        ),
                    });
                }
            }
        }

        let mut transformed = operation.clone();
        let mut outcome = TransformOutcome::Accepted;

        match operation.name.as_str() {
            ops::ADD => {
                for (attribute, _) in &operation.params {
                    if let Some(reason) = transformer.write_rejection(attribute, target) {
                        return Err(Rejection {
                            address: operation.address.clone(),
                            attribute: Some(attribute.clone()),
                            target,
                            reason,
                        });
                    }
                }
                for step in transformer.active_steps(target) {
                    match apply_step_outbound(step, &mut transformed.params) {
                        StepEffect::Renamed => {
                            outcome = outcome.max(TransformOutcome::AttributeRenamed);
                        }
                        StepEffect::Corrected => {
                            outcome = outcome.max(TransformOutcome::ValueCorrected);
                        }
                        StepEffect::Untouched | StepEffect::Discarded => {}
                    }
                }
            }
            ops::READ_ATTRIBUTE | ops::WRITE_ATTRIBUTE | ops::UNDEFINE_ATTRIBUTE => {
                let Some(attribute) = operation.attribute_name().map(str::to_string) else {
                    return Ok(accepted(operation));
                };
                if let Some(reason) = transformer.write_rejection(&attribute, target) {
                    return Err(Rejection {
                        address: operation.address.clone(),
                        attribute: Some(attribute),
                        target,
                        reason,
                    });
                }
                // Chain renames and corrections in declared order; a
                // rename changes the name later steps see.
                let mut name = attribute;
                for step in transformer.active_steps(target) {
                    match step {
                        AttributeStep::Rename {
                            current, legacy, ..
                        } if *current == name => {
                            name = legacy.clone();
                            outcome = outcome.max(TransformOutcome::AttributeRenamed);
                        }
                        AttributeStep::Correct {
                            attribute: corrected,
                            to_legacy,
                            ..
                        } if *corrected == name && operation.name == ops::WRITE_ATTRIBUTE => {
                            if let Some(value) = transformed.params.get_mut("value") {
                                *value = to_legacy(value);
                                outcome = outcome.max(TransformOutcome::ValueCorrected);
                            }
                        }
                        _ => {}
                    }
                }
                transformed.params.insert("name".into(), Value::String(name));
            }
            _ => {}
        }

        debug!(
            subsystem,
            target = %target,
            operation = %transformed.name,
            outcome = ?outcome,
            "transformed operation"
        );
        Ok(TransformedOperation {
            operation: transformed,
            outcome,
        })
    }

    /// Rewrite a composite (multi-step) unit of operations
    ///
    /// Steps are transformed in order; the first step the peer cannot
    /// represent rejects the composite with its own address.
    pub fn transform_composite(
        &self,
        operations: &[Operation],
        target: ModelVersion,
    ) -> Result<Vec<TransformedOperation>, Rejection> {
        operations
            .iter()
            .map(|op| self.transform_operation(op, target))
            .collect()
    }

    /// Rewrite one subsystem resource for a peer at `target`
    ///
    /// Reads never fail: anything the peer cannot represent is discarded
    /// from the result and reported via the outcome.
    pub fn transform_resource(
        &self,
        subsystem: &str,
        resource: &ResourceNode,
        target: ModelVersion,
    ) -> TransformedResource {
        let Some(transformer) = self.subsystems.get(subsystem) else {
            return TransformedResource {
                resource: resource.clone(),
                outcome: TransformOutcome::Accepted,
                discarded: Vec::new(),
            };
        };
        if !transformer.model.requires_transform(target) {
            return TransformedResource {
                resource: resource.clone(),
                outcome: TransformOutcome::Accepted,
                discarded: Vec::new(),
            };
        }

        let mut node = resource.clone();
        let mut outcome = TransformOutcome::Accepted;
        let mut discarded = Vec::new();

        for (attribute, since) in &transformer.attributes_since {
            if target < *since && node.attributes.remove(attribute).is_some() {
                discarded.push(attribute.clone());
                outcome = outcome.max(TransformOutcome::ResourceRejected);
            }
        }
        for (child_type, since) in &transformer.children_since {
            if target < *since && node.children.remove(child_type).is_some() {
                discarded.push(format!("{child_type}=*"));
                outcome = outcome.max(TransformOutcome::ResourceRejected);
            }
        }
        for step in transformer.active_steps(target) {
            match apply_step_outbound(step, &mut node.attributes) {
                StepEffect::Renamed => {
                    outcome = outcome.max(TransformOutcome::AttributeRenamed);
                }
                StepEffect::Corrected => {
                    outcome = outcome.max(TransformOutcome::ValueCorrected);
                }
                StepEffect::Discarded => {
                    discarded.push(step.attribute().to_string());
                }
                StepEffect::Untouched => {}
            }
        }

        debug!(subsystem, target = %target, outcome = ?outcome, "transformed resource");
        TransformedResource {
            resource: node,
            outcome,
            discarded,
        }
    }

    /// Rewrite a whole persisted tree for a peer at `target`
    ///
    /// Walks the tree and transforms every `subsystem=*` child; other
    /// nodes are copied through.
    pub fn transform_resource_tree(
        &self,
        root: &ResourceNode,
        target: ModelVersion,
    ) -> TransformedResource {
        let mut node = ResourceNode {
            attributes: root.attributes.clone(),
            children: BTreeMap::new(),
        };
        let mut outcome = TransformOutcome::Accepted;
        let mut discarded = Vec::new();

        for (child_type, children) in &root.children {
            let mut transformed_children = BTreeMap::new();
            for (name, child) in children {
                if child_type == "subsystem" {
                    let result = self.transform_resource(name, child, target);
                    outcome = outcome.max(result.outcome);
                    discarded.extend(
                        result
                            .discarded
                            .into_iter()
                            .map(|d| format!("subsystem={name}/{d}")),
                    );
                    transformed_children.insert(name.clone(), result.resource);
                } else {
                    let result = self.transform_resource_tree(child, target);
                    outcome = outcome.max(result.outcome);
                    discarded.extend(
                        result
                            .discarded
                            .into_iter()
                            .map(|d| format!("{child_type}={name}/{d}")),
                    );
                    transformed_children.insert(name.clone(), result.resource);
                }
            }
            node.children.insert(child_type.clone(), transformed_children);
        }

        TransformedResource {
            resource: node,
            outcome,
            discarded,
        }
    }

    /// Rewrite an operation arriving from a legacy peer (legacy -> current)
    pub fn normalize_operation(
        &self,
        operation: &Operation,
        source: ModelVersion,
    ) -> TransformedOperation {
        let Some((subsystem, _)) = subsystem_of(&operation.address) else {
            return accepted(operation);
        };
        let Some(transformer) = self.subsystems.get(subsystem) else {
            return accepted(operation);
        };
        if !transformer.model.requires_transform(source) {
            return accepted(operation);
        }

        let mut transformed = operation.clone();
        let mut outcome = TransformOutcome::Accepted;

        match operation.name.as_str() {
            ops::ADD => {
                // Inverse chain runs right-to-left.
                let steps: Vec<_> = transformer.active_steps(source).collect();
                for step in steps.into_iter().rev() {
                    match apply_step_inbound(step, &mut transformed.params) {
                        StepEffect::Renamed => {
                            outcome = outcome.max(TransformOutcome::AttributeRenamed);
                        }
                        StepEffect::Corrected => {
                            outcome = outcome.max(TransformOutcome::ValueCorrected);
                        }
                        _ => {}
                    }
                }
            }
            ops::READ_ATTRIBUTE | ops::WRITE_ATTRIBUTE | ops::UNDEFINE_ATTRIBUTE => {
                let Some(attribute) = operation.attribute_name().map(str::to_string) else {
                    return accepted(operation);
                };
                let mut name = attribute;
                let steps: Vec<_> = transformer.active_steps(source).collect();
                for step in steps.into_iter().rev() {
                    match step {
                        AttributeStep::Rename {
                            current, legacy, ..
                        } if *legacy == name => {
                            name = current.clone();
                            outcome = outcome.max(TransformOutcome::AttributeRenamed);
                        }
                        AttributeStep::Correct {
                            attribute: corrected,
                            from_legacy,
                            ..
                        } if *corrected == name && operation.name == ops::WRITE_ATTRIBUTE => {
                            if let Some(value) = transformed.params.get_mut("value") {
                                *value = from_legacy(value);
                                outcome = outcome.max(TransformOutcome::ValueCorrected);
                            }
                        }
                        _ => {}
                    }
                }
                transformed.params.insert("name".into(), Value::String(name));
            }
            _ => {}
        }

        TransformedOperation {
            operation: transformed,
            outcome,
        }
    }

    /// Rewrite a subsystem resource read from a legacy peer
    pub fn normalize_resource(
        &self,
        subsystem: &str,
        resource: &ResourceNode,
        source: ModelVersion,
    ) -> ResourceNode {
        let Some(transformer) = self.subsystems.get(subsystem) else {
            return resource.clone();
        };
        if !transformer.model.requires_transform(source) {
            return resource.clone();
        }
        let mut node = resource.clone();
        let steps: Vec<_> = transformer.active_steps(source).collect();
        for step in steps.into_iter().rev() {
            apply_step_inbound(step, &mut node.attributes);
        }
        node
    }
}

fn accepted(operation: &Operation) -> TransformedOperation {
    TransformedOperation {
        operation: operation.clone(),
        outcome: TransformOutcome::Accepted,
    }
}

/// The subsystem element of an address, with its position
fn subsystem_of(address: &ResourceAddress) -> Option<(&str, usize)> {
    address
        .elements()
        .iter()
        .enumerate()
        .find(|(_, e)| e.key == "subsystem")
        .map(|(i, e)| (e.value.as_str(), i))
}
