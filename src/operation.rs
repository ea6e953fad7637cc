//! Wire-level operation and resource shapes
//!
//! Management requests arrive as generic operations (name + address +
//! params) and resource reads leave as generic trees. The typed updates in
//! [`crate::update`] are what the kernel applies; these dynamic shapes are
//! what the transformation engine rewrites for legacy peers, since it
//! cannot know the schema of every subsystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ResourceAddress;

/// Well-known operation names
pub mod ops {
    pub const ADD: &str = "add";
    pub const REMOVE: &str = "remove";
    pub const READ_ATTRIBUTE: &str = "read-attribute";
    pub const WRITE_ATTRIBUTE: &str = "write-attribute";
    pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";
}

/// A generic management operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub address: ResourceAddress,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
}

impl Operation {
    pub fn new(name: impl Into<String>, address: ResourceAddress) -> Self {
        Self {
            name: name.into(),
            address,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Shorthand for a `write-attribute` operation
    pub fn write_attribute(address: ResourceAddress, attribute: &str, value: Value) -> Self {
        Self::new(ops::WRITE_ATTRIBUTE, address)
            .with_param("name", Value::String(attribute.to_string()))
            .with_param("value", value)
    }

    /// Shorthand for a `read-attribute` operation
    pub fn read_attribute(address: ResourceAddress, attribute: &str) -> Self {
        Self::new(ops::READ_ATTRIBUTE, address)
            .with_param("name", Value::String(attribute.to_string()))
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// The attribute this operation targets, for the `*-attribute` family
    pub fn attribute_name(&self) -> Option<&str> {
        match self.name.as_str() {
            ops::READ_ATTRIBUTE | ops::WRITE_ATTRIBUTE | ops::UNDEFINE_ATTRIBUTE => {
                self.params.get("name").and_then(Value::as_str)
            }
            _ => None,
        }
    }
}

/// A generic resource tree node
///
/// Children are keyed by `(type, name)`, matching the persisted tree shape
/// (`profile=web` owns `subsystem=logging`, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, BTreeMap<String, ResourceNode>>,
}

impl ResourceNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_child(
        mut self,
        child_type: impl Into<String>,
        name: impl Into<String>,
        node: ResourceNode,
    ) -> Self {
        self.children
            .entry(child_type.into())
            .or_default()
            .insert(name.into(), node);
        self
    }

    pub fn child(&self, child_type: &str, name: &str) -> Option<&ResourceNode> {
        self.children.get(child_type).and_then(|m| m.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_attribute_carries_name_and_value() {
        let addr = ResourceAddress::of(&[("profile", "web"), ("subsystem", "logging")]);
        let op = Operation::write_attribute(addr, "level", json!("DEBUG"));
        assert_eq!(op.attribute_name(), Some("level"));
        assert_eq!(op.param("value"), Some(&json!("DEBUG")));
    }

    #[test]
    fn attribute_name_is_none_for_add() {
        let op = Operation::new(ops::ADD, ResourceAddress::root())
            .with_param("name", json!("not-an-attribute-target"));
        assert_eq!(op.attribute_name(), None);
    }

    #[test]
    fn resource_children_keyed_by_type_and_name() {
        let tree = ResourceNode::new().with_child(
            "subsystem",
            "logging",
            ResourceNode::new().with_attribute("level", json!("INFO")),
        );
        assert!(tree.child("subsystem", "logging").is_some());
        assert!(tree.child("subsystem", "web").is_none());
    }
}
