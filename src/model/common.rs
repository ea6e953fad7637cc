//! Shared configuration value types
//!
//! Paths, interfaces, socket bindings, JVM settings and subsystem
//! configuration appear at several levels of the tree (domain, host,
//! server-group, server) with identical shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named filesystem path declaration
///
/// A path without a concrete `path` value is declaration-only: it names a
/// path that hosts or servers are expected to define locally, and is never
/// pushed to running servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Name of another path this one is resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<String>,
}

impl PathSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            relative_to: None,
        }
    }

    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            relative_to: None,
        }
    }

    pub fn is_declaration_only(&self) -> bool {
        self.path.is_none()
    }
}

/// A named network interface declaration
///
/// `criteria` describes how the concrete address is selected (loopback,
/// subnet match, ...); an interface without criteria is declaration-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
}

impl InterfaceSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            criteria: None,
        }
    }

    pub fn new(name: impl Into<String>, criteria: Value) -> Self {
        Self {
            name: name.into(),
            criteria: Some(criteria),
        }
    }

    pub fn is_declaration_only(&self) -> bool {
        self.criteria.is_none()
    }
}

/// One named socket binding inside a socket-binding-group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketBinding {
    pub name: String,
    pub port: u16,

    /// Interface override; defaults to the group's default interface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

/// A named group of socket bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketBindingGroup {
    pub name: String,
    pub default_interface: String,

    /// Other socket-binding-groups composed into this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, SocketBinding>,
}

impl SocketBindingGroup {
    pub fn new(name: impl Into<String>, default_interface: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_interface: default_interface.into(),
            includes: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }
}

/// JVM launch settings for a server or server-group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JvmConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heap_size: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl JvmConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Configuration of one subsystem inside a profile
///
/// Attribute values are dynamic (`serde_json::Value`) because subsystem
/// schemas are defined by extensions the kernel does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl SubsystemConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}
