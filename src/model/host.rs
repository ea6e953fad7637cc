//! Host and server configuration
//!
//! A host model is local to one management agent: host-wide overrides for
//! domain resources (paths, interfaces, system properties) plus the
//! servers configured on that host. Each server belongs to exactly one
//! server-group and may carry its own overrides, which always win over the
//! group/domain value for the same name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{InterfaceSpec, JvmConfig, PathSpec};

/// Configuration of one server on a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,

    /// Server-group this server belongs to (by name)
    pub group: String,

    /// Whether the host starts this server automatically
    ///
    /// A server with `auto_start: false` is not running and is never
    /// reported as affected by an update.
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,

    /// Socket-binding-group override; defaults to the group's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_binding_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_offset: Option<u16>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, InterfaceSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_properties: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jvm: Option<JvmConfig>,
}

fn default_auto_start() -> bool {
    true
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            auto_start: true,
            socket_binding_group: None,
            port_offset: None,
            paths: BTreeMap::new(),
            interfaces: BTreeMap::new(),
            system_properties: BTreeMap::new(),
            jvm: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.auto_start
    }

    pub fn declares_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn declares_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn declares_system_property(&self, name: &str) -> bool {
        self.system_properties.contains_key(name)
    }
}

/// The configuration model of one managed host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostModel {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, InterfaceSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_properties: BTreeMap<String, String>,

    /// Named JVM settings servers can reference
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub jvms: BTreeMap<String, JvmConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub servers: BTreeMap<String, ServerConfig>,
}

impl HostModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: BTreeMap::new(),
            interfaces: BTreeMap::new(),
            system_properties: BTreeMap::new(),
            jvms: BTreeMap::new(),
            servers: BTreeMap::new(),
        }
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Names of servers in the given group, defensive copy, sorted
    pub fn servers_in_group(&self, group: &str) -> Vec<String> {
        self.servers
            .values()
            .filter(|s| s.group == group)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Names of all active servers on this host, defensive copy, sorted
    pub fn active_servers(&self) -> Vec<String> {
        self.servers
            .values()
            .filter(|s| s.is_active())
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn declares_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn declares_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn declares_system_property(&self, name: &str) -> bool {
        self.system_properties.contains_key(name)
    }
}
