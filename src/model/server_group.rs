//! Server groups
//!
//! A server-group names the profile and socket-binding-group its servers
//! run with, plus group-wide overrides (port offset, system properties,
//! JVM) and the deployments mapped onto the group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::JvmConfig;

/// A deployment mapped onto a server-group
///
/// The deployment itself (runtime name, hash) lives at domain level; the
/// binding only records whether the group starts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentBinding {
    pub start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGroup {
    pub name: String,

    /// Profile every server in the group runs (by name)
    pub profile: String,

    /// Socket-binding-group every server in the group binds with (by name)
    pub socket_binding_group: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub port_offset: u16,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_properties: BTreeMap<String, String>,

    /// Deployment unique-name -> binding
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<String, DeploymentBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jvm: Option<JvmConfig>,
}

fn is_zero(offset: &u16) -> bool {
    *offset == 0
}

impl ServerGroup {
    pub fn new(
        name: impl Into<String>,
        profile: impl Into<String>,
        socket_binding_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            profile: profile.into(),
            socket_binding_group: socket_binding_group.into(),
            port_offset: 0,
            system_properties: BTreeMap::new(),
            deployments: BTreeMap::new(),
            jvm: None,
        }
    }

    pub fn maps_deployment(&self, deployment: &str) -> bool {
        self.deployments.contains_key(deployment)
    }

    pub fn declares_system_property(&self, name: &str) -> bool {
        self.system_properties.contains_key(name)
    }
}
