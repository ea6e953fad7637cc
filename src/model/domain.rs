//! The domain model
//!
//! Root of the administrative tree shared by every host in the fleet.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{
    DeploymentMeta, InterfaceSpec, PathSpec, Profile, ServerGroup, SocketBindingGroup,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainModel {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub server_groups: BTreeMap<String, ServerGroup>,

    /// Deployment metadata, keyed by the globally unique deployment name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<String, DeploymentMeta>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, InterfaceSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, PathSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub socket_binding_groups: BTreeMap<String, SocketBindingGroup>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_properties: BTreeMap<String, String>,

    /// Extension modules registered with the domain
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub extensions: BTreeSet<String>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn server_group(&self, name: &str) -> Option<&ServerGroup> {
        self.server_groups.get(name)
    }

    pub fn deployment(&self, name: &str) -> Option<&DeploymentMeta> {
        self.deployments.get(name)
    }

    /// Names of server-groups referencing the given profile, sorted
    pub fn groups_referencing_profile(&self, profile: &str) -> Vec<String> {
        self.server_groups
            .values()
            .filter(|g| g.profile == profile)
            .map(|g| g.name.clone())
            .collect()
    }

    /// Names of server-groups referencing the given socket-binding-group, sorted
    pub fn groups_referencing_socket_binding_group(&self, group: &str) -> Vec<String> {
        self.server_groups
            .values()
            .filter(|g| g.socket_binding_group == group)
            .map(|g| g.name.clone())
            .collect()
    }

    /// Names of server-groups mapping the given deployment, sorted
    pub fn groups_mapping_deployment(&self, deployment: &str) -> Vec<String> {
        self.server_groups
            .values()
            .filter(|g| g.maps_deployment(deployment))
            .map(|g| g.name.clone())
            .collect()
    }

    /// Names of profiles that include the given profile directly
    pub fn profiles_including(&self, profile: &str) -> Vec<String> {
        self.profiles
            .values()
            .filter(|p| p.includes_profile(profile))
            .map(|p| p.name.clone())
            .collect()
    }

    /// The profile plus every profile that includes it, directly or
    /// transitively
    ///
    /// This is the set of profiles whose effective configuration changes
    /// when the named profile changes. An unknown name yields just itself.
    pub fn profile_includers(&self, profile: &str) -> BTreeSet<String> {
        includers(profile, |name| {
            self.profiles
                .values()
                .filter(|p| p.includes_profile(name))
                .map(|p| p.name.clone())
                .collect()
        })
    }

    /// The profile plus everything it includes, directly or transitively
    pub fn profile_closure(&self, profile: &str) -> BTreeSet<String> {
        closure(profile, |name| {
            self.profiles
                .get(name)
                .map(|p| p.includes.clone())
                .unwrap_or_default()
        })
    }

    /// The socket-binding-group plus every group that includes it
    pub fn socket_binding_group_includers(&self, group: &str) -> BTreeSet<String> {
        includers(group, |name| {
            self.socket_binding_groups
                .values()
                .filter(|g| g.includes.iter().any(|i| i == name))
                .map(|g| g.name.clone())
                .collect()
        })
    }

    /// Whether the profile's transitive closure declares the subsystem
    pub fn resolved_profile_declares_subsystem(&self, profile: &str, subsystem: &str) -> bool {
        self.profile_closure(profile)
            .iter()
            .filter_map(|name| self.profiles.get(name))
            .any(|p| p.declares_subsystem(subsystem))
    }
}

/// Transitive closure of `seed` under a successor function
fn closure(seed: &str, successors: impl Fn(&str) -> Vec<String>) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut pending = vec![seed.to_string()];
    while let Some(name) = pending.pop() {
        if result.insert(name.clone()) {
            pending.extend(successors(&name));
        }
    }
    result
}

fn includers(seed: &str, including: impl Fn(&str) -> Vec<String>) -> BTreeSet<String> {
    closure(seed, including)
}
