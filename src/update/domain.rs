//! Domain-scoped updates
//!
//! Each variant is one atomic mutation of the shared domain model. The
//! apply arms validate every invariant before touching the tree, so a
//! failed update observes and modifies nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ResourceAddress;
use crate::error::{ElementKind, KernelResult, UpdateError};
use crate::model::{
    ContentHash, DeploymentBinding, DeploymentMeta, DomainModel, HostModel, InterfaceSpec,
    JvmConfig, PathSpec, Profile, ServerGroup, SocketBinding, SocketBindingGroup,
    SubsystemConfig,
};
use crate::projection;
use crate::update::ServerUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum DomainUpdate {
    // --- profiles ---
    AddProfile {
        name: String,
    },
    /// Remove an empty, unreferenced profile
    RemoveProfile {
        name: String,
    },
    AddProfileInclude {
        profile: String,
        include: String,
    },
    RemoveProfileInclude {
        profile: String,
        include: String,
    },
    AddSubsystem {
        profile: String,
        subsystem: SubsystemConfig,
    },
    RemoveSubsystem {
        profile: String,
        subsystem: String,
    },
    /// Write one subsystem attribute; a `null` value undefines it
    WriteSubsystemAttribute {
        profile: String,
        subsystem: String,
        attribute: String,
        value: Value,
    },

    // --- server groups ---
    AddServerGroup {
        group: ServerGroup,
    },
    RemoveServerGroup {
        name: String,
    },
    WriteServerGroupProfile {
        group: String,
        profile: String,
    },
    WriteServerGroupSocketBindingGroup {
        group: String,
        socket_binding_group: String,
    },
    WriteServerGroupPortOffset {
        group: String,
        port_offset: u16,
    },
    /// Set or clear (`None`) the JVM settings servers of the group launch with
    WriteServerGroupJvm {
        group: String,
        jvm: Option<JvmConfig>,
    },
    SetServerGroupProperty {
        group: String,
        name: String,
        value: String,
    },
    RemoveServerGroupProperty {
        group: String,
        name: String,
    },

    // --- deployments ---
    AddDeployment {
        deployment: DeploymentMeta,
    },
    RemoveDeployment {
        name: String,
    },
    /// Swap a deployment's content in place, everywhere it is mapped
    ReplaceDeployment {
        name: String,
        runtime_name: String,
        hash: ContentHash,
    },
    MapDeployment {
        group: String,
        deployment: String,
        start: bool,
    },
    UnmapDeployment {
        group: String,
        deployment: String,
    },
    WriteDeploymentStart {
        group: String,
        deployment: String,
        start: bool,
    },

    // --- domain-wide resources ---
    AddPath {
        path: PathSpec,
    },
    WritePath {
        path: PathSpec,
    },
    RemovePath {
        name: String,
    },
    AddInterface {
        interface: InterfaceSpec,
    },
    WriteInterface {
        interface: InterfaceSpec,
    },
    RemoveInterface {
        name: String,
    },
    AddSocketBindingGroup {
        group: SocketBindingGroup,
    },
    RemoveSocketBindingGroup {
        name: String,
    },
    WriteSocketBinding {
        group: String,
        binding: SocketBinding,
    },
    RemoveSocketBinding {
        group: String,
        binding: String,
    },
    SetSystemProperty {
        name: String,
        value: String,
    },
    RemoveSystemProperty {
        name: String,
    },
    AddExtension {
        module: String,
    },
    RemoveExtension {
        module: String,
    },
}

impl DomainUpdate {
    /// Address of the element this update targets
    pub fn address(&self) -> ResourceAddress {
        use DomainUpdate::*;
        match self {
            AddProfile { name } | RemoveProfile { name } => {
                ResourceAddress::root().child("profile", name)
            }
            AddProfileInclude { profile, .. } | RemoveProfileInclude { profile, .. } => {
                ResourceAddress::root().child("profile", profile)
            }
            AddSubsystem { profile, subsystem } => ResourceAddress::root()
                .child("profile", profile)
                .child("subsystem", &subsystem.name),
            RemoveSubsystem { profile, subsystem }
            | WriteSubsystemAttribute {
                profile, subsystem, ..
            } => ResourceAddress::root()
                .child("profile", profile)
                .child("subsystem", subsystem),
            AddServerGroup { group } => {
                ResourceAddress::root().child("server-group", &group.name)
            }
            RemoveServerGroup { name } => ResourceAddress::root().child("server-group", name),
            WriteServerGroupProfile { group, .. }
            | WriteServerGroupSocketBindingGroup { group, .. }
            | WriteServerGroupPortOffset { group, .. }
            | WriteServerGroupJvm { group, .. } => {
                ResourceAddress::root().child("server-group", group)
            }
            SetServerGroupProperty { group, name, .. }
            | RemoveServerGroupProperty { group, name } => ResourceAddress::root()
                .child("server-group", group)
                .child("system-property", name),
            AddDeployment { deployment } => {
                ResourceAddress::root().child("deployment", &deployment.name)
            }
            RemoveDeployment { name } | ReplaceDeployment { name, .. } => {
                ResourceAddress::root().child("deployment", name)
            }
            MapDeployment {
                group, deployment, ..
            }
            | UnmapDeployment { group, deployment }
            | WriteDeploymentStart {
                group, deployment, ..
            } => ResourceAddress::root()
                .child("server-group", group)
                .child("deployment", deployment),
            AddPath { path } | WritePath { path } => {
                ResourceAddress::root().child("path", &path.name)
            }
            RemovePath { name } => ResourceAddress::root().child("path", name),
            AddInterface { interface } | WriteInterface { interface } => {
                ResourceAddress::root().child("interface", &interface.name)
            }
            RemoveInterface { name } => ResourceAddress::root().child("interface", name),
            AddSocketBindingGroup { group } => {
                ResourceAddress::root().child("socket-binding-group", &group.name)
            }
            RemoveSocketBindingGroup { name } => {
                ResourceAddress::root().child("socket-binding-group", name)
            }
            WriteSocketBinding { group, binding } => ResourceAddress::root()
                .child("socket-binding-group", group)
                .child("socket-binding", &binding.name),
            RemoveSocketBinding { group, binding } => ResourceAddress::root()
                .child("socket-binding-group", group)
                .child("socket-binding", binding),
            SetSystemProperty { name, .. } | RemoveSystemProperty { name } => {
                ResourceAddress::root().child("system-property", name)
            }
            AddExtension { module } | RemoveExtension { module } => {
                ResourceAddress::root().child("extension", module)
            }
        }
    }

    /// Apply this update to the domain model
    ///
    /// Validates all uniqueness and referential invariants visible inside
    /// the domain tree; cross-model checks (servers referencing a group)
    /// live in [`crate::api::apply_domain_update`]. On error the model is
    /// unchanged.
    pub fn apply(&self, domain: &mut DomainModel) -> KernelResult<()> {
        use DomainUpdate::*;
        match self {
            AddProfile { name } => {
                if domain.profiles.contains_key(name) {
                    return Err(self.duplicate(ElementKind::Profile, name));
                }
                domain.profiles.insert(name.clone(), Profile::new(name));
                Ok(())
            }
            RemoveProfile { name } => {
                let profile = domain
                    .profiles
                    .get(name)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, name))?;
                // References win over emptiness: the caller needs to know
                // who is blocking the removal before what is inside.
                let mut referrers = domain.groups_referencing_profile(name);
                referrers.extend(domain.profiles_including(name));
                if !referrers.is_empty() {
                    return Err(UpdateError::StillReferenced {
                        kind: ElementKind::Profile,
                        name: name.clone(),
                        referrers,
                        address: self.address(),
                    });
                }
                if !profile.is_empty() {
                    return Err(UpdateError::ProfileNotEmpty {
                        name: name.clone(),
                        subsystems: profile.subsystems.len(),
                        includes: profile.includes.len(),
                        address: self.address(),
                    });
                }
                domain.profiles.remove(name);
                Ok(())
            }
            AddProfileInclude { profile, include } => {
                if !domain.profiles.contains_key(include) {
                    return Err(self.missing_reference(ElementKind::Profile, include));
                }
                // A cycle would break every closure walk over the graph.
                if profile == include || domain.profile_closure(include).contains(profile) {
                    return Err(UpdateError::IncludeCycle {
                        profile: profile.clone(),
                        include: include.clone(),
                        address: self.address(),
                    });
                }
                let target = domain
                    .profiles
                    .get_mut(profile)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, profile))?;
                if target.includes_profile(include) {
                    return Err(self.duplicate(ElementKind::Profile, include));
                }
                target.includes.push(include.clone());
                Ok(())
            }
            RemoveProfileInclude { profile, include } => {
                let target = domain
                    .profiles
                    .get_mut(profile)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, profile))?;
                let position = target
                    .includes
                    .iter()
                    .position(|i| i == include)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, include))?;
                target.includes.remove(position);
                Ok(())
            }
            AddSubsystem { profile, subsystem } => {
                let target = domain
                    .profiles
                    .get_mut(profile)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, profile))?;
                if target.declares_subsystem(&subsystem.name) {
                    return Err(self.duplicate(ElementKind::Subsystem, &subsystem.name));
                }
                target
                    .subsystems
                    .insert(subsystem.name.clone(), subsystem.clone());
                Ok(())
            }
            RemoveSubsystem { profile, subsystem } => {
                let target = domain
                    .profiles
                    .get_mut(profile)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, profile))?;
                if target.subsystems.remove(subsystem).is_none() {
                    return Err(self.not_found(ElementKind::Subsystem, subsystem));
                }
                Ok(())
            }
            WriteSubsystemAttribute {
                profile,
                subsystem,
                attribute,
                value,
            } => {
                let target = domain
                    .profiles
                    .get_mut(profile)
                    .ok_or_else(|| self.not_found(ElementKind::Profile, profile))?;
                // Includes are a composition boundary: the update must
                // address the profile that declares the subsystem.
                let config = target
                    .subsystems
                    .get_mut(subsystem)
                    .ok_or_else(|| self.not_found(ElementKind::Subsystem, subsystem))?;
                if value.is_null() {
                    config.attributes.remove(attribute);
                } else {
                    config
                        .attributes
                        .insert(attribute.clone(), value.clone());
                }
                Ok(())
            }
            AddServerGroup { group } => {
                if domain.server_groups.contains_key(&group.name) {
                    return Err(self.duplicate(ElementKind::ServerGroup, &group.name));
                }
                if !domain.profiles.contains_key(&group.profile) {
                    return Err(self.missing_reference(ElementKind::Profile, &group.profile));
                }
                if !domain
                    .socket_binding_groups
                    .contains_key(&group.socket_binding_group)
                {
                    return Err(self.missing_reference(
                        ElementKind::SocketBindingGroup,
                        &group.socket_binding_group,
                    ));
                }
                for deployment in group.deployments.keys() {
                    if !domain.deployments.contains_key(deployment) {
                        return Err(
                            self.missing_reference(ElementKind::Deployment, deployment)
                        );
                    }
                }
                domain.server_groups.insert(group.name.clone(), group.clone());
                Ok(())
            }
            RemoveServerGroup { name } => {
                if !domain.server_groups.contains_key(name) {
                    return Err(self.not_found(ElementKind::ServerGroup, name));
                }
                domain.server_groups.remove(name);
                Ok(())
            }
            WriteServerGroupProfile { group, profile } => {
                if !domain.profiles.contains_key(profile) {
                    return Err(self.missing_reference(ElementKind::Profile, profile));
                }
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                target.profile = profile.clone();
                Ok(())
            }
            WriteServerGroupSocketBindingGroup {
                group,
                socket_binding_group,
            } => {
                if !domain
                    .socket_binding_groups
                    .contains_key(socket_binding_group)
                {
                    return Err(self.missing_reference(
                        ElementKind::SocketBindingGroup,
                        socket_binding_group,
                    ));
                }
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                target.socket_binding_group = socket_binding_group.clone();
                Ok(())
            }
            WriteServerGroupPortOffset { group, port_offset } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                target.port_offset = *port_offset;
                Ok(())
            }
            WriteServerGroupJvm { group, jvm } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                target.jvm = jvm.clone();
                Ok(())
            }
            SetServerGroupProperty { group, name, value } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                target
                    .system_properties
                    .insert(name.clone(), value.clone());
                Ok(())
            }
            RemoveServerGroupProperty { group, name } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                if target.system_properties.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::SystemProperty, name));
                }
                Ok(())
            }
            AddDeployment { deployment } => {
                // Deployment names are globally unique within the domain.
                if domain.deployments.contains_key(&deployment.name) {
                    return Err(self.duplicate(ElementKind::Deployment, &deployment.name));
                }
                domain
                    .deployments
                    .insert(deployment.name.clone(), deployment.clone());
                Ok(())
            }
            RemoveDeployment { name } => {
                if !domain.deployments.contains_key(name) {
                    return Err(self.not_found(ElementKind::Deployment, name));
                }
                let referrers = domain.groups_mapping_deployment(name);
                if !referrers.is_empty() {
                    return Err(UpdateError::StillReferenced {
                        kind: ElementKind::Deployment,
                        name: name.clone(),
                        referrers,
                        address: self.address(),
                    });
                }
                domain.deployments.remove(name);
                Ok(())
            }
            ReplaceDeployment {
                name,
                runtime_name,
                hash,
            } => {
                let target = domain
                    .deployments
                    .get_mut(name)
                    .ok_or_else(|| self.not_found(ElementKind::Deployment, name))?;
                target.runtime_name = runtime_name.clone();
                target.hash = hash.clone();
                Ok(())
            }
            MapDeployment {
                group,
                deployment,
                start,
            } => {
                if !domain.deployments.contains_key(deployment) {
                    return Err(self.missing_reference(ElementKind::Deployment, deployment));
                }
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                if target.maps_deployment(deployment) {
                    return Err(self.duplicate(ElementKind::Deployment, deployment));
                }
                target
                    .deployments
                    .insert(deployment.clone(), DeploymentBinding { start: *start });
                Ok(())
            }
            UnmapDeployment { group, deployment } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                if target.deployments.remove(deployment).is_none() {
                    return Err(self.not_found(ElementKind::Deployment, deployment));
                }
                Ok(())
            }
            WriteDeploymentStart {
                group,
                deployment,
                start,
            } => {
                let target = domain
                    .server_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::ServerGroup, group))?;
                let binding = target
                    .deployments
                    .get_mut(deployment)
                    .ok_or_else(|| self.not_found(ElementKind::Deployment, deployment))?;
                binding.start = *start;
                Ok(())
            }
            AddPath { path } => {
                if domain.paths.contains_key(&path.name) {
                    return Err(self.duplicate(ElementKind::Path, &path.name));
                }
                domain.paths.insert(path.name.clone(), path.clone());
                Ok(())
            }
            WritePath { path } => {
                if !domain.paths.contains_key(&path.name) {
                    return Err(self.not_found(ElementKind::Path, &path.name));
                }
                domain.paths.insert(path.name.clone(), path.clone());
                Ok(())
            }
            RemovePath { name } => {
                if domain.paths.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Path, name));
                }
                Ok(())
            }
            AddInterface { interface } => {
                if domain.interfaces.contains_key(&interface.name) {
                    return Err(self.duplicate(ElementKind::Interface, &interface.name));
                }
                domain
                    .interfaces
                    .insert(interface.name.clone(), interface.clone());
                Ok(())
            }
            WriteInterface { interface } => {
                if !domain.interfaces.contains_key(&interface.name) {
                    return Err(self.not_found(ElementKind::Interface, &interface.name));
                }
                domain
                    .interfaces
                    .insert(interface.name.clone(), interface.clone());
                Ok(())
            }
            RemoveInterface { name } => {
                if domain.interfaces.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Interface, name));
                }
                Ok(())
            }
            AddSocketBindingGroup { group } => {
                if domain.socket_binding_groups.contains_key(&group.name) {
                    return Err(self.duplicate(ElementKind::SocketBindingGroup, &group.name));
                }
                for include in &group.includes {
                    if !domain.socket_binding_groups.contains_key(include) {
                        return Err(
                            self.missing_reference(ElementKind::SocketBindingGroup, include)
                        );
                    }
                }
                domain
                    .socket_binding_groups
                    .insert(group.name.clone(), group.clone());
                Ok(())
            }
            RemoveSocketBindingGroup { name } => {
                if !domain.socket_binding_groups.contains_key(name) {
                    return Err(self.not_found(ElementKind::SocketBindingGroup, name));
                }
                let mut referrers = domain.groups_referencing_socket_binding_group(name);
                referrers.extend(
                    domain
                        .socket_binding_groups
                        .values()
                        .filter(|g| g.includes.iter().any(|i| i == name))
                        .map(|g| g.name.clone()),
                );
                if !referrers.is_empty() {
                    return Err(UpdateError::StillReferenced {
                        kind: ElementKind::SocketBindingGroup,
                        name: name.clone(),
                        referrers,
                        address: self.address(),
                    });
                }
                domain.socket_binding_groups.remove(name);
                Ok(())
            }
            WriteSocketBinding { group, binding } => {
                let target = domain
                    .socket_binding_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::SocketBindingGroup, group))?;
                target
                    .bindings
                    .insert(binding.name.clone(), binding.clone());
                Ok(())
            }
            RemoveSocketBinding { group, binding } => {
                let target = domain
                    .socket_binding_groups
                    .get_mut(group)
                    .ok_or_else(|| self.not_found(ElementKind::SocketBindingGroup, group))?;
                if target.bindings.remove(binding).is_none() {
                    return Err(self.not_found(ElementKind::SocketBindingGroup, binding));
                }
                Ok(())
            }
            SetSystemProperty { name, value } => {
                domain
                    .system_properties
                    .insert(name.clone(), value.clone());
                Ok(())
            }
            RemoveSystemProperty { name } => {
                if domain.system_properties.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::SystemProperty, name));
                }
                Ok(())
            }
            AddExtension { module } => {
                if !domain.extensions.insert(module.clone()) {
                    return Err(self.duplicate(ElementKind::Extension, module));
                }
                Ok(())
            }
            RemoveExtension { module } => {
                if !domain.extensions.remove(module) {
                    return Err(self.not_found(ElementKind::Extension, module));
                }
                Ok(())
            }
        }
    }

    /// Derive the inverse update from the pre-update state
    ///
    /// Must be called with the model as it was before [`Self::apply`] ran.
    /// Returns `None` when the pre-state already satisfied the update, in
    /// which case there is nothing to compensate.
    pub fn compensating(&self, pre: &DomainModel) -> Option<DomainUpdate> {
        use DomainUpdate::*;
        match self {
            AddProfile { name } => Some(RemoveProfile { name: name.clone() }),
            RemoveProfile { name } => Some(AddProfile { name: name.clone() }),
            AddProfileInclude { profile, include } => Some(RemoveProfileInclude {
                profile: profile.clone(),
                include: include.clone(),
            }),
            RemoveProfileInclude { profile, include } => Some(AddProfileInclude {
                profile: profile.clone(),
                include: include.clone(),
            }),
            AddSubsystem { profile, subsystem } => Some(RemoveSubsystem {
                profile: profile.clone(),
                subsystem: subsystem.name.clone(),
            }),
            RemoveSubsystem { profile, subsystem } => {
                let config = pre.profile(profile)?.subsystem(subsystem)?.clone();
                Some(AddSubsystem {
                    profile: profile.clone(),
                    subsystem: config,
                })
            }
            WriteSubsystemAttribute {
                profile,
                subsystem,
                attribute,
                value,
            } => {
                let old = pre
                    .profile(profile)?
                    .subsystem(subsystem)?
                    .attributes
                    .get(attribute)
                    .cloned()
                    .unwrap_or(Value::Null);
                if &old == value {
                    return None;
                }
                Some(WriteSubsystemAttribute {
                    profile: profile.clone(),
                    subsystem: subsystem.clone(),
                    attribute: attribute.clone(),
                    value: old,
                })
            }
            AddServerGroup { group } => Some(RemoveServerGroup {
                name: group.name.clone(),
            }),
            RemoveServerGroup { name } => Some(AddServerGroup {
                group: pre.server_group(name)?.clone(),
            }),
            WriteServerGroupProfile { group, profile } => {
                let old = &pre.server_group(group)?.profile;
                if old == profile {
                    return None;
                }
                Some(WriteServerGroupProfile {
                    group: group.clone(),
                    profile: old.clone(),
                })
            }
            WriteServerGroupSocketBindingGroup {
                group,
                socket_binding_group,
            } => {
                let old = &pre.server_group(group)?.socket_binding_group;
                if old == socket_binding_group {
                    return None;
                }
                Some(WriteServerGroupSocketBindingGroup {
                    group: group.clone(),
                    socket_binding_group: old.clone(),
                })
            }
            WriteServerGroupPortOffset { group, port_offset } => {
                let old = pre.server_group(group)?.port_offset;
                if old == *port_offset {
                    return None;
                }
                Some(WriteServerGroupPortOffset {
                    group: group.clone(),
                    port_offset: old,
                })
            }
            WriteServerGroupJvm { group, jvm } => {
                let old = &pre.server_group(group)?.jvm;
                if old == jvm {
                    return None;
                }
                Some(WriteServerGroupJvm {
                    group: group.clone(),
                    jvm: old.clone(),
                })
            }
            SetServerGroupProperty { group, name, value } => {
                match pre.server_group(group)?.system_properties.get(name) {
                    Some(old) if old == value => None,
                    Some(old) => Some(SetServerGroupProperty {
                        group: group.clone(),
                        name: name.clone(),
                        value: old.clone(),
                    }),
                    None => Some(RemoveServerGroupProperty {
                        group: group.clone(),
                        name: name.clone(),
                    }),
                }
            }
            RemoveServerGroupProperty { group, name } => {
                let old = pre.server_group(group)?.system_properties.get(name)?;
                Some(SetServerGroupProperty {
                    group: group.clone(),
                    name: name.clone(),
                    value: old.clone(),
                })
            }
            AddDeployment { deployment } => Some(RemoveDeployment {
                name: deployment.name.clone(),
            }),
            RemoveDeployment { name } => Some(AddDeployment {
                deployment: pre.deployment(name)?.clone(),
            }),
            ReplaceDeployment {
                name,
                runtime_name,
                hash,
            } => {
                let old = pre.deployment(name)?;
                if &old.runtime_name == runtime_name && &old.hash == hash {
                    return None;
                }
                Some(ReplaceDeployment {
                    name: name.clone(),
                    runtime_name: old.runtime_name.clone(),
                    hash: old.hash.clone(),
                })
            }
            MapDeployment {
                group, deployment, ..
            } => Some(UnmapDeployment {
                group: group.clone(),
                deployment: deployment.clone(),
            }),
            UnmapDeployment { group, deployment } => {
                let binding = pre.server_group(group)?.deployments.get(deployment)?;
                Some(MapDeployment {
                    group: group.clone(),
                    deployment: deployment.clone(),
                    start: binding.start,
                })
            }
            WriteDeploymentStart {
                group,
                deployment,
                start,
            } => {
                let binding = pre.server_group(group)?.deployments.get(deployment)?;
                if binding.start == *start {
                    return None;
                }
                Some(WriteDeploymentStart {
                    group: group.clone(),
                    deployment: deployment.clone(),
                    start: binding.start,
                })
            }
            AddPath { path } => Some(RemovePath {
                name: path.name.clone(),
            }),
            WritePath { path } => {
                let old = pre.paths.get(&path.name)?;
                if old == path {
                    return None;
                }
                Some(WritePath { path: old.clone() })
            }
            RemovePath { name } => Some(AddPath {
                path: pre.paths.get(name)?.clone(),
            }),
            AddInterface { interface } => Some(RemoveInterface {
                name: interface.name.clone(),
            }),
            WriteInterface { interface } => {
                let old = pre.interfaces.get(&interface.name)?;
                if old == interface {
                    return None;
                }
                Some(WriteInterface {
                    interface: old.clone(),
                })
            }
            RemoveInterface { name } => Some(AddInterface {
                interface: pre.interfaces.get(name)?.clone(),
            }),
            AddSocketBindingGroup { group } => Some(RemoveSocketBindingGroup {
                name: group.name.clone(),
            }),
            RemoveSocketBindingGroup { name } => Some(AddSocketBindingGroup {
                group: pre.socket_binding_groups.get(name)?.clone(),
            }),
            WriteSocketBinding { group, binding } => {
                match pre
                    .socket_binding_groups
                    .get(group)?
                    .bindings
                    .get(&binding.name)
                {
                    Some(old) if old == binding => None,
                    Some(old) => Some(WriteSocketBinding {
                        group: group.clone(),
                        binding: old.clone(),
                    }),
                    None => Some(RemoveSocketBinding {
                        group: group.clone(),
                        binding: binding.name.clone(),
                    }),
                }
            }
            RemoveSocketBinding { group, binding } => {
                let old = pre
                    .socket_binding_groups
                    .get(group)?
                    .bindings
                    .get(binding)?;
                Some(WriteSocketBinding {
                    group: group.clone(),
                    binding: old.clone(),
                })
            }
            SetSystemProperty { name, value } => match pre.system_properties.get(name) {
                Some(old) if old == value => None,
                Some(old) => Some(SetSystemProperty {
                    name: name.clone(),
                    value: old.clone(),
                }),
                None => Some(RemoveSystemProperty { name: name.clone() }),
            },
            RemoveSystemProperty { name } => {
                let old = pre.system_properties.get(name)?;
                Some(SetSystemProperty {
                    name: name.clone(),
                    value: old.clone(),
                })
            }
            AddExtension { module } => Some(RemoveExtension {
                module: module.clone(),
            }),
            RemoveExtension { module } => Some(AddExtension {
                module: module.clone(),
            }),
        }
    }

    /// The runtime-level command this change projects onto a running server
    ///
    /// `None` means the change only affects future launches. Needs the
    /// domain model because deployment mappings are enriched with the
    /// runtime name and content hash registered at domain level.
    pub fn server_update(&self, domain: &DomainModel) -> Option<ServerUpdate> {
        use DomainUpdate::*;
        match self {
            AddProfile { .. }
            | RemoveProfile { .. }
            | AddProfileInclude { .. }
            | RemoveProfileInclude { .. }
            | AddServerGroup { .. }
            | RemoveServerGroup { .. }
            | AddDeployment { .. }
            | RemoveDeployment { .. }
            | AddSocketBindingGroup { .. }
            | RemoveSocketBindingGroup { .. } => None,

            AddSubsystem { subsystem, .. } => Some(ServerUpdate::AddSubsystem {
                subsystem: subsystem.clone(),
            }),
            RemoveSubsystem { subsystem, .. } => Some(ServerUpdate::RemoveSubsystem {
                subsystem: subsystem.clone(),
            }),
            WriteSubsystemAttribute {
                subsystem,
                attribute,
                value,
                ..
            } => Some(ServerUpdate::WriteSubsystemAttribute {
                subsystem: subsystem.clone(),
                attribute: attribute.clone(),
                value: value.clone(),
            }),

            WriteServerGroupProfile { .. }
            | WriteServerGroupSocketBindingGroup { .. }
            | WriteServerGroupPortOffset { .. }
            | WriteServerGroupJvm { .. } => Some(ServerUpdate::RestartRequired),

            SetServerGroupProperty { name, value, .. } => {
                Some(ServerUpdate::SetSystemProperty {
                    name: name.clone(),
                    value: Some(value.clone()),
                })
            }
            RemoveServerGroupProperty { name, .. } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: None,
            }),

            ReplaceDeployment {
                name,
                runtime_name,
                hash,
            } => Some(ServerUpdate::Redeploy {
                name: name.clone(),
                runtime_name: runtime_name.clone(),
                hash: hash.clone(),
            }),
            MapDeployment {
                deployment, start, ..
            } => {
                let meta = domain.deployment(deployment)?;
                Some(ServerUpdate::Deploy {
                    name: meta.name.clone(),
                    runtime_name: meta.runtime_name.clone(),
                    hash: meta.hash.clone(),
                    start: *start,
                })
            }
            UnmapDeployment { deployment, .. } => Some(ServerUpdate::Undeploy {
                name: deployment.clone(),
            }),
            WriteDeploymentStart {
                deployment, start, ..
            } => {
                if *start {
                    let meta = domain.deployment(deployment)?;
                    Some(ServerUpdate::Deploy {
                        name: meta.name.clone(),
                        runtime_name: meta.runtime_name.clone(),
                        hash: meta.hash.clone(),
                        start: true,
                    })
                } else {
                    Some(ServerUpdate::Undeploy {
                        name: deployment.clone(),
                    })
                }
            }

            AddPath { path } | WritePath { path } => {
                if path.is_declaration_only() {
                    None
                } else {
                    Some(ServerUpdate::SetPath { path: path.clone() })
                }
            }
            RemovePath { name } => Some(ServerUpdate::RemovePath { name: name.clone() }),
            AddInterface { interface } | WriteInterface { interface } => {
                if interface.is_declaration_only() {
                    None
                } else {
                    Some(ServerUpdate::SetInterface {
                        interface: interface.clone(),
                    })
                }
            }
            RemoveInterface { name } => Some(ServerUpdate::RemoveInterface {
                name: name.clone(),
            }),

            WriteSocketBinding { binding, .. } => Some(ServerUpdate::SetSocketBinding {
                binding: binding.clone(),
            }),
            RemoveSocketBinding { binding, .. } => Some(ServerUpdate::RemoveSocketBinding {
                name: binding.clone(),
            }),

            SetSystemProperty { name, value } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: Some(value.clone()),
            }),
            RemoveSystemProperty { name } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: None,
            }),

            AddExtension { module } => Some(ServerUpdate::AddExtension {
                module: module.clone(),
            }),
            RemoveExtension { module } => Some(ServerUpdate::RemoveExtension {
                module: module.clone(),
            }),
        }
    }

    /// Names of active servers on `host` whose running configuration this
    /// update changes
    pub fn affected_servers(&self, domain: &DomainModel, host: &HostModel) -> Vec<String> {
        projection::affected_by_domain_update(self, domain, host)
    }

    fn not_found(&self, kind: ElementKind, name: &str) -> UpdateError {
        UpdateError::NotFound {
            kind,
            name: name.to_string(),
            address: self.address(),
        }
    }

    fn duplicate(&self, kind: ElementKind, name: &str) -> UpdateError {
        UpdateError::Duplicate {
            kind,
            name: name.to_string(),
            address: self.address(),
        }
    }

    fn missing_reference(&self, kind: ElementKind, target: &str) -> UpdateError {
        UpdateError::MissingReference {
            kind,
            target: target.to_string(),
            address: self.address(),
        }
    }
}
