//! Domain-to-server projection
//!
//! Computes which currently active servers a domain/host-level change
//! reaches, given the authoritative domain model and one host's model.
//!
//! The reach of an update falls into one of four classes: no servers
//! (config-time-only change), the servers of one named group, the servers
//! of every group whose resolved profile (or socket-binding-group) is in
//! the transitive include closure of the changed element, or all active
//! servers filtered by overrides. Override resolution then excludes any
//! server that declares its own value for the same named attribute - and,
//! for domain-scoped paths/interfaces/properties, the whole host when the
//! host declares one - because the more specific level already reflects
//! the intended value.
//!
//! Precedence is deliberately asymmetric across attribute kinds (it
//! mirrors the production rule set): socket-binding-group changes are only
//! filtered by a server's own binding-group override, and JVM changes
//! mark the servers that launch with the named settings restart-required.

use std::collections::BTreeSet;

use crate::model::{DomainModel, HostModel};
use crate::update::{DomainUpdate, HostUpdate};

/// Active servers of one group, sorted by name
pub fn servers_for_group(host: &HostModel, group: &str) -> Vec<String> {
    host.servers
        .values()
        .filter(|s| s.is_active() && s.group == group)
        .map(|s| s.name.clone())
        .collect()
}

/// All active servers on the host, sorted by name
pub fn all_active_servers(host: &HostModel) -> Vec<String> {
    host.active_servers()
}

/// Servers affected by a change inside the named profile
///
/// Walks the profiles that include the changed one (directly or
/// transitively) and collects the active servers of every group running
/// any of them. A profile no group uses yields an empty list.
pub fn servers_for_profile_change(
    domain: &DomainModel,
    host: &HostModel,
    profile: &str,
) -> Vec<String> {
    let related = domain.profile_includers(profile);
    let mut result = BTreeSet::new();
    for group in domain.server_groups.values() {
        if related.contains(&group.profile) {
            result.extend(servers_for_group(host, &group.name));
        }
    }
    result.into_iter().collect()
}

/// Servers affected by a change inside the named socket-binding-group
///
/// Same closure walk as profiles; a server that declares its own
/// binding-group override is excluded unless the override names the
/// changed group itself.
pub fn servers_for_socket_binding_group_change(
    domain: &DomainModel,
    host: &HostModel,
    group: &str,
) -> Vec<String> {
    let related = domain.socket_binding_group_includers(group);
    let mut result = BTreeSet::new();
    for server_group in domain.server_groups.values() {
        if !related.contains(&server_group.socket_binding_group) {
            continue;
        }
        for name in servers_for_group(host, &server_group.name) {
            let server = &host.servers[&name];
            match &server.socket_binding_group {
                Some(own) if own != group => continue,
                _ => {
                    result.insert(name);
                }
            }
        }
    }
    result.into_iter().collect()
}

/// Servers affected by a domain-level path change
///
/// The host shadows the domain entirely; otherwise every active server
/// that does not declare the path itself.
pub fn servers_for_domain_path(host: &HostModel, path: &str) -> Vec<String> {
    if host.declares_path(path) {
        return Vec::new();
    }
    servers_for_host_path(host, path)
}

/// Servers affected by a host-level path change
pub fn servers_for_host_path(host: &HostModel, path: &str) -> Vec<String> {
    host.servers
        .values()
        .filter(|s| s.is_active() && !s.declares_path(path))
        .map(|s| s.name.clone())
        .collect()
}

/// Servers affected by a domain-level interface change
pub fn servers_for_domain_interface(host: &HostModel, interface: &str) -> Vec<String> {
    if host.declares_interface(interface) {
        return Vec::new();
    }
    servers_for_host_interface(host, interface)
}

/// Servers affected by a host-level interface change
pub fn servers_for_host_interface(host: &HostModel, interface: &str) -> Vec<String> {
    host.servers
        .values()
        .filter(|s| s.is_active() && !s.declares_interface(interface))
        .map(|s| s.name.clone())
        .collect()
}

/// Servers affected by a domain-level system property change
///
/// Checks the host, the server, and the server's group for an override of
/// the same property name, most specific first.
pub fn servers_for_domain_property(
    domain: &DomainModel,
    host: &HostModel,
    property: &str,
) -> Vec<String> {
    if host.declares_system_property(property) {
        return Vec::new();
    }
    host.servers
        .values()
        .filter(|s| s.is_active() && !s.declares_system_property(property))
        .filter(|s| {
            domain
                .server_group(&s.group)
                .map(|g| !g.declares_system_property(property))
                .unwrap_or(true)
        })
        .map(|s| s.name.clone())
        .collect()
}

/// Servers affected by a server-group-level system property change
pub fn servers_for_group_property(host: &HostModel, group: &str, property: &str) -> Vec<String> {
    if host.declares_system_property(property) {
        return Vec::new();
    }
    host.servers
        .values()
        .filter(|s| {
            s.is_active() && s.group == group && !s.declares_system_property(property)
        })
        .map(|s| s.name.clone())
        .collect()
}

/// Active servers whose launch configuration references the named JVM
pub fn servers_for_host_jvm(host: &HostModel, jvm: &str) -> Vec<String> {
    host.servers
        .values()
        .filter(|s| {
            s.is_active() && s.jvm.as_ref().map(|j| j.name == jvm).unwrap_or(false)
        })
        .map(|s| s.name.clone())
        .collect()
}

/// Servers affected by a host-level system property change
pub fn servers_for_host_property(host: &HostModel, property: &str) -> Vec<String> {
    host.servers
        .values()
        .filter(|s| s.is_active() && !s.declares_system_property(property))
        .map(|s| s.name.clone())
        .collect()
}

/// Active servers of every group that maps the deployment
pub fn servers_for_deployment(
    domain: &DomainModel,
    host: &HostModel,
    deployment: &str,
) -> Vec<String> {
    let mut result = BTreeSet::new();
    for group in domain.groups_mapping_deployment(deployment) {
        result.extend(servers_for_group(host, &group));
    }
    result.into_iter().collect()
}

/// Reach of a domain-scoped update
pub fn affected_by_domain_update(
    update: &DomainUpdate,
    domain: &DomainModel,
    host: &HostModel,
) -> Vec<String> {
    use DomainUpdate::*;
    match update {
        // Structural changes with no runtime counterpart.
        AddProfile { .. }
        | RemoveProfile { .. }
        | AddProfileInclude { .. }
        | RemoveProfileInclude { .. }
        | AddServerGroup { .. }
        | RemoveServerGroup { .. }
        | AddDeployment { .. }
        | RemoveDeployment { .. }
        | AddSocketBindingGroup { .. }
        | RemoveSocketBindingGroup { .. } => Vec::new(),

        AddSubsystem { profile, .. }
        | RemoveSubsystem { profile, .. }
        | WriteSubsystemAttribute { profile, .. } => {
            servers_for_profile_change(domain, host, profile)
        }

        WriteServerGroupProfile { group, .. }
        | WriteServerGroupPortOffset { group, .. }
        | WriteServerGroupJvm { group, .. }
        | MapDeployment { group, .. }
        | UnmapDeployment { group, .. }
        | WriteDeploymentStart { group, .. } => servers_for_group(host, group),

        // A server with its own binding-group override keeps it across a
        // group rewire, so the rewire never reaches that server.
        WriteServerGroupSocketBindingGroup { group, .. } => host
            .servers
            .values()
            .filter(|s| {
                s.is_active() && s.group == *group && s.socket_binding_group.is_none()
            })
            .map(|s| s.name.clone())
            .collect(),

        SetServerGroupProperty { group, name, .. }
        | RemoveServerGroupProperty { group, name } => {
            servers_for_group_property(host, group, name)
        }

        ReplaceDeployment { name, .. } => servers_for_deployment(domain, host, name),

        AddPath { path } | WritePath { path } => {
            if path.is_declaration_only() {
                Vec::new()
            } else {
                servers_for_domain_path(host, &path.name)
            }
        }
        RemovePath { name } => servers_for_domain_path(host, name),

        AddInterface { interface } | WriteInterface { interface } => {
            if interface.is_declaration_only() {
                Vec::new()
            } else {
                servers_for_domain_interface(host, &interface.name)
            }
        }
        RemoveInterface { name } => servers_for_domain_interface(host, name),

        WriteSocketBinding { group, .. } | RemoveSocketBinding { group, .. } => {
            servers_for_socket_binding_group_change(domain, host, group)
        }

        SetSystemProperty { name, .. } | RemoveSystemProperty { name } => {
            servers_for_domain_property(domain, host, name)
        }

        AddExtension { .. } | RemoveExtension { .. } => all_active_servers(host),
    }
}

/// Reach of a host-scoped update
pub fn affected_by_host_update(update: &HostUpdate, host: &HostModel) -> Vec<String> {
    use HostUpdate::*;
    match update {
        AddServer { .. } | RemoveServer { .. } | WriteServerAutoStart { .. } => Vec::new(),

        // JVM settings are read at launch; a change marks the servers
        // using them restart-required.
        WriteServerJvm { server, .. } => active_singleton(host, server),
        AddJvm { jvm } => servers_for_host_jvm(host, &jvm.name),
        RemoveJvm { name } => servers_for_host_jvm(host, name),

        WriteServerGroup { server, .. }
        | WriteServerSocketBindingGroup { server, .. }
        | WriteServerPortOffset { server, .. }
        | SetServerProperty { server, .. }
        | RemoveServerProperty { server, .. }
        | RemoveServerPath { server, .. } => active_singleton(host, server),

        AddServerPath { server, path } => {
            if path.is_declaration_only() {
                Vec::new()
            } else {
                active_singleton(host, server)
            }
        }

        SetHostProperty { name, .. } | RemoveHostProperty { name } => {
            servers_for_host_property(host, name)
        }

        AddHostPath { path } => {
            if path.is_declaration_only() {
                Vec::new()
            } else {
                servers_for_host_path(host, &path.name)
            }
        }
        RemoveHostPath { name } => servers_for_host_path(host, name),

        AddHostInterface { interface } => {
            if interface.is_declaration_only() {
                Vec::new()
            } else {
                servers_for_host_interface(host, &interface.name)
            }
        }
        RemoveHostInterface { name } => servers_for_host_interface(host, name),
    }
}

fn active_singleton(host: &HostModel, server: &str) -> Vec<String> {
    match host.server(server) {
        Some(s) if s.is_active() => vec![s.name.clone()],
        _ => Vec::new(),
    }
}
