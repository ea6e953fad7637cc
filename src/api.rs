//! The kernel's application surface
//!
//! Updates know how to apply themselves, but only to the single model they
//! address. The functions here add the cross-model checks a coordinator
//! needs: a domain-level remove must not orphan servers defined on host
//! models the domain model cannot see. They also pair application with
//! compensation capture, so a caller rolling out a change across a fleet
//! holds the inverse before the first peer ever sees the update.

use tracing::debug;

use crate::error::{ElementKind, KernelResult, UpdateError};
use crate::model::{DomainModel, HostModel};
use crate::update::{DomainUpdate, HostUpdate};

/// Apply a domain update, checking references from the given host models
///
/// `hosts` are the host models known to the coordinator. Removing a
/// server-group or socket-binding-group that a server on any of them still
/// uses fails with `StillReferenced` before the domain model is touched.
pub fn apply_domain_update(
    domain: &mut DomainModel,
    hosts: &[&HostModel],
    update: &DomainUpdate,
) -> KernelResult<()> {
    check_host_references(hosts, update)?;
    update.apply(domain)?;
    debug!(address = %update.address(), "applied domain update");
    Ok(())
}

/// Apply a domain update and return its compensating update
///
/// The inverse is derived from the pre-application state, so it exists
/// before any mutation happens. `None` means the update was a no-op write
/// and there is nothing to undo. On failure the model is untouched and no
/// compensation is produced.
pub fn apply_with_compensation(
    domain: &mut DomainModel,
    hosts: &[&HostModel],
    update: &DomainUpdate,
) -> KernelResult<Option<DomainUpdate>> {
    check_host_references(hosts, update)?;
    let compensation = update.compensating(domain);
    update.apply(domain)?;
    debug!(
        address = %update.address(),
        reversible = compensation.is_some(),
        "applied domain update"
    );
    Ok(compensation)
}

/// Apply a host update against its host model
///
/// The domain model is consulted read-only for references the host model
/// introduces (a new server's group, for instance).
pub fn apply_host_update(
    host: &mut HostModel,
    domain: &DomainModel,
    update: &HostUpdate,
) -> KernelResult<()> {
    update.apply(host, domain)?;
    debug!(host = %host.name, address = %update.address(), "applied host update");
    Ok(())
}

/// Apply a host update and return its compensating update
pub fn apply_host_with_compensation(
    host: &mut HostModel,
    domain: &DomainModel,
    update: &HostUpdate,
) -> KernelResult<Option<HostUpdate>> {
    let compensation = update.compensating(host);
    update.apply(host, domain)?;
    Ok(compensation)
}

/// The active servers on `host` that `update` reaches
pub fn affected_servers(
    update: &DomainUpdate,
    domain: &DomainModel,
    host: &HostModel,
) -> Vec<String> {
    update.affected_servers(domain, host)
}

/// Removes that would orphan references held by host models
fn check_host_references(hosts: &[&HostModel], update: &DomainUpdate) -> KernelResult<()> {
    match update {
        DomainUpdate::RemoveServerGroup { name } => {
            let referrers = servers_matching(hosts, |s| s.group == *name);
            if !referrers.is_empty() {
                return Err(UpdateError::StillReferenced {
                    kind: ElementKind::ServerGroup,
                    name: name.clone(),
                    referrers,
                    address: update.address(),
                });
            }
        }
        DomainUpdate::RemoveSocketBindingGroup { name } => {
            let referrers =
                servers_matching(hosts, |s| s.socket_binding_group.as_deref() == Some(name));
            if !referrers.is_empty() {
                return Err(UpdateError::StillReferenced {
                    kind: ElementKind::SocketBindingGroup,
                    name: name.clone(),
                    referrers,
                    address: update.address(),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

fn servers_matching(
    hosts: &[&HostModel],
    predicate: impl Fn(&crate::model::ServerConfig) -> bool,
) -> Vec<String> {
    let mut referrers = Vec::new();
    for host in hosts {
        for server in host.servers.values() {
            if predicate(server) {
                referrers.push(format!("{}/{}", host.name, server.name));
            }
        }
    }
    referrers
}
