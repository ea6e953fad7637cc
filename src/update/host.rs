//! Host-scoped updates
//!
//! Mutations of one host's model: the servers configured there and the
//! host-level overrides of domain resources. Apply takes a read-only view
//! of the domain model for referential checks (a server must join an
//! existing group), mirroring the read-only domain copy each host agent
//! holds.

use serde::{Deserialize, Serialize};

use crate::address::ResourceAddress;
use crate::error::{ElementKind, KernelResult, UpdateError};
use crate::model::{
    DomainModel, HostModel, InterfaceSpec, JvmConfig, PathSpec, ServerConfig,
};
use crate::projection;
use crate::update::ServerUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum HostUpdate {
    // --- servers ---
    AddServer {
        server: ServerConfig,
    },
    RemoveServer {
        name: String,
    },
    WriteServerAutoStart {
        server: String,
        auto_start: bool,
    },
    /// Move a server to another group
    WriteServerGroup {
        server: String,
        group: String,
    },
    WriteServerSocketBindingGroup {
        server: String,
        socket_binding_group: Option<String>,
    },
    WriteServerPortOffset {
        server: String,
        port_offset: Option<u16>,
    },
    SetServerProperty {
        server: String,
        name: String,
        value: String,
    },
    RemoveServerProperty {
        server: String,
        name: String,
    },
    AddServerPath {
        server: String,
        path: PathSpec,
    },
    RemoveServerPath {
        server: String,
        name: String,
    },
    WriteServerJvm {
        server: String,
        jvm: Option<JvmConfig>,
    },

    // --- host-wide overrides ---
    SetHostProperty {
        name: String,
        value: String,
    },
    RemoveHostProperty {
        name: String,
    },
    AddHostPath {
        path: PathSpec,
    },
    RemoveHostPath {
        name: String,
    },
    AddHostInterface {
        interface: InterfaceSpec,
    },
    RemoveHostInterface {
        name: String,
    },
    AddJvm {
        jvm: JvmConfig,
    },
    RemoveJvm {
        name: String,
    },
}

impl HostUpdate {
    /// Address of the element this update targets
    pub fn address(&self) -> ResourceAddress {
        use HostUpdate::*;
        match self {
            AddServer { server } => {
                ResourceAddress::root().child("server-config", &server.name)
            }
            RemoveServer { name } => ResourceAddress::root().child("server-config", name),
            WriteServerAutoStart { server, .. }
            | WriteServerGroup { server, .. }
            | WriteServerSocketBindingGroup { server, .. }
            | WriteServerPortOffset { server, .. }
            | WriteServerJvm { server, .. } => {
                ResourceAddress::root().child("server-config", server)
            }
            SetServerProperty { server, name, .. } | RemoveServerProperty { server, name } => {
                ResourceAddress::root()
                    .child("server-config", server)
                    .child("system-property", name)
            }
            AddServerPath { server, path } => ResourceAddress::root()
                .child("server-config", server)
                .child("path", &path.name),
            RemoveServerPath { server, name } => ResourceAddress::root()
                .child("server-config", server)
                .child("path", name),
            SetHostProperty { name, .. } | RemoveHostProperty { name } => {
                ResourceAddress::root().child("system-property", name)
            }
            AddHostPath { path } => ResourceAddress::root().child("path", &path.name),
            RemoveHostPath { name } => ResourceAddress::root().child("path", name),
            AddHostInterface { interface } => {
                ResourceAddress::root().child("interface", &interface.name)
            }
            RemoveHostInterface { name } => ResourceAddress::root().child("interface", name),
            AddJvm { jvm } => ResourceAddress::root().child("jvm", &jvm.name),
            RemoveJvm { name } => ResourceAddress::root().child("jvm", name),
        }
    }

    /// Apply this update to the host model
    ///
    /// `domain` is consulted read-only for referential checks. On error
    /// the host model is unchanged.
    pub fn apply(&self, host: &mut HostModel, domain: &DomainModel) -> KernelResult<()> {
        use HostUpdate::*;
        match self {
            AddServer { server } => {
                if host.servers.contains_key(&server.name) {
                    return Err(self.duplicate(ElementKind::Server, &server.name));
                }
                if !domain.server_groups.contains_key(&server.group) {
                    return Err(self.missing_reference(ElementKind::ServerGroup, &server.group));
                }
                if let Some(sbg) = &server.socket_binding_group {
                    if !domain.socket_binding_groups.contains_key(sbg) {
                        return Err(
                            self.missing_reference(ElementKind::SocketBindingGroup, sbg)
                        );
                    }
                }
                host.servers.insert(server.name.clone(), server.clone());
                Ok(())
            }
            RemoveServer { name } => {
                if host.servers.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Server, name));
                }
                Ok(())
            }
            WriteServerAutoStart { server, auto_start } => {
                let target = self.server_mut(host, server)?;
                target.auto_start = *auto_start;
                Ok(())
            }
            WriteServerGroup { server, group } => {
                if !domain.server_groups.contains_key(group) {
                    return Err(self.missing_reference(ElementKind::ServerGroup, group));
                }
                let target = self.server_mut(host, server)?;
                target.group = group.clone();
                Ok(())
            }
            WriteServerSocketBindingGroup {
                server,
                socket_binding_group,
            } => {
                if let Some(sbg) = socket_binding_group {
                    if !domain.socket_binding_groups.contains_key(sbg) {
                        return Err(
                            self.missing_reference(ElementKind::SocketBindingGroup, sbg)
                        );
                    }
                }
                let target = self.server_mut(host, server)?;
                target.socket_binding_group = socket_binding_group.clone();
                Ok(())
            }
            WriteServerPortOffset {
                server,
                port_offset,
            } => {
                let target = self.server_mut(host, server)?;
                target.port_offset = *port_offset;
                Ok(())
            }
            SetServerProperty {
                server,
                name,
                value,
            } => {
                let target = self.server_mut(host, server)?;
                target
                    .system_properties
                    .insert(name.clone(), value.clone());
                Ok(())
            }
            RemoveServerProperty { server, name } => {
                let target = self.server_mut(host, server)?;
                if target.system_properties.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::SystemProperty, name));
                }
                Ok(())
            }
            AddServerPath { server, path } => {
                let target = self.server_mut(host, server)?;
                if target.paths.contains_key(&path.name) {
                    return Err(self.duplicate(ElementKind::Path, &path.name));
                }
                target.paths.insert(path.name.clone(), path.clone());
                Ok(())
            }
            RemoveServerPath { server, name } => {
                let target = self.server_mut(host, server)?;
                if target.paths.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Path, name));
                }
                Ok(())
            }
            WriteServerJvm { server, jvm } => {
                let target = self.server_mut(host, server)?;
                target.jvm = jvm.clone();
                Ok(())
            }
            SetHostProperty { name, value } => {
                host.system_properties.insert(name.clone(), value.clone());
                Ok(())
            }
            RemoveHostProperty { name } => {
                if host.system_properties.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::SystemProperty, name));
                }
                Ok(())
            }
            AddHostPath { path } => {
                if host.paths.contains_key(&path.name) {
                    return Err(self.duplicate(ElementKind::Path, &path.name));
                }
                host.paths.insert(path.name.clone(), path.clone());
                Ok(())
            }
            RemoveHostPath { name } => {
                if host.paths.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Path, name));
                }
                Ok(())
            }
            AddHostInterface { interface } => {
                if host.interfaces.contains_key(&interface.name) {
                    return Err(self.duplicate(ElementKind::Interface, &interface.name));
                }
                host.interfaces
                    .insert(interface.name.clone(), interface.clone());
                Ok(())
            }
            RemoveHostInterface { name } => {
                if host.interfaces.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Interface, name));
                }
                Ok(())
            }
            AddJvm { jvm } => {
                if host.jvms.contains_key(&jvm.name) {
                    return Err(self.duplicate(ElementKind::Jvm, &jvm.name));
                }
                host.jvms.insert(jvm.name.clone(), jvm.clone());
                Ok(())
            }
            RemoveJvm { name } => {
                if host.jvms.remove(name).is_none() {
                    return Err(self.not_found(ElementKind::Jvm, name));
                }
                Ok(())
            }
        }
    }

    /// Derive the inverse update from the pre-update state
    pub fn compensating(&self, pre: &HostModel) -> Option<HostUpdate> {
        use HostUpdate::*;
        match self {
            AddServer { server } => Some(RemoveServer {
                name: server.name.clone(),
            }),
            RemoveServer { name } => Some(AddServer {
                server: pre.server(name)?.clone(),
            }),
            WriteServerAutoStart { server, auto_start } => {
                let old = pre.server(server)?.auto_start;
                if old == *auto_start {
                    return None;
                }
                Some(WriteServerAutoStart {
                    server: server.clone(),
                    auto_start: old,
                })
            }
            WriteServerGroup { server, group } => {
                let old = &pre.server(server)?.group;
                if old == group {
                    return None;
                }
                Some(WriteServerGroup {
                    server: server.clone(),
                    group: old.clone(),
                })
            }
            WriteServerSocketBindingGroup {
                server,
                socket_binding_group,
            } => {
                let old = &pre.server(server)?.socket_binding_group;
                if old == socket_binding_group {
                    return None;
                }
                Some(WriteServerSocketBindingGroup {
                    server: server.clone(),
                    socket_binding_group: old.clone(),
                })
            }
            WriteServerPortOffset {
                server,
                port_offset,
            } => {
                let old = pre.server(server)?.port_offset;
                if old == *port_offset {
                    return None;
                }
                Some(WriteServerPortOffset {
                    server: server.clone(),
                    port_offset: old,
                })
            }
            SetServerProperty {
                server,
                name,
                value,
            } => match pre.server(server)?.system_properties.get(name) {
                Some(old) if old == value => None,
                Some(old) => Some(SetServerProperty {
                    server: server.clone(),
                    name: name.clone(),
                    value: old.clone(),
                }),
                None => Some(RemoveServerProperty {
                    server: server.clone(),
                    name: name.clone(),
                }),
            },
            RemoveServerProperty { server, name } => {
                let old = pre.server(server)?.system_properties.get(name)?;
                Some(SetServerProperty {
                    server: server.clone(),
                    name: name.clone(),
                    value: old.clone(),
                })
            }
            AddServerPath { server, path } => Some(RemoveServerPath {
                server: server.clone(),
                name: path.name.clone(),
            }),
            RemoveServerPath { server, name } => Some(AddServerPath {
                server: server.clone(),
                path: pre.server(server)?.paths.get(name)?.clone(),
            }),
            WriteServerJvm { server, jvm } => {
                let old = &pre.server(server)?.jvm;
                if old == jvm {
                    return None;
                }
                Some(WriteServerJvm {
                    server: server.clone(),
                    jvm: old.clone(),
                })
            }
            SetHostProperty { name, value } => match pre.system_properties.get(name) {
                Some(old) if old == value => None,
                Some(old) => Some(SetHostProperty {
                    name: name.clone(),
                    value: old.clone(),
                }),
                None => Some(RemoveHostProperty { name: name.clone() }),
            },
            RemoveHostProperty { name } => {
                let old = pre.system_properties.get(name)?;
                Some(SetHostProperty {
                    name: name.clone(),
                    value: old.clone(),
                })
            }
            AddHostPath { path } => Some(RemoveHostPath {
                name: path.name.clone(),
            }),
            RemoveHostPath { name } => Some(AddHostPath {
                path: pre.paths.get(name)?.clone(),
            }),
            AddHostInterface { interface } => Some(RemoveHostInterface {
                name: interface.name.clone(),
            }),
            RemoveHostInterface { name } => Some(AddHostInterface {
                interface: pre.interfaces.get(name)?.clone(),
            }),
            AddJvm { jvm } => Some(RemoveJvm {
                name: jvm.name.clone(),
            }),
            RemoveJvm { name } => Some(AddJvm {
                jvm: pre.jvms.get(name)?.clone(),
            }),
        }
    }

    /// The runtime-level command this change projects onto a running server
    ///
    /// Server lifecycle configuration only matters at the next launch and
    /// projects nothing; rewires and JVM changes take effect on restart,
    /// so they project the restart marker.
    pub fn server_update(&self) -> Option<ServerUpdate> {
        use HostUpdate::*;
        match self {
            AddServer { .. } | RemoveServer { .. } | WriteServerAutoStart { .. } => None,

            WriteServerGroup { .. }
            | WriteServerSocketBindingGroup { .. }
            | WriteServerPortOffset { .. }
            | WriteServerJvm { .. }
            | AddJvm { .. }
            | RemoveJvm { .. } => Some(ServerUpdate::RestartRequired),

            SetServerProperty { name, value, .. } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: Some(value.clone()),
            }),
            RemoveServerProperty { name, .. } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: None,
            }),
            AddServerPath { path, .. } => {
                if path.is_declaration_only() {
                    None
                } else {
                    Some(ServerUpdate::SetPath { path: path.clone() })
                }
            }
            RemoveServerPath { name, .. } => {
                Some(ServerUpdate::RemovePath { name: name.clone() })
            }

            SetHostProperty { name, value } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: Some(value.clone()),
            }),
            RemoveHostProperty { name } => Some(ServerUpdate::SetSystemProperty {
                name: name.clone(),
                value: None,
            }),
            AddHostPath { path } => {
                if path.is_declaration_only() {
                    None
                } else {
                    Some(ServerUpdate::SetPath { path: path.clone() })
                }
            }
            RemoveHostPath { name } => Some(ServerUpdate::RemovePath { name: name.clone() }),
            AddHostInterface { interface } => {
                if interface.is_declaration_only() {
                    None
                } else {
                    Some(ServerUpdate::SetInterface {
                        interface: interface.clone(),
                    })
                }
            }
            RemoveHostInterface { name } => Some(ServerUpdate::RemoveInterface {
                name: name.clone(),
            }),
        }
    }

    /// Names of active servers on `host` whose running configuration this
    /// update changes
    pub fn affected_servers(&self, host: &HostModel) -> Vec<String> {
        projection::affected_by_host_update(self, host)
    }

    fn server_mut<'a>(
        &self,
        host: &'a mut HostModel,
        name: &str,
    ) -> KernelResult<&'a mut ServerConfig> {
        host.servers
            .get_mut(name)
            .ok_or_else(|| self.not_found(ElementKind::Server, name))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ServerGroup, SocketBindingGroup};
    use crate::update::DomainUpdate;

    fn seeded() -> (DomainModel, HostModel) {
        let mut domain = DomainModel::new();
        DomainUpdate::AddProfile {
            name: "default".into(),
        }
        .apply(&mut domain)
        .unwrap();
        DomainUpdate::AddSocketBindingGroup {
            group: SocketBindingGroup::new("standard", "public"),
        }
        .apply(&mut domain)
        .unwrap();
        DomainUpdate::AddServerGroup {
            group: ServerGroup::new("main-group", "default", "standard"),
        }
        .apply(&mut domain)
        .unwrap();
        (domain, HostModel::new("host-a"))
    }

    #[test]
    fn add_server_requires_existing_group() {
        let (domain, mut host) = seeded();
        let err = HostUpdate::AddServer {
            server: ServerConfig::new("srv1", "missing-group"),
        }
        .apply(&mut host, &domain)
        .unwrap_err();
        assert!(matches!(err, UpdateError::MissingReference { .. }));
        assert!(host.servers.is_empty());
    }

    #[test]
    fn add_then_remove_server_round_trips() {
        let (domain, mut host) = seeded();
        let add = HostUpdate::AddServer {
            server: ServerConfig::new("srv1", "main-group"),
        };
        let pre = host.clone();
        let inverse = add.compensating(&pre).unwrap();
        add.apply(&mut host, &domain).unwrap();
        inverse.apply(&mut host, &domain).unwrap();
        assert_eq!(host, pre);
    }

    #[test]
    fn auto_start_noop_compensation_is_none() {
        let (domain, mut host) = seeded();
        HostUpdate::AddServer {
            server: ServerConfig::new("srv1", "main-group"),
        }
        .apply(&mut host, &domain)
        .unwrap();
        let update = HostUpdate::WriteServerAutoStart {
            server: "srv1".into(),
            auto_start: true,
        };
        assert_eq!(update.compensating(&host), None);
    }

    #[test]
    fn server_rewire_projects_restart() {
        let update = HostUpdate::WriteServerPortOffset {
            server: "srv1".into(),
            port_offset: Some(150),
        };
        assert_eq!(update.server_update(), Some(ServerUpdate::RestartRequired));
    }

    #[test]
    fn server_jvm_change_requires_restart_of_that_server() {
        let (domain, mut host) = seeded();
        HostUpdate::AddServer {
            server: ServerConfig::new("srv1", "main-group"),
        }
        .apply(&mut host, &domain)
        .unwrap();
        let update = HostUpdate::WriteServerJvm {
            server: "srv1".into(),
            jvm: Some(JvmConfig::named("big-heap")),
        };
        assert_eq!(update.server_update(), Some(ServerUpdate::RestartRequired));
        assert_eq!(update.affected_servers(&host), vec!["srv1"]);
    }

    #[test]
    fn host_jvm_change_restarts_only_referencing_servers() {
        let (domain, mut host) = seeded();
        HostUpdate::AddJvm {
            jvm: JvmConfig::named("big-heap"),
        }
        .apply(&mut host, &domain)
        .unwrap();
        let mut user = ServerConfig::new("srv1", "main-group");
        user.jvm = Some(JvmConfig::named("big-heap"));
        HostUpdate::AddServer { server: user }
            .apply(&mut host, &domain)
            .unwrap();
        HostUpdate::AddServer {
            server: ServerConfig::new("srv2", "main-group"),
        }
        .apply(&mut host, &domain)
        .unwrap();

        let update = HostUpdate::RemoveJvm {
            name: "big-heap".into(),
        };
        assert_eq!(update.server_update(), Some(ServerUpdate::RestartRequired));
        assert_eq!(update.affected_servers(&host), vec!["srv1"]);
    }
}
