//! Canonical fleet fixtures used by scenario and property tests.
//!
//! The shape mirrors a small real installation: a `base` profile included
//! by a `web` profile, two server-groups on the `web` profile, and one
//! host running two active servers plus a stopped spare.

use serde_json::json;

use fleetconf::model::{
    ContentHash, DeploymentMeta, InterfaceSpec, SocketBindingGroup, SubsystemConfig,
};
use fleetconf::{DomainModel, HostModel, Profile, ServerConfig, ServerGroup};

/// A domain with profiles `base` <- `web`, groups `main-group` and
/// `other-group`, one deployment, and shared paths/interfaces/properties.
pub fn domain() -> DomainModel {
    let mut domain = DomainModel::new();

    let mut base = Profile::new("base");
    base.subsystems.insert(
        "logging".into(),
        SubsystemConfig::new("logging").with_attribute("level", json!("INFO")),
    );
    domain.profiles.insert("base".into(), base);

    let mut web = Profile::new("web");
    web.includes.push("base".into());
    web.subsystems.insert(
        "undertow".into(),
        SubsystemConfig::new("undertow").with_attribute("default-host", json!("default")),
    );
    domain.profiles.insert("web".into(), web);

    domain.socket_binding_groups.insert(
        "standard-sockets".into(),
        SocketBindingGroup::new("standard-sockets", "public"),
    );
    domain.socket_binding_groups.insert(
        "ha-sockets".into(),
        SocketBindingGroup::new("ha-sockets", "public"),
    );

    let mut main_group = ServerGroup::new("main-group", "web", "standard-sockets");
    main_group
        .system_properties
        .insert("pool.size".into(), "16".into());
    domain.server_groups.insert("main-group".into(), main_group);
    domain.server_groups.insert(
        "other-group".into(),
        ServerGroup::new("other-group", "web", "standard-sockets"),
    );

    domain.deployments.insert(
        "app.war".into(),
        DeploymentMeta::new("app.war", "app.war", ContentHash::from_content(b"app-v1")),
    );

    domain
        .interfaces
        .insert("public".into(), InterfaceSpec::named("public"));
    domain
        .system_properties
        .insert("env.name".into(), "production".into());
    domain.extensions.insert("org.example.logging".into());
    domain.extensions.insert("org.example.undertow".into());

    domain
}

/// A host with `srv1`/`srv2` active in `main-group` and `srv3` stopped in
/// `other-group`. `srv2` carries a local `env.name` override.
pub fn host() -> HostModel {
    let mut host = HostModel::new("host-one");

    let srv1 = ServerConfig::new("srv1", "main-group");
    let mut srv2 = ServerConfig::new("srv2", "main-group");
    srv2.system_properties
        .insert("env.name".into(), "staging".into());
    let mut srv3 = ServerConfig::new("srv3", "other-group");
    srv3.auto_start = false;

    host.servers.insert("srv1".into(), srv1);
    host.servers.insert("srv2".into(), srv2);
    host.servers.insert("srv3".into(), srv3);
    host
}
