//! An administrator changes shared configuration and checks which running
//! servers each change actually reaches.

use serde_json::json;

use fleetconf::update::ServerUpdate;
use fleetconf::{affected_servers, DomainUpdate};

use crate::common::fixtures;

#[test]
fn subsystem_change_reaches_servers_through_profile_includes() {
    let domain = fixtures::domain();
    let host = fixtures::host();

    // `logging` lives in `base`, which `web` includes; both groups run
    // `web`, so every active server is affected.
    let update = DomainUpdate::WriteSubsystemAttribute {
        profile: "base".into(),
        subsystem: "logging".into(),
        attribute: "level".into(),
        value: json!("DEBUG"),
    };
    assert_eq!(affected_servers(&update, &domain, &host), vec!["srv1", "srv2"]);
}

#[test]
fn domain_property_change_skips_servers_with_their_own_value() {
    let domain = fixtures::domain();
    let host = fixtures::host();

    // srv2 declares its own env.name, so the domain-wide write never
    // reaches it; srv3 is not running.
    let update = DomainUpdate::SetSystemProperty {
        name: "env.name".into(),
        value: "eu-production".into(),
    };
    assert_eq!(affected_servers(&update, &domain, &host), vec!["srv1"]);
}

#[test]
fn group_property_change_stays_inside_the_group() {
    let domain = fixtures::domain();
    let host = fixtures::host();

    let update = DomainUpdate::SetServerGroupProperty {
        group: "other-group".into(),
        name: "pool.size".into(),
        value: "4".into(),
    };
    // other-group's only server is stopped.
    assert!(affected_servers(&update, &domain, &host).is_empty());
}

#[test]
fn structural_add_reaches_no_running_server() {
    let domain = fixtures::domain();
    let host = fixtures::host();

    let update = DomainUpdate::AddProfile {
        name: "batch".into(),
    };
    assert!(affected_servers(&update, &domain, &host).is_empty());
}

#[test]
fn deployment_mapping_carries_content_details_to_servers() {
    let domain = fixtures::domain();

    let update = DomainUpdate::MapDeployment {
        group: "main-group".into(),
        deployment: "app.war".into(),
        start: true,
    };
    let server_update = update.server_update(&domain).expect("servers see deploys");
    match server_update {
        ServerUpdate::Deploy {
            name,
            runtime_name,
            hash,
            start,
        } => {
            assert_eq!(name, "app.war");
            assert_eq!(runtime_name, "app.war");
            assert_eq!(hash, domain.deployment("app.war").unwrap().hash);
            assert!(start);
        }
        other => panic!("unexpected server update: {other:?}"),
    }
}

#[test]
fn binding_group_rewire_skips_servers_with_their_own_sockets() {
    let domain = fixtures::domain();
    let mut host = fixtures::host();
    host.servers
        .get_mut("srv2")
        .unwrap()
        .socket_binding_group = Some("ha-sockets".into());

    // srv2 keeps its own binding group, so repointing main-group only
    // reaches srv1.
    let update = DomainUpdate::WriteServerGroupSocketBindingGroup {
        group: "main-group".into(),
        socket_binding_group: "ha-sockets".into(),
    };
    assert_eq!(affected_servers(&update, &domain, &host), vec!["srv1"]);
}

#[test]
fn group_rewire_requires_restart() {
    let domain = fixtures::domain();
    let host = fixtures::host();

    let update = DomainUpdate::WriteServerGroupSocketBindingGroup {
        group: "main-group".into(),
        socket_binding_group: "ha-sockets".into(),
    };
    assert_eq!(affected_servers(&update, &domain, &host), vec!["srv1", "srv2"]);
    assert_eq!(
        update.server_update(&domain),
        Some(ServerUpdate::RestartRequired)
    );
}
