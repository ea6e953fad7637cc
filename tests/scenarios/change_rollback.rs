//! An administrator applies a batch of changes, keeps the compensating
//! updates, and rolls the whole batch back.

use serde_json::json;

use fleetconf::{apply_with_compensation, DomainUpdate, UpdateError};

use crate::common::fixtures;

#[test]
fn removing_a_used_profile_names_the_groups_blocking_it() {
    let mut domain = fixtures::domain();
    let update = DomainUpdate::RemoveProfile { name: "web".into() };
    let err = apply_with_compensation(&mut domain, &[], &update).unwrap_err();
    match err {
        UpdateError::StillReferenced { referrers, .. } => {
            assert_eq!(referrers, vec!["main-group", "other-group"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing changed.
    assert_eq!(domain, fixtures::domain());
}

#[test]
fn removing_an_empty_profile_compensates_with_its_recreation() {
    let mut domain = fixtures::domain();
    let add = DomainUpdate::AddProfile {
        name: "batch".into(),
    };
    apply_with_compensation(&mut domain, &[], &add).unwrap();

    let remove = DomainUpdate::RemoveProfile {
        name: "batch".into(),
    };
    let compensation = apply_with_compensation(&mut domain, &[], &remove)
        .unwrap()
        .expect("remove is invertible");
    assert!(domain.profile("batch").is_none());

    compensation.apply(&mut domain).unwrap();
    assert!(domain.profile("batch").is_some());
}

#[test]
fn a_batch_of_changes_rolls_back_in_reverse_order() {
    let mut domain = fixtures::domain();
    let original = domain.clone();

    let updates = vec![
        DomainUpdate::WriteSubsystemAttribute {
            profile: "base".into(),
            subsystem: "logging".into(),
            attribute: "level".into(),
            value: json!("TRACE"),
        },
        DomainUpdate::SetSystemProperty {
            name: "env.name".into(),
            value: "canary".into(),
        },
        DomainUpdate::SetServerGroupProperty {
            group: "main-group".into(),
            name: "pool.size".into(),
            value: "32".into(),
        },
        DomainUpdate::MapDeployment {
            group: "main-group".into(),
            deployment: "app.war".into(),
            start: false,
        },
        DomainUpdate::WriteDeploymentStart {
            group: "main-group".into(),
            deployment: "app.war".into(),
            start: true,
        },
    ];

    let mut undo_stack = Vec::new();
    for update in &updates {
        if let Some(compensation) = apply_with_compensation(&mut domain, &[], update).unwrap() {
            undo_stack.push(compensation);
        }
    }
    assert_ne!(domain, original);

    for compensation in undo_stack.iter().rev() {
        compensation.apply(&mut domain).unwrap();
    }
    assert_eq!(domain, original);
}

#[test]
fn no_op_write_yields_no_compensation() {
    let mut domain = fixtures::domain();
    let update = DomainUpdate::WriteSubsystemAttribute {
        profile: "base".into(),
        subsystem: "logging".into(),
        attribute: "level".into(),
        value: json!("INFO"),
    };
    let compensation = apply_with_compensation(&mut domain, &[], &update).unwrap();
    assert!(compensation.is_none());
}
