//! PROPERTY: applying an update and then its compensating update restores
//! the pre-state exactly, for every update the model accepts.

use proptest::prelude::*;
use serde_json::json;

use fleetconf::DomainUpdate;

use crate::common::fixtures;

fn profile_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("base".to_string()), Just("web".to_string())]
}

fn group_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("main-group".to_string()),
        Just("other-group".to_string())
    ]
}

fn property_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,8}(\\.[a-z]{1,8})?").unwrap()
}

fn property_value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9/_-]{0,16}").unwrap()
}

/// Updates the fixture domain always accepts.
fn applicable_update() -> impl Strategy<Value = DomainUpdate> {
    prop_oneof![
        (profile_name(), property_value()).prop_map(|(profile, value)| {
            let subsystem = if profile == "base" { "logging" } else { "undertow" };
            DomainUpdate::WriteSubsystemAttribute {
                profile,
                subsystem: subsystem.to_string(),
                attribute: "level".to_string(),
                value: json!(value),
            }
        }),
        (property_name(), property_value())
            .prop_map(|(name, value)| DomainUpdate::SetSystemProperty { name, value }),
        (group_name(), property_name(), property_value()).prop_map(|(group, name, value)| {
            DomainUpdate::SetServerGroupProperty { group, name, value }
        }),
        (group_name(), any::<u16>()).prop_map(|(group, port_offset)| {
            DomainUpdate::WriteServerGroupPortOffset { group, port_offset }
        }),
        (group_name(), any::<bool>()).prop_map(|(group, start)| DomainUpdate::MapDeployment {
            group,
            deployment: "app.war".to_string(),
            start,
        }),
        property_name()
            .prop_filter("fresh profile name", |n| n != "base" && n != "web")
            .prop_map(|name| DomainUpdate::AddProfile { name }),
        property_name()
            .prop_map(|module| DomainUpdate::AddExtension { module: format!("x.{module}") }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 192,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: apply + compensate is the identity on the model.
    #[test]
    fn property_compensation_inverts_accepted_updates(update in applicable_update()) {
        let original = fixtures::domain();
        let mut domain = original.clone();

        let compensation = update.compensating(&domain);
        update.apply(&mut domain).expect("fixture accepts this update");

        match compensation {
            Some(inverse) => {
                inverse.apply(&mut domain).expect("compensation must apply");
                prop_assert_eq!(domain, original);
            }
            // No compensation means the update was a no-op.
            None => prop_assert_eq!(domain, original),
        }
    }

    /// PROPERTY: compensating twice returns to the post-update state.
    #[test]
    fn property_double_compensation_is_stable(update in applicable_update()) {
        let mut domain = fixtures::domain();
        let compensation = update.compensating(&domain);
        update.apply(&mut domain).expect("fixture accepts this update");
        let after_update = domain.clone();

        if let Some(inverse) = compensation {
            let back = inverse.compensating(&domain);
            inverse.apply(&mut domain).expect("compensation must apply");
            if let Some(redo) = back {
                redo.apply(&mut domain).expect("redo must apply");
                prop_assert_eq!(domain, after_update);
            }
        }
    }
}
