//! PROPERTY: a rejected update leaves the model exactly as it was.

use proptest::prelude::*;
use serde_json::json;

use fleetconf::DomainUpdate;

use crate::common::fixtures;

fn missing_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("ghost-[a-z]{1,12}").unwrap()
}

/// Updates the fixture domain always rejects.
fn rejected_update() -> impl Strategy<Value = DomainUpdate> {
    prop_oneof![
        // Addressing elements that do not exist.
        missing_name().prop_map(|name| DomainUpdate::RemoveProfile { name }),
        missing_name().prop_map(|name| DomainUpdate::RemoveServerGroup { name }),
        missing_name().prop_map(|name| DomainUpdate::RemoveDeployment { name }),
        missing_name().prop_map(|name| DomainUpdate::RemoveSystemProperty { name }),
        missing_name().prop_map(|profile| DomainUpdate::WriteSubsystemAttribute {
            profile,
            subsystem: "logging".to_string(),
            attribute: "level".to_string(),
            value: json!("DEBUG"),
        }),
        // Dangling references.
        missing_name().prop_map(|profile| DomainUpdate::WriteServerGroupProfile {
            group: "main-group".to_string(),
            profile,
        }),
        missing_name().prop_map(|deployment| DomainUpdate::MapDeployment {
            group: "main-group".to_string(),
            deployment,
            start: true,
        }),
        // Structural violations.
        Just(DomainUpdate::RemoveProfile {
            name: "base".to_string(),
        }),
        Just(DomainUpdate::AddProfileInclude {
            profile: "base".to_string(),
            include: "web".to_string(),
        }),
        Just(DomainUpdate::AddServerGroup {
            group: fleetconf::ServerGroup::new("new-group", "no-such-profile", "standard-sockets"),
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Err means untouched, down to deep equality.
    #[test]
    fn property_rejected_updates_change_nothing(update in rejected_update()) {
        let original = fixtures::domain();
        let mut domain = original.clone();

        let result = update.apply(&mut domain);

        prop_assert!(result.is_err());
        prop_assert_eq!(domain, original);
    }

    /// PROPERTY: failure reporting always carries the offending address.
    #[test]
    fn property_errors_carry_an_address(update in rejected_update()) {
        let mut domain = fixtures::domain();
        let err = update.apply(&mut domain).unwrap_err();
        prop_assert!(!err.address().is_root());
    }
}
