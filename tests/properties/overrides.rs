//! PROPERTY: local overrides only ever shrink the set of servers a
//! domain-wide change reaches, and the set never contains stopped servers.

use proptest::prelude::*;

use fleetconf::{affected_servers, DomainUpdate};

use crate::common::fixtures;

fn property_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,8}\\.[a-z]{1,8}").unwrap()
}

fn server_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("srv1".to_string()),
        Just("srv2".to_string()),
        Just("srv3".to_string())
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: adding a server-level value for a property removes at
    /// most that server from the affected set.
    #[test]
    fn property_server_override_is_monotone(
        name in property_name(),
        value in "[a-z]{0,8}",
        shadowed in server_name(),
    ) {
        let domain = fixtures::domain();
        let update = DomainUpdate::SetSystemProperty {
            name: name.clone(),
            value: "fleet-wide".to_string(),
        };

        let host = fixtures::host();
        let without = affected_servers(&update, &domain, &host);

        let mut host = fixtures::host();
        host.servers
            .get_mut(&shadowed)
            .unwrap()
            .system_properties
            .insert(name, value);
        let with = affected_servers(&update, &domain, &host);

        prop_assert!(with.iter().all(|s| without.contains(s)));
        prop_assert!(!with.contains(&shadowed));
    }

    /// PROPERTY: stopped servers never appear in an affected set.
    #[test]
    fn property_stopped_servers_are_never_affected(name in property_name()) {
        let domain = fixtures::domain();
        let host = fixtures::host();
        let update = DomainUpdate::SetSystemProperty {
            name,
            value: "anything".to_string(),
        };
        // srv3 has auto_start = false in the fixture.
        prop_assert!(!affected_servers(&update, &domain, &host).contains(&"srv3".to_string()));
    }
}
