//! Profiles
//!
//! A profile is a named bundle of subsystem configuration. Profiles
//! compose: a profile may include other profiles, and a server-group
//! referencing profile P effectively runs every subsystem in P's
//! transitive include closure. Inclusion is composition, not inheritance -
//! editing a subsystem always targets the profile that declares it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::SubsystemConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,

    /// Names of profiles composed into this one, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subsystems: BTreeMap<String, SubsystemConfig>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            includes: Vec::new(),
            subsystems: BTreeMap::new(),
        }
    }

    /// True when the profile has no subsystems and no includes
    ///
    /// Only empty profiles may be removed.
    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty() && self.includes.is_empty()
    }

    /// Whether this profile directly declares the named subsystem
    pub fn declares_subsystem(&self, subsystem: &str) -> bool {
        self.subsystems.contains_key(subsystem)
    }

    pub fn subsystem(&self, subsystem: &str) -> Option<&SubsystemConfig> {
        self.subsystems.get(subsystem)
    }

    pub fn includes_profile(&self, profile: &str) -> bool {
        self.includes.iter().any(|p| p == profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_profile_is_empty() {
        assert!(Profile::new("empty-profile").is_empty());
    }

    #[test]
    fn profile_with_subsystem_is_not_empty() {
        let mut p = Profile::new("web");
        p.subsystems
            .insert("logging".into(), SubsystemConfig::new("logging"));
        assert!(!p.is_empty());
        assert!(p.declares_subsystem("logging"));
        assert!(!p.declares_subsystem("web"));
    }

    #[test]
    fn profile_with_include_is_not_empty() {
        let mut p = Profile::new("full");
        p.includes.push("default".into());
        assert!(!p.is_empty());
        assert!(p.includes_profile("default"));
    }
}
