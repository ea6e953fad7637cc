//! Error types for the fleetconf kernel
//!
//! Uses `thiserror` for library errors. Every failure carries the address
//! of the offending element so callers can report precisely what was
//! rejected. A failed update leaves the tree untouched; none of these
//! variants describe partial application.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::ResourceAddress;

/// Result type alias for kernel operations
pub type KernelResult<T> = Result<T, UpdateError>;

/// The kind of configuration element an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Profile,
    Subsystem,
    ServerGroup,
    Server,
    Deployment,
    Path,
    Interface,
    SocketBindingGroup,
    SystemProperty,
    Extension,
    Jvm,
}

impl ElementKind {
    /// The address key used for this kind in resource addresses
    pub fn key(self) -> &'static str {
        match self {
            ElementKind::Profile => "profile",
            ElementKind::Subsystem => "subsystem",
            ElementKind::ServerGroup => "server-group",
            ElementKind::Server => "server-config",
            ElementKind::Deployment => "deployment",
            ElementKind::Path => "path",
            ElementKind::Interface => "interface",
            ElementKind::SocketBindingGroup => "socket-binding-group",
            ElementKind::SystemProperty => "system-property",
            ElementKind::Extension => "extension",
            ElementKind::Jvm => "jvm",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Structural validation failure for an update
///
/// `NotFound` is the "update addressed a missing element" class; the
/// remaining variants are uniqueness/referential-integrity violations.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateError {
    /// The update addressed an element that does not exist
    #[error("no {kind} '{name}' at {address}")]
    NotFound {
        kind: ElementKind,
        name: String,
        address: ResourceAddress,
    },

    /// An add would violate a uniqueness invariant
    #[error("{kind} '{name}' already exists at {address}")]
    Duplicate {
        kind: ElementKind,
        name: String,
        address: ResourceAddress,
    },

    /// A remove would orphan live references
    #[error("{kind} '{name}' is still referenced by {referrers:?}")]
    StillReferenced {
        kind: ElementKind,
        name: String,
        referrers: Vec<String>,
        address: ResourceAddress,
    },

    /// The update introduces a reference to an element that does not exist
    #[error("{kind} '{target}' referenced from {address} does not exist")]
    MissingReference {
        kind: ElementKind,
        target: String,
        address: ResourceAddress,
    },

    /// A profile cannot be removed while it has subsystems or includes
    #[error("profile '{name}' is not empty ({subsystems} subsystems, {includes} includes)")]
    ProfileNotEmpty {
        name: String,
        subsystems: usize,
        includes: usize,
        address: ResourceAddress,
    },

    /// Adding the include would make the profile inclusion graph cyclic
    #[error("including '{include}' in '{profile}' would create an inclusion cycle")]
    IncludeCycle {
        profile: String,
        include: String,
        address: ResourceAddress,
    },
}

impl UpdateError {
    /// The address of the element that caused the failure
    pub fn address(&self) -> &ResourceAddress {
        match self {
            UpdateError::NotFound { address, .. }
            | UpdateError::Duplicate { address, .. }
            | UpdateError::StillReferenced { address, .. }
            | UpdateError::MissingReference { address, .. }
            | UpdateError::ProfileNotEmpty { address, .. }
            | UpdateError::IncludeCycle { address, .. } => address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ResourceAddress;

    #[test]
    fn not_found_display_names_the_element() {
        let err = UpdateError::NotFound {
            kind: ElementKind::Profile,
            name: "web".to_string(),
            address: ResourceAddress::of(&[("profile", "web")]),
        };
        assert_eq!(err.to_string(), "no profile 'web' at /profile=web");
    }

    #[test]
    fn still_referenced_display_names_referrers() {
        let err = UpdateError::StillReferenced {
            kind: ElementKind::Profile,
            name: "used-profile".to_string(),
            referrers: vec!["g1".to_string()],
            address: ResourceAddress::of(&[("profile", "used-profile")]),
        };
        assert_eq!(
            err.to_string(),
            "profile 'used-profile' is still referenced by [\"g1\"]"
        );
    }

    #[test]
    fn address_accessor_covers_all_variants() {
        let addr = ResourceAddress::of(&[("server-group", "g1")]);
        let err = UpdateError::Duplicate {
            kind: ElementKind::ServerGroup,
            name: "g1".to_string(),
            address: addr.clone(),
        };
        assert_eq!(err.address(), &addr);
    }
}
