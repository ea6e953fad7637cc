//! Resource addressing
//!
//! A `ResourceAddress` identifies one element of the configuration tree as
//! an ordered list of `(type, name)` pairs, e.g. `/profile=web/subsystem=logging`.
//! Addresses appear in errors, wire operations, and transformation
//! rejection records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `(type, name)` step of a resource address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered path into the configuration tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceAddress(Vec<PathElement>);

impl ResourceAddress {
    /// The domain root address (empty path)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build an address from `(key, value)` pairs
    pub fn of(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| PathElement::new(*k, *v))
                .collect(),
        )
    }

    /// Append one element, returning the child address
    pub fn child(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::new(key, value));
        Self(elements)
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathElement> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the domain root (alias for [`Self::is_empty`])
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// The address with the first `skip` elements removed
    ///
    /// Used when re-targeting a domain-level operation at a server, whose
    /// tree starts below the domain prefix.
    pub fn sub_address(&self, skip: usize) -> Self {
        Self(self.0.iter().skip(skip).cloned().collect())
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for element in &self.0 {
            write!(f, "/{}={}", element.key, element.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_slash() {
        assert_eq!(ResourceAddress::root().to_string(), "/");
    }

    #[test]
    fn display_joins_elements() {
        let addr = ResourceAddress::of(&[("profile", "web"), ("subsystem", "logging")]);
        insta::assert_snapshot!(addr.to_string(), @"/profile=web/subsystem=logging");
    }

    #[test]
    fn child_appends() {
        let addr = ResourceAddress::root().child("server-group", "main-group");
        assert_eq!(addr.len(), 1);
        assert_eq!(addr.first().unwrap().key, "server-group");
        assert!(!addr.is_empty());
        assert!(ResourceAddress::root().is_empty());
    }

    #[test]
    fn sub_address_drops_prefix() {
        let addr = ResourceAddress::of(&[("profile", "web"), ("subsystem", "logging")]);
        let server_addr = addr.sub_address(1);
        assert_eq!(server_addr.to_string(), "/subsystem=logging");
    }

    #[test]
    fn serializes_as_plain_list() {
        let addr = ResourceAddress::of(&[("path", "tmp")]);
        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(json, serde_json::json!([{"key": "path", "value": "tmp"}]));
    }
}
