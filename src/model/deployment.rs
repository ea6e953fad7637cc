//! Deployment metadata
//!
//! The kernel only manipulates metadata about a deployment (name, runtime
//! name, content hash, start flag) - never the packaged bytes themselves,
//! which live in an external content repository keyed by hash.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content hash value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix. Identifies
/// deployment content in the external content repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a new ContentHash from a raw hash string (without prefix)
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Create a ContentHash by computing SHA-256 of content
    pub fn from_content(content: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(content);
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// The full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metadata for one deployment registered with the domain
///
/// `name` is the globally unique handle within the domain; `runtime_name`
/// is the file name the server runtime sees (several deployments may share
/// one runtime name as long as they are never mapped to the same group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentMeta {
    pub name: String,
    pub runtime_name: String,
    pub hash: ContentHash,

    /// Whether group mappings created from this deployment start enabled
    #[serde(default = "default_start")]
    pub start: bool,
}

fn default_start() -> bool {
    true
}

impl DeploymentMeta {
    pub fn new(
        name: impl Into<String>,
        runtime_name: impl Into<String>,
        hash: ContentHash,
    ) -> Self {
        Self {
            name: name.into(),
            runtime_name: runtime_name.into(),
            hash,
            start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_adds_prefix_if_missing() {
        let hash = ContentHash::new("abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn new_keeps_prefix_if_present() {
        let hash = ContentHash::new("sha256:abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn from_content_computes_sha256() {
        let hash = ContentHash::from_content(b"hello");
        assert!(hash.as_str().starts_with("sha256:"));
        assert_eq!(hash.hex().len(), 64);
    }

    #[test]
    fn same_content_same_hash() {
        assert_eq!(
            ContentHash::from_content(b"war bytes"),
            ContentHash::from_content(b"war bytes")
        );
    }

    #[test]
    fn deployment_start_defaults_to_true() {
        let json = r#"{"name":"app.war","runtime_name":"app.war","hash":"sha256:ff"}"#;
        let meta: DeploymentMeta = serde_json::from_str(json).unwrap();
        assert!(meta.start);
    }

    #[test]
    fn hash_serializes_as_plain_string() {
        let json = serde_json::to_string(&ContentHash::new("aa")).unwrap();
        assert_eq!(json, "\"sha256:aa\"");
    }
}
