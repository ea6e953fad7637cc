//! Model versions
//!
//! Every subsystem schema evolves independently; a `ModelVersion` triple
//! identifies one point in that history and a `SubsystemModel` records the
//! ordered history itself. Two peers need transformation whenever the
//! target peer's version predates the latest shape of a subsystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An ordered (major, minor, micro) schema version
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ModelVersion {
    pub major: u16,
    pub minor: u16,
    pub micro: u16,
}

impl ModelVersion {
    pub const fn new(major: u16, minor: u16, micro: u16) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Invalid textual model version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid model version '{input}' - expected major.minor.micro")]
pub struct ParseVersionError {
    pub input: String,
}

impl FromStr for ModelVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError {
            input: s.to_string(),
        };
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(invalid)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

/// The ordered schema history of one subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemModel {
    pub subsystem: String,

    /// Published versions, ascending
    pub versions: Vec<ModelVersion>,
}

impl SubsystemModel {
    pub fn new(subsystem: impl Into<String>, mut versions: Vec<ModelVersion>) -> Self {
        versions.sort();
        Self {
            subsystem: subsystem.into(),
            versions,
        }
    }

    /// The current (latest) version of the subsystem schema
    pub fn latest(&self) -> ModelVersion {
        self.versions.last().copied().unwrap_or_default()
    }

    /// Whether `version` was ever published for this subsystem
    pub fn supports(&self, version: ModelVersion) -> bool {
        self.versions.contains(&version)
    }

    /// Whether operations destined for a `target`-version peer need
    /// rewriting
    pub fn requires_transform(&self, target: ModelVersion) -> bool {
        target < self.latest()
    }
}
