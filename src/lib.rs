//! Fleetconf - update/compensation/transformation kernel for managed fleets
//!
//! Fleetconf manages the administrative configuration of a fleet of server
//! processes organized as a domain (profiles, server-groups, deployments)
//! plus per-host models (servers and their local overrides), and computes
//! which running processes a configuration change actually reaches.
//!
//! The kernel is pure and in-memory: applying an update, deriving its
//! compensating (inverse) update, resolving affected servers, and
//! translating operations between schema versions are all synchronous
//! computations with no I/O. Transport, persistence and process lifecycle
//! belong to external collaborators.

pub mod address;
pub mod api;
pub mod error;
pub mod model;
pub mod operation;
pub mod projection;
pub mod transform;
pub mod update;

// Re-exports for convenience
pub use address::{PathElement, ResourceAddress};
pub use api::{
    affected_servers, apply_domain_update, apply_host_update, apply_with_compensation,
};
pub use error::{ElementKind, KernelResult, UpdateError};
pub use model::{DomainModel, HostModel, Profile, ServerConfig, ServerGroup};
pub use operation::{Operation, ResourceNode};
pub use transform::{ModelVersion, Rejection, TransformOutcome, TransformRegistry};
pub use update::{DomainUpdate, HostUpdate, ServerUpdate};
