//! Configuration tree
//!
//! The in-memory representation of the administrative model: the domain
//! (profiles, server-groups, deployments, shared resources) and per-host
//! models (servers and their local overrides).
//!
//! These are plain serde value types with no behavior beyond storage,
//! addressing and structural queries. Mutation happens exclusively through
//! [`crate::update`] commands; exclusive `&mut` access is the
//! single-writer discipline, and accessors that expose sub-collections
//! return owned clones so callers never hold a view into a tree that is
//! being mutated.

mod common;
mod deployment;
mod domain;
mod host;
mod profile;
mod server_group;

pub use common::{InterfaceSpec, JvmConfig, PathSpec, SocketBinding, SocketBindingGroup, SubsystemConfig};
pub use deployment::{ContentHash, DeploymentMeta};
pub use domain::DomainModel;
pub use host::{HostModel, ServerConfig};
pub use profile::Profile;
pub use server_group::{DeploymentBinding, ServerGroup};
