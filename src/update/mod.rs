//! Typed configuration updates
//!
//! Every mutation of the configuration tree is a value of one of three
//! closed sum types:
//!
//! - [`DomainUpdate`] - mutations of the shared domain model
//! - [`HostUpdate`] - mutations of one host's model
//! - [`ServerUpdate`] - the runtime-level commands projected from the two
//!   above, consumed by the (external) transport that pushes changes to
//!   live server processes
//!
//! Updates are immutable, serializable command objects. `apply` validates
//! first and mutates only when every check has passed, so a failed update
//! leaves the tree untouched. `compensating` derives the inverse command
//! from the pre-update state of the tree; callers snapshot (clone) the
//! model before applying, or use
//! [`crate::api::apply_with_compensation`] which does both steps.

mod domain;
mod host;
mod server;

pub use domain::DomainUpdate;
pub use host::HostUpdate;
pub use server::ServerUpdate;
