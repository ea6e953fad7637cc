//! Version-aware transformation of operations and resource trees
//!
//! A fleet rarely upgrades atomically: peers on older releases speak older
//! subsystem schemas. This module rewrites outbound work into the shape a
//! legacy peer understands and normalizes inbound work from one, refusing
//! (with a precise address) anything the older schema cannot represent.

mod attribute;
mod engine;
mod version;

pub use attribute::{AttributeStep, StepEffect, ValueFn};
pub use engine::{
    Rejection, SubsystemTransformer, TransformOutcome, TransformRegistry, TransformedOperation,
    TransformedResource,
};
pub use version::{ModelVersion, ParseVersionError, SubsystemModel};
