//! Property tests for fleetconf.
//!
//! Properties use randomized input generation to explore edge cases and
//! protect invariants like "compensation really inverts" and "a failed
//! update changes nothing".
//!
//! Run with: `cargo test --test properties`

mod common;

#[path = "properties/invertibility.rs"]
mod invertibility;

#[path = "properties/atomicity.rs"]
mod atomicity;

#[path = "properties/overrides.rs"]
mod overrides;
