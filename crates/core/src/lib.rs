//! Domain types for scenario health monitoring.
//!
//! Pure data: scenario and phase identifiers, the static scenario
//! registry, snapshot types and web-vitals fields. No behavior beyond
//! construction and lookup.

mod domain;

pub use domain::*;
